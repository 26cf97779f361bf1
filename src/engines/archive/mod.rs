pub mod selector;

pub use selector::{Archive, ArchiveEntry};
