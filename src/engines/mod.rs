pub mod archive;
pub mod evaluation;
pub mod rendering;
