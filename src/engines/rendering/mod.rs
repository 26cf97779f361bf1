pub mod renderer;

pub use renderer::{render, render_all, render_for_report};
