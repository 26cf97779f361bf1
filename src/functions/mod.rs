pub mod op;
pub mod protected;

pub use op::{NumericRule, Op, RenderRule, StackKind};
