use crate::engines::evaluation::DualStacks;
use crate::error::{Result, SymstackError};
use crate::functions::{Op, RenderRule, StackKind};
use crate::types::{OutputMode, Program};

type StringStacks = DualStacks<String, String>;

/// Render a program as an algebraic string
///
/// Walks the instruction sequence over string stacks instead of value
/// stacks, through the same arity gate as evaluation, so a program renders
/// exactly when it executes. Compound expressions are fully parenthesized
/// with the first pop in the left operand position, which makes the printed
/// equation literally the computation the evaluator performs. No arithmetic
/// happens here.
pub fn render(program: &Program) -> Result<String> {
    let stacks = build_stacks(program)?;
    stacks.last_float().cloned().ok_or_else(empty_render_error)
}

/// Render every expression left on the stack, bottom to top
///
/// Multi-output (class-representation) programs produce one string per
/// output column, in the same order the evaluator stacks them.
pub fn render_all(program: &Program) -> Result<Vec<String>> {
    let stacks = build_stacks(program)?;
    let rendered = stacks.into_floats();
    if rendered.is_empty() {
        return Err(empty_render_error());
    }
    Ok(rendered)
}

/// One line for the archive report: single expression, or a bracketed list
pub fn render_for_report(program: &Program) -> Result<String> {
    match program.mode() {
        OutputMode::MultiOutput => Ok(format!("[{}]", render_all(program)?.join(", "))),
        _ => render(program),
    }
}

fn build_stacks(program: &Program) -> Result<StringStacks> {
    let mut stacks = StringStacks::new();
    for op in program.code() {
        if stacks.depth(op.input_stack()) < op.arity() {
            continue;
        }
        let fragment = match op.render_rule() {
            RenderRule::Infix(symbol) => {
                let (a, b) = match op.input_stack() {
                    StackKind::Float => (stacks.pop_float()?, stacks.pop_float()?),
                    StackKind::Bool => (stacks.pop_bool()?, stacks.pop_bool()?),
                };
                format!("({}{}{})", a, symbol, b)
            }
            RenderRule::Unary(open, close) => {
                let a = match op.input_stack() {
                    StackKind::Float => stacks.pop_float()?,
                    StackKind::Bool => stacks.pop_bool()?,
                };
                format!("{}{}{}", open, a, close)
            }
            RenderRule::Terminal => render_terminal(op),
        };
        match op.output_stack() {
            StackKind::Float => stacks.push_float(fragment),
            StackKind::Bool => stacks.push_bool(fragment),
        }
    }
    Ok(stacks)
}

fn render_terminal(op: &Op) -> String {
    match op {
        Op::Var(index) => format!("x_{}", index),
        Op::VarDelay { index, lag } => format!("x_{}_{{t-{}}}", index, lag),
        Op::Const(value) | Op::ConstDelay(value) => format!("{:.3}", value),
        Op::Recur(lag) => format!("y_{{t-{}}}", lag),
        // render_rule() only returns Terminal for the variants above
        other => other.symbol().to_string(),
    }
}

fn empty_render_error() -> SymstackError {
    SymstackError::MalformedGenome("program renders no expression".to_string())
}
