use crate::error::{Result, SymstackError};
use crate::functions::protected;
use serde::{Deserialize, Serialize};

/// Which of the two typed stacks an instruction touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackKind {
    Float,
    Bool,
}

/// Numeric rule classes the table assigns to instructions
///
/// Both evaluation engines (vectorized and per-step) drive their stack
/// manipulation off this classification, so an instruction's arithmetic is
/// defined in exactly one place. Operand order follows pop order: the first
/// argument of a binary rule is the first pop, i.e. the left operand.
#[derive(Clone, Copy)]
pub enum NumericRule {
    /// Pops two floats, pushes a float
    BinaryFloat(fn(f64, f64) -> f64),
    /// Pops one float, pushes a float
    UnaryFloat(fn(f64) -> f64),
    /// Pops two floats, pushes a bool
    Compare(fn(f64, f64) -> bool),
    /// Pops one bool, pushes a bool
    UnaryBool(fn(bool) -> bool),
    /// Pops two bools, pushes a bool
    BinaryBool(fn(bool, bool) -> bool),
    /// Pushes a value derived from the instruction's own operands
    Terminal,
}

/// Symbolic rule classes mirroring [`NumericRule`]
///
/// The renderer pops rendered fragments in the same order the evaluator pops
/// values, so the printed equation is literally the computation performed.
#[derive(Clone, Copy)]
pub enum RenderRule {
    /// Two fragments joined infix inside parentheses, first pop on the left
    Infix(&'static str),
    /// One fragment between a fixed opening and closing
    Unary(&'static str, &'static str),
    /// Rendered from the instruction's own operands
    Terminal,
}

/// The instruction table: every operator a genome may contain
///
/// Closed tagged-variant registry replacing the original symbol→closure
/// dispatch table. Each variant carries its operand payload; declared arity,
/// stack effect, and wire symbol are table lookups on the variant. The
/// numeric rule (engines/evaluation) and the render rule (engines/rendering)
/// are required to pop in the same order against the same arity — both gate
/// through [`Op::arity`] and [`Op::input_stack`], so a program renders if and
/// only if it executes.
///
/// Binary operators consume the two most recently pushed values with the
/// *last* push in the left-operand position: `a OP b` where `a` is the first
/// pop. Comparisons pop from the float stack and push onto the bool stack;
/// `Not`/`And`/`Or`/`Equal` live entirely on the bool stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Op {
    // Binary arithmetic
    Add,
    Sub,
    Mul,
    Div,
    // Unary float
    Sin,
    Arcsin,
    Cos,
    Arccos,
    Exp,
    Log,
    Square,
    Cube,
    SqrtAbs,
    // Terminals
    /// Feature column lookup by index
    Var(usize),
    /// Constant, broadcast over all samples
    Const(f64),
    /// Feature lookup delayed by `lag` time steps
    VarDelay { index: usize, lag: usize },
    /// Constant in delayed (per-step) form
    ConstDelay(f64),
    /// Recurrence terminal: prior output `lag` steps back
    Recur(usize),
    // Boolean
    Not,
    And,
    Or,
    Equal,
    // Numeric comparisons (float → bool)
    Gt,
    Lt,
    Ge,
    Le,
}

impl Op {
    /// Minimum depth of the input stack required before execution
    pub fn arity(&self) -> usize {
        match self {
            Op::Var(_) | Op::Const(_) | Op::VarDelay { .. } | Op::ConstDelay(_) | Op::Recur(_) => 0,
            Op::Sin
            | Op::Arcsin
            | Op::Cos
            | Op::Arccos
            | Op::Exp
            | Op::Log
            | Op::Square
            | Op::Cube
            | Op::SqrtAbs
            | Op::Not => 1,
            Op::Add
            | Op::Sub
            | Op::Mul
            | Op::Div
            | Op::And
            | Op::Or
            | Op::Equal
            | Op::Gt
            | Op::Lt
            | Op::Ge
            | Op::Le => 2,
        }
    }

    /// Stack this instruction pops its operands from
    pub fn input_stack(&self) -> StackKind {
        match self {
            Op::Not | Op::And | Op::Or | Op::Equal => StackKind::Bool,
            _ => StackKind::Float,
        }
    }

    /// Stack this instruction pushes its result onto
    pub fn output_stack(&self) -> StackKind {
        match self {
            Op::Not | Op::And | Op::Or | Op::Equal | Op::Gt | Op::Lt | Op::Ge | Op::Le => {
                StackKind::Bool
            }
            _ => StackKind::Float,
        }
    }

    /// Numeric evaluation rule for this instruction
    pub fn numeric_rule(&self) -> NumericRule {
        match self {
            Op::Add => NumericRule::BinaryFloat(|a, b| a + b),
            Op::Sub => NumericRule::BinaryFloat(|a, b| a - b),
            Op::Mul => NumericRule::BinaryFloat(|a, b| a * b),
            Op::Div => NumericRule::BinaryFloat(protected::divs),
            Op::Sin => NumericRule::UnaryFloat(f64::sin),
            Op::Arcsin => NumericRule::UnaryFloat(f64::asin),
            Op::Cos => NumericRule::UnaryFloat(f64::cos),
            Op::Arccos => NumericRule::UnaryFloat(f64::acos),
            Op::Exp => NumericRule::UnaryFloat(f64::exp),
            Op::Log => NumericRule::UnaryFloat(protected::logs),
            Op::Square => NumericRule::UnaryFloat(|x| x * x),
            Op::Cube => NumericRule::UnaryFloat(|x| x * x * x),
            Op::SqrtAbs => NumericRule::UnaryFloat(|x| x.abs().sqrt()),
            Op::Var(_) | Op::Const(_) | Op::VarDelay { .. } | Op::ConstDelay(_) | Op::Recur(_) => {
                NumericRule::Terminal
            }
            Op::Not => NumericRule::UnaryBool(|a| !a),
            Op::And => NumericRule::BinaryBool(|a, b| a && b),
            Op::Or => NumericRule::BinaryBool(|a, b| a || b),
            Op::Equal => NumericRule::BinaryBool(|a, b| a == b),
            Op::Gt => NumericRule::Compare(|a, b| a > b),
            Op::Lt => NumericRule::Compare(|a, b| a < b),
            Op::Ge => NumericRule::Compare(|a, b| a >= b),
            Op::Le => NumericRule::Compare(|a, b| a <= b),
        }
    }

    /// Symbolic rendering rule for this instruction
    pub fn render_rule(&self) -> RenderRule {
        match self {
            Op::Add => RenderRule::Infix("+"),
            Op::Sub => RenderRule::Infix("-"),
            Op::Mul => RenderRule::Infix("*"),
            Op::Div => RenderRule::Infix("/"),
            Op::Sin => RenderRule::Unary("sin(", ")"),
            Op::Arcsin => RenderRule::Unary("arcsin(", ")"),
            Op::Cos => RenderRule::Unary("cos(", ")"),
            Op::Arccos => RenderRule::Unary("arccos(", ")"),
            Op::Exp => RenderRule::Unary("exp(", ")"),
            Op::Log => RenderRule::Unary("log(", ")"),
            Op::Square => RenderRule::Unary("(", "^2)"),
            Op::Cube => RenderRule::Unary("(", "^3)"),
            Op::SqrtAbs => RenderRule::Unary("sqrt(|", "|)"),
            Op::Var(_) | Op::Const(_) | Op::VarDelay { .. } | Op::ConstDelay(_) | Op::Recur(_) => {
                RenderRule::Terminal
            }
            Op::Not => RenderRule::Unary("!(", ")"),
            Op::And => RenderRule::Infix("&"),
            Op::Or => RenderRule::Infix("|"),
            Op::Equal => RenderRule::Infix("=="),
            Op::Gt => RenderRule::Infix(">"),
            Op::Lt => RenderRule::Infix("<"),
            Op::Ge => RenderRule::Infix(">="),
            Op::Le => RenderRule::Infix("<="),
        }
    }

    /// Wire symbol used by the external search engine
    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Sin => "s",
            Op::Arcsin => "a",
            Op::Cos => "c",
            Op::Arccos => "d",
            Op::Exp => "e",
            Op::Log => "l",
            Op::Square => "2",
            Op::Cube => "3",
            Op::SqrtAbs => "q",
            Op::Var(_) => "x",
            Op::Const(_) => "k",
            Op::VarDelay { .. } => "xd",
            Op::ConstDelay(_) => "kd",
            Op::Recur(_) => "y",
            Op::Not => "!",
            Op::And => "&",
            Op::Or => "|",
            Op::Equal => "==",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Ge => "}",
            Op::Le => "{",
        }
    }

    /// Build an instruction from the engine's wire form
    ///
    /// `primary` carries a feature index, constant value, or lag index
    /// depending on the symbol; `secondary` carries the extra lag of delayed
    /// feature instructions. Unknown symbols are a table-contract violation
    /// and fail loudly rather than being skipped.
    pub fn decode(symbol: &str, primary: Option<f64>, secondary: Option<usize>) -> Result<Op> {
        let index = |sym: &str| -> Result<usize> {
            let value = primary.ok_or_else(|| {
                SymstackError::MalformedGenome(format!("'{}' requires an operand", sym))
            })?;
            if value < 0.0 || value.fract() != 0.0 {
                return Err(SymstackError::MalformedGenome(format!(
                    "'{}' operand must be a non-negative integer, got {}",
                    sym, value
                )));
            }
            Ok(value as usize)
        };
        let constant = |sym: &str| -> Result<f64> {
            primary.ok_or_else(|| {
                SymstackError::MalformedGenome(format!("'{}' requires a constant value", sym))
            })
        };

        let op = match symbol {
            "+" => Op::Add,
            "-" => Op::Sub,
            "*" => Op::Mul,
            "/" => Op::Div,
            "s" => Op::Sin,
            "a" => Op::Arcsin,
            "c" => Op::Cos,
            "d" => Op::Arccos,
            "e" => Op::Exp,
            "l" => Op::Log,
            "2" => Op::Square,
            "3" => Op::Cube,
            "q" => Op::SqrtAbs,
            "x" => Op::Var(index("x")?),
            "k" => Op::Const(constant("k")?),
            "xd" => Op::VarDelay {
                index: index("xd")?,
                lag: secondary.unwrap_or(0),
            },
            "kd" => Op::ConstDelay(constant("kd")?),
            "y" => Op::Recur(index("y")?),
            "!" => Op::Not,
            "&" => Op::And,
            "|" => Op::Or,
            "==" => Op::Equal,
            ">" => Op::Gt,
            "<" => Op::Lt,
            "}" => Op::Ge,
            "{" => Op::Le,
            other => return Err(SymstackError::UnknownOperator(other.to_string())),
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Vec<Op> {
        vec![
            Op::Add,
            Op::Sub,
            Op::Mul,
            Op::Div,
            Op::Sin,
            Op::Arcsin,
            Op::Cos,
            Op::Arccos,
            Op::Exp,
            Op::Log,
            Op::Square,
            Op::Cube,
            Op::SqrtAbs,
            Op::Var(2),
            Op::Const(0.5),
            Op::VarDelay { index: 1, lag: 3 },
            Op::ConstDelay(-1.25),
            Op::Recur(1),
            Op::Not,
            Op::And,
            Op::Or,
            Op::Equal,
            Op::Gt,
            Op::Lt,
            Op::Ge,
            Op::Le,
        ]
    }

    #[test]
    fn test_arity_table() {
        assert_eq!(Op::Add.arity(), 2);
        assert_eq!(Op::Sin.arity(), 1);
        assert_eq!(Op::Var(0).arity(), 0);
        assert_eq!(Op::Recur(1).arity(), 0);
        assert_eq!(Op::Not.arity(), 1);
        assert_eq!(Op::Equal.arity(), 2);
        assert_eq!(Op::Ge.arity(), 2);
    }

    #[test]
    fn test_stack_effects() {
        // Comparisons bridge float → bool
        for op in [Op::Gt, Op::Lt, Op::Ge, Op::Le] {
            assert_eq!(op.input_stack(), StackKind::Float);
            assert_eq!(op.output_stack(), StackKind::Bool);
        }
        // Pure bool operators never touch the float stack
        for op in [Op::Not, Op::And, Op::Or, Op::Equal] {
            assert_eq!(op.input_stack(), StackKind::Bool);
            assert_eq!(op.output_stack(), StackKind::Bool);
        }
        // Terminals produce floats
        assert_eq!(Op::Var(0).output_stack(), StackKind::Float);
        assert_eq!(Op::Recur(2).output_stack(), StackKind::Float);
    }

    #[test]
    fn test_decode_round_trip() {
        for op in sample_table() {
            let (primary, secondary) = match op {
                Op::Var(i) => (Some(i as f64), None),
                Op::Const(v) | Op::ConstDelay(v) => (Some(v), None),
                Op::VarDelay { index, lag } => (Some(index as f64), Some(lag)),
                Op::Recur(lag) => (Some(lag as f64), None),
                _ => (None, None),
            };
            let decoded = Op::decode(op.symbol(), primary, secondary).unwrap();
            assert_eq!(decoded, op, "symbol {} did not round-trip", op.symbol());
        }
    }

    #[test]
    fn test_decode_unknown_symbol() {
        let err = Op::decode("rbf", None, None).unwrap_err();
        assert!(matches!(err, SymstackError::UnknownOperator(_)));
    }

    #[test]
    fn test_decode_missing_operand() {
        assert!(Op::decode("x", None, None).is_err());
        assert!(Op::decode("k", None, None).is_err());
        assert!(Op::decode("x", Some(-1.0), None).is_err());
        assert!(Op::decode("x", Some(1.5), None).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let ops = sample_table();
        let json = serde_json::to_string(&ops).unwrap();
        let back: Vec<Op> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ops);
    }

    /// The numeric rule, render rule, arity, and stack effect of every
    /// instruction must agree, otherwise the renderer and an evaluator could
    /// disagree on what a program consumes.
    #[test]
    fn test_table_consistency() {
        for op in sample_table() {
            let (rule_arity, rule_in, rule_out) = match op.numeric_rule() {
                NumericRule::BinaryFloat(_) => (2, StackKind::Float, StackKind::Float),
                NumericRule::UnaryFloat(_) => (1, StackKind::Float, StackKind::Float),
                NumericRule::Compare(_) => (2, StackKind::Float, StackKind::Bool),
                NumericRule::UnaryBool(_) => (1, StackKind::Bool, StackKind::Bool),
                NumericRule::BinaryBool(_) => (2, StackKind::Bool, StackKind::Bool),
                NumericRule::Terminal => (0, op.input_stack(), StackKind::Float),
            };
            assert_eq!(op.arity(), rule_arity, "arity mismatch for {}", op.symbol());
            assert_eq!(op.input_stack(), rule_in, "input mismatch for {}", op.symbol());
            assert_eq!(op.output_stack(), rule_out, "output mismatch for {}", op.symbol());

            let render_arity = match op.render_rule() {
                RenderRule::Infix(_) => 2,
                RenderRule::Unary(_, _) => 1,
                RenderRule::Terminal => 0,
            };
            assert_eq!(
                op.arity(),
                render_arity,
                "render arity mismatch for {}",
                op.symbol()
            );
        }
    }
}
