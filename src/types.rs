use crate::error::Result;
use crate::functions::op::Op;
use serde::{Deserialize, Serialize};

/// How a program's final stack state is turned into an output
///
/// The mode travels alongside the instruction sequence and is never inferred
/// from its content: the same instruction stream is a regression model under
/// `Single`, a class-representation model under `MultiOutput` (every column
/// left on the float stack becomes an output dimension), and a recurrent
/// model under `Autoregressive` (evaluated sample by sample with a history
/// buffer of its own prior outputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    Single,
    MultiOutput,
    Autoregressive,
}

/// A stack-encoded symbolic model
///
/// A program is a flat, ordered sequence of instructions — no tree structure.
/// Later instructions consume the most recently produced values from a pair
/// of typed stacks, so structure is implicit in consumption order. This is
/// the representation the external evolutionary search breeds on:
///
/// - **Crossover/mutation** work on flat sequences (array slicing), which is
///   why the search emits genomes rather than expression trees.
/// - **Any sequence is tolerable**: instructions without enough operands are
///   skipped during vectorized evaluation instead of invalidating the genome.
///
/// Programs are immutable once handed to an evaluator. The instruction set
/// itself lives in [`Op`](crate::functions::op::Op).
///
/// # Example
///
/// ```
/// use symstack::types::Program;
/// use symstack::functions::op::Op;
///
/// // x_1 - x_0, postfix: push x_0, push x_1, subtract (last push = left operand)
/// let program = Program::new(vec![Op::Var(0), Op::Var(1), Op::Sub]);
/// assert_eq!(program.complexity(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    code: Vec<Op>,
    mode: OutputMode,
}

impl Program {
    pub fn new(code: Vec<Op>) -> Self {
        Self {
            code,
            mode: OutputMode::Single,
        }
    }

    pub fn with_mode(code: Vec<Op>, mode: OutputMode) -> Self {
        Self { code, mode }
    }

    pub fn code(&self) -> &[Op] {
        &self.code
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Genotype-length complexity measure
    pub fn complexity(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Serialize for the search-engine boundary
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a program handed over by the search engine
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Evaluation result: a single column, or the whole stack side by side
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Column(Vec<f64>),
    /// One row per sample; columns follow bottom-to-top stack order
    Matrix(Vec<Vec<f64>>),
}

impl Output {
    pub fn as_column(&self) -> Option<&[f64]> {
        match self {
            Output::Column(c) => Some(c),
            Output::Matrix(_) => None,
        }
    }

    pub fn as_matrix(&self) -> Option<&[Vec<f64>]> {
        match self {
            Output::Column(_) => None,
            Output::Matrix(m) => Some(m),
        }
    }
}

/// Pre-series state for autoregressive evaluation
///
/// `features` holds the rows immediately preceding the series start (row
/// major, newest last); `labels` holds the corresponding known outputs and
/// seeds the recurrence history buffer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitialConditions {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
}
