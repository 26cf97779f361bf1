use crate::data::FeatureMatrix;
use crate::error::{Result, SymstackError};
use crate::functions::{protected, NumericRule, Op};
use crate::types::{Output, OutputMode, Program};

use super::stacks::DualStacks;

type ColumnStacks = DualStacks<Vec<f64>, Vec<bool>>;

/// Vectorized pass over the whole sample set
///
/// Each stack value is a full column, so one walk of the instruction
/// sequence produces outputs for every sample at once. Instructions whose
/// input stack is shallower than their arity are skipped without error; the
/// external search routinely emits partial genomes and relies on that
/// tolerance.
pub fn evaluate_columns(program: &Program, features: &FeatureMatrix) -> Result<Output> {
    let mut stacks = ColumnStacks::new();
    for op in program.code() {
        if stacks.depth(op.input_stack()) < op.arity() {
            continue;
        }
        step_columns(op, &mut stacks, features)?;
    }
    collect_output(program.mode(), stacks)
}

fn step_columns(op: &Op, stacks: &mut ColumnStacks, features: &FeatureMatrix) -> Result<()> {
    match op.numeric_rule() {
        NumericRule::BinaryFloat(rule) => {
            let a = stacks.pop_float()?;
            let b = stacks.pop_float()?;
            let mut out: Vec<f64> = a.iter().zip(b.iter()).map(|(x, y)| rule(*x, *y)).collect();
            protected::scrub_column(op.symbol(), &mut out);
            stacks.push_float(out);
        }
        NumericRule::UnaryFloat(rule) => {
            let a = stacks.pop_float()?;
            let mut out: Vec<f64> = a.iter().map(|x| rule(*x)).collect();
            protected::scrub_column(op.symbol(), &mut out);
            stacks.push_float(out);
        }
        NumericRule::Compare(rule) => {
            let a = stacks.pop_float()?;
            let b = stacks.pop_float()?;
            let out: Vec<bool> = a.iter().zip(b.iter()).map(|(x, y)| rule(*x, *y)).collect();
            stacks.push_bool(out);
        }
        NumericRule::UnaryBool(rule) => {
            let a = stacks.pop_bool()?;
            stacks.push_bool(a.iter().map(|x| rule(*x)).collect());
        }
        NumericRule::BinaryBool(rule) => {
            let a = stacks.pop_bool()?;
            let b = stacks.pop_bool()?;
            let out: Vec<bool> = a.iter().zip(b.iter()).map(|(x, y)| rule(*x, *y)).collect();
            stacks.push_bool(out);
        }
        NumericRule::Terminal => {
            let mut column = terminal_column(op, features)?;
            protected::scrub_column(op.symbol(), &mut column);
            stacks.push_float(column);
        }
    }
    Ok(())
}

fn terminal_column(op: &Op, features: &FeatureMatrix) -> Result<Vec<f64>> {
    let rows = features.n_rows();
    let column = match op {
        Op::Var(index) => features.column(*index)?.to_vec(),
        Op::Const(value) | Op::ConstDelay(value) => vec![*value; rows],
        Op::VarDelay { index, lag } => {
            // Without a sliding window the delayed lookup resolves against
            // the end of the series and broadcasts; a lag reaching past the
            // first row falls back to zero.
            let value = match rows.checked_sub(lag + 1) {
                Some(row) => features.value(row, *index)?,
                None => {
                    log::debug!("delay {} exceeds series length {}, using 0.0", lag, rows);
                    0.0
                }
            };
            vec![value; rows]
        }
        Op::Recur(_) => {
            return Err(SymstackError::Evaluation(
                "recurrence terminal requires autoregressive mode".to_string(),
            ))
        }
        other => {
            return Err(SymstackError::Evaluation(format!(
                "'{}' is not a terminal",
                other.symbol()
            )))
        }
    };
    Ok(column)
}

fn collect_output(mode: OutputMode, stacks: ColumnStacks) -> Result<Output> {
    match mode {
        OutputMode::MultiOutput => {
            let columns = stacks.into_floats();
            if columns.is_empty() {
                return Err(empty_stack_error());
            }
            // One row per sample, one column per remaining stack entry.
            let rows = columns[0].len();
            let mut matrix = vec![vec![0.0; columns.len()]; rows];
            for (c, column) in columns.iter().enumerate() {
                for (r, value) in column.iter().enumerate() {
                    matrix[r][c] = *value;
                }
            }
            Ok(Output::Matrix(matrix))
        }
        OutputMode::Single | OutputMode::Autoregressive => {
            let column = stacks.last_float().cloned().ok_or_else(empty_stack_error)?;
            Ok(Output::Column(column))
        }
    }
}

fn empty_stack_error() -> SymstackError {
    SymstackError::MalformedGenome("program left no value on the float stack".to_string())
}
