use crate::config::LagConfig;
use crate::data::FeatureMatrix;
use crate::error::{Result, SymstackError};
use crate::functions::{protected, NumericRule, Op};
use crate::types::{InitialConditions, Program};

use super::stacks::DualStacks;

type ScalarStacks = DualStacks<f64, bool>;

/// Sample-by-sample evaluation with output feedback
///
/// A recurrence terminal at sample `i` reads outputs of samples `< i`, so
/// evaluation order is fixed ascending and cannot be parallelized across
/// samples. Each step runs the full instruction sequence on fresh stacks
/// against a lag window ending at the current row; the window reaches
/// `input_lag + input_delay` rows before the series start, covered by the
/// supplied initial conditions or by zeros.
pub fn evaluate_recurrent(
    program: &Program,
    features: &FeatureMatrix,
    lags: &LagConfig,
    ic: Option<&InitialConditions>,
) -> Result<Vec<f64>> {
    if let Some(Op::Recur(lag)) = program
        .code()
        .iter()
        .find(|op| matches!(op, Op::Recur(lag) if *lag > lags.max_output_lag()))
    {
        log::warn!(
            "recurrence lag {} exceeds the configured output order {}",
            lag,
            lags.max_output_lag()
        );
    }

    let pad = lags.input_lag + lags.input_delay;
    let padded = padded_columns(features, pad, ic)?;
    let prefix: &[f64] = match ic {
        Some(ic) => &ic.labels,
        None => &[],
    };

    let rows = features.n_rows();
    let mut outputs: Vec<f64> = Vec::with_capacity(rows);
    for i in 0..rows {
        let mut stacks = ScalarStacks::new();
        for op in program.code() {
            if stacks.depth(op.input_stack()) < op.arity() {
                continue;
            }
            step_scalar(op, &mut stacks, &padded, i + pad, prefix, &outputs)?;
        }
        match stacks.last_float() {
            Some(value) => outputs.push(*value),
            None => {
                return Err(SymstackError::MalformedGenome(format!(
                    "no float value left on the stack at sample {}",
                    i
                )))
            }
        }
    }
    Ok(outputs)
}

/// Prepend `pad` rows to every feature column
///
/// Initial-condition rows must match the pad width exactly; silently
/// accepting a different row count would shift every lagged lookup.
fn padded_columns(
    features: &FeatureMatrix,
    pad: usize,
    ic: Option<&InitialConditions>,
) -> Result<Vec<Vec<f64>>> {
    let n_columns = features.n_columns();
    let ic_rows = match ic {
        Some(ic) if !ic.features.is_empty() => {
            if ic.features.len() != pad {
                return Err(SymstackError::Data(format!(
                    "initial conditions carry {} feature rows, expected {}",
                    ic.features.len(),
                    pad
                )));
            }
            Some(&ic.features)
        }
        _ => None,
    };

    let mut padded = Vec::with_capacity(n_columns);
    for c in 0..n_columns {
        let mut column = Vec::with_capacity(pad + features.n_rows());
        match ic_rows {
            Some(rows) => {
                for (r, row) in rows.iter().enumerate() {
                    let value = row.get(c).copied().ok_or_else(|| {
                        SymstackError::Data(format!(
                            "initial condition row {} has {} values, expected {}",
                            r,
                            row.len(),
                            n_columns
                        ))
                    })?;
                    column.push(value);
                }
            }
            None => column.extend(std::iter::repeat(0.0).take(pad)),
        }
        column.extend_from_slice(features.column(c)?);
        padded.push(column);
    }
    Ok(padded)
}

fn step_scalar(
    op: &Op,
    stacks: &mut ScalarStacks,
    padded: &[Vec<f64>],
    row: usize,
    prefix: &[f64],
    outputs: &[f64],
) -> Result<()> {
    match op.numeric_rule() {
        NumericRule::BinaryFloat(rule) => {
            let a = stacks.pop_float()?;
            let b = stacks.pop_float()?;
            stacks.push_float(protected::scrub_value(op.symbol(), rule(a, b)));
        }
        NumericRule::UnaryFloat(rule) => {
            let a = stacks.pop_float()?;
            stacks.push_float(protected::scrub_value(op.symbol(), rule(a)));
        }
        NumericRule::Compare(rule) => {
            let a = stacks.pop_float()?;
            let b = stacks.pop_float()?;
            stacks.push_bool(rule(a, b));
        }
        NumericRule::UnaryBool(rule) => {
            let a = stacks.pop_bool()?;
            stacks.push_bool(rule(a));
        }
        NumericRule::BinaryBool(rule) => {
            let a = stacks.pop_bool()?;
            let b = stacks.pop_bool()?;
            stacks.push_bool(rule(a, b));
        }
        NumericRule::Terminal => {
            let value = terminal_value(op, padded, row, prefix, outputs)?;
            let value = match op {
                // History entries were scrubbed when produced; initial
                // condition labels pass through as supplied.
                Op::Recur(_) => value,
                _ => protected::scrub_value(op.symbol(), value),
            };
            stacks.push_float(value);
        }
    }
    Ok(())
}

fn terminal_value(
    op: &Op,
    padded: &[Vec<f64>],
    row: usize,
    prefix: &[f64],
    outputs: &[f64],
) -> Result<f64> {
    let value = match op {
        Op::Var(index) => column_value(padded, *index, row)?,
        Op::VarDelay { index, lag } => match row.checked_sub(*lag) {
            Some(r) => column_value(padded, *index, r)?,
            None => {
                log::debug!("delay {} reaches before the padded window, using 0.0", lag);
                0.0
            }
        },
        Op::Const(value) | Op::ConstDelay(value) => *value,
        Op::Recur(lag) => {
            // lag 1 is the most recent history entry; a lag reaching past
            // the available history resolves to zero.
            let len = prefix.len() + outputs.len();
            if *lag >= 1 && *lag <= len {
                let idx = len - *lag;
                if idx < prefix.len() {
                    prefix[idx]
                } else {
                    outputs[idx - prefix.len()]
                }
            } else {
                0.0
            }
        }
        other => {
            return Err(SymstackError::Evaluation(format!(
                "'{}' is not a terminal",
                other.symbol()
            )))
        }
    };
    Ok(value)
}

fn column_value(padded: &[Vec<f64>], index: usize, row: usize) -> Result<f64> {
    let column = padded.get(index).ok_or_else(|| {
        SymstackError::Evaluation(format!(
            "feature index {} out of range ({} columns)",
            index,
            padded.len()
        ))
    })?;
    Ok(column.get(row).copied().unwrap_or(0.0))
}
