pub mod evaluator;
pub mod recurrent;
pub mod stacks;

pub use stacks::DualStacks;

use crate::config::LagConfig;
use crate::data::FeatureMatrix;
use crate::error::Result;
use crate::types::{InitialConditions, Output, OutputMode, Program};
use rayon::prelude::*;

/// Front door for program evaluation
///
/// Holds the lag configuration shared by every autoregressive run; the
/// vectorized path ignores it. One evaluator serves concurrent callers
/// safely: every call allocates its own transient stacks and reads the
/// feature matrix without mutation.
pub struct ModelEvaluator {
    lags: LagConfig,
}

impl ModelEvaluator {
    pub fn new() -> Self {
        Self {
            lags: LagConfig::default(),
        }
    }

    pub fn with_lags(lags: LagConfig) -> Self {
        Self { lags }
    }

    pub fn lags(&self) -> &LagConfig {
        &self.lags
    }

    /// Evaluate one program against the feature matrix
    pub fn evaluate(&self, program: &Program, features: &FeatureMatrix) -> Result<Output> {
        self.evaluate_with_ic(program, features, None)
    }

    /// Evaluate with initial conditions seeding the autoregressive window
    pub fn evaluate_with_ic(
        &self,
        program: &Program,
        features: &FeatureMatrix,
        ic: Option<&InitialConditions>,
    ) -> Result<Output> {
        match program.mode() {
            OutputMode::Autoregressive => {
                let outputs = recurrent::evaluate_recurrent(program, features, &self.lags, ic)?;
                Ok(Output::Column(outputs))
            }
            _ => evaluator::evaluate_columns(program, features),
        }
    }

    /// Evaluate a batch of programs in parallel
    ///
    /// Programs are independent and the matrix is read-only, so the batch
    /// fans out over the rayon pool. Result order matches input order.
    pub fn evaluate_many(
        &self,
        programs: &[Program],
        features: &FeatureMatrix,
    ) -> Vec<Result<Output>> {
        programs
            .par_iter()
            .map(|program| self.evaluate(program, features))
            .collect()
    }
}

impl Default for ModelEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::Op;

    #[test]
    fn test_mode_dispatch() {
        let features = FeatureMatrix::from_rows(vec![vec![1.0], vec![2.0]]).unwrap();
        let evaluator = ModelEvaluator::new();

        let vectorized = Program::new(vec![Op::Var(0)]);
        let out = evaluator.evaluate(&vectorized, &features).unwrap();
        assert_eq!(out.as_column().unwrap(), &[1.0, 2.0]);

        let recurrent = Program::with_mode(vec![Op::Recur(1)], OutputMode::Autoregressive);
        let out = evaluator.evaluate(&recurrent, &features).unwrap();
        assert_eq!(out.as_column().unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let features =
            FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
                .unwrap();
        let evaluator = ModelEvaluator::new();
        let programs = vec![
            Program::new(vec![Op::Var(0)]),
            Program::new(vec![Op::Var(0), Op::Var(1), Op::Add]),
            Program::new(vec![]),
        ];

        let batch = evaluator.evaluate_many(&programs, &features);
        assert_eq!(batch.len(), 3);
        for (program, result) in programs.iter().zip(&batch) {
            let sequential = evaluator.evaluate(program, &features);
            match (result, sequential) {
                (Ok(a), Ok(b)) => assert_eq!(*a, b),
                (Err(_), Err(_)) => {}
                _ => panic!("batch and sequential evaluation disagree"),
            }
        }
    }
}
