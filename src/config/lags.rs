use super::traits::ConfigSection;
use crate::error::SymstackError;
use serde::{Deserialize, Serialize};

/// Lag orders for autoregressive evaluation
///
/// `input_lag` is how many past rows of each feature the window reaches
/// back; `input_delay` shifts the whole window further into the past.
/// `output_lag`/`output_delay` bound the recurrence depth a model is
/// expected to use; a program reading further back than
/// `output_lag + output_delay` still evaluates (missing history resolves to
/// zero) but is logged as suspicious.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagConfig {
    pub input_lag: usize,
    pub input_delay: usize,
    pub output_lag: usize,
    pub output_delay: usize,
}

impl Default for LagConfig {
    fn default() -> Self {
        Self {
            input_lag: 1,
            input_delay: 0,
            output_lag: 1,
            output_delay: 1,
        }
    }
}

impl LagConfig {
    /// Deepest recurrence lag the configuration accounts for
    pub fn max_output_lag(&self) -> usize {
        self.output_lag + self.output_delay
    }
}

impl ConfigSection for LagConfig {
    fn section_name() -> &'static str {
        "lags"
    }

    fn validate(&self) -> Result<(), SymstackError> {
        if self.output_lag == 0 {
            return Err(SymstackError::Configuration(
                "Output lag order must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(LagConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_output_order_rejected() {
        let lags = LagConfig {
            output_lag: 0,
            ..LagConfig::default()
        };
        assert!(lags.validate().is_err());
    }

    #[test]
    fn test_max_output_lag() {
        let lags = LagConfig {
            output_lag: 2,
            output_delay: 1,
            ..LagConfig::default()
        };
        assert_eq!(lags.max_output_lag(), 3);
    }
}
