//! Error types.
//!
//! - `AnalysisError`: typed failures of the analysis engine (fit, prediction, titer)
//! - `AppError`: what the binary reports, carrying a process exit code

use thiserror::Error;

/// Exit code for bad input (dataset, scalar inputs, files).
pub const EXIT_INPUT: u8 = 2;
/// Exit code for computations that are undefined for otherwise valid input.
pub const EXIT_COMPUTE: u8 = 3;

/// Failures of the analysis engine.
///
/// Every variant is deterministic in its inputs; retrying with the same input
/// yields the same error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The standard-curve dataset breaks a structural or value invariant.
    #[error("Invalid standard curve data: {reason}")]
    InvalidData { reason: String },

    /// All log10(SQ) values are equal, so the slope is undefined.
    #[error("Degenerate fit: {reason}")]
    DegenerateFit { reason: String },

    /// SQ cannot be predicted from the current curve.
    #[error("Undefined prediction: {reason}")]
    UndefinedPrediction { reason: String },

    /// A required scalar input was not supplied.
    #[error("Missing input: {name}")]
    MissingInput { name: &'static str },

    /// A scalar input is non-positive or non-finite.
    #[error("Invalid parameter: {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

impl AnalysisError {
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidData {
            reason: reason.into(),
        }
    }

    pub fn undefined_prediction(reason: impl Into<String>) -> Self {
        Self::UndefinedPrediction {
            reason: reason.into(),
        }
    }

    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            AnalysisError::InvalidData { .. }
            | AnalysisError::MissingInput { .. }
            | AnalysisError::InvalidParameter { .. } => EXIT_INPUT,
            AnalysisError::DegenerateFit { .. } | AnalysisError::UndefinedPrediction { .. } => {
                EXIT_COMPUTE
            }
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_errors_map_to_exit_codes() {
        let input = AppError::from(AnalysisError::MissingInput { name: "dilution_factor" });
        assert_eq!(input.exit_code(), EXIT_INPUT);
        assert_eq!(input.to_string(), "Missing input: dilution_factor");

        let compute = AppError::from(AnalysisError::DegenerateFit {
            reason: "all log10(SQ) values are equal".to_string(),
        });
        assert_eq!(compute.exit_code(), EXIT_COMPUTE);
    }
}
