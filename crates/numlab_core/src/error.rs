use thiserror::Error;

/// Failures reported by the integrators, solvers and preconditioners.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumError {
    /// Malformed grid or parameters; fatal to the run that received them.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// An incomplete factorization could not be built. Callers usually
    /// recover by running without a preconditioner.
    #[error("preconditioner construction failed: {0}")]
    PreconditionerConstruction(String),
}

impl NumError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        NumError::InvalidInput(message.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, NumError::InvalidInput(_))
    }
}
