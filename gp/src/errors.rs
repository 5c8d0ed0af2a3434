use thiserror::Error;

/// Result alias of the GP operations
pub type Result<T> = std::result::Result<T, GpError>;

/// Failures of [`GaussianProcess`](crate::GaussianProcess) fitting and prediction
#[derive(Error, Debug)]
pub enum GpError {
    /// Reduced likelihood cannot be evaluated for the given hyperparameters
    #[error("Likelihood error: {0}")]
    LikelihoodComputationError(String),
    /// Cholesky factorization or triangular solve failure
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// Bad input value or shape
    #[error("Invalid value: {0}")]
    InvalidValueError(String),
    /// No start of the hyperparameters optimization succeeded
    #[error("Hyperparameters optimization failed: {0}")]
    HyperparametersOptimizationError(String),
    /// Error forwarded from linfa (parameter checks, datasets)
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
}
