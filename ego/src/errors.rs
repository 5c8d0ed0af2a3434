use thiserror::Error;

use crate::EgorState;

/// Result alias of the optimizer operations
pub type Result<T> = std::result::Result<T, EgoError>;

/// Failures of the EGO optimizer
#[derive(Error, Debug)]
pub enum EgoError {
    /// Configuration rejected by `EgorConfig::check()`
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    /// Surrogate fit or prediction failure
    #[error("Surrogate error: {0}")]
    GpError(#[from] egolearn_gp::GpError),
    /// Unexpected value, e.g. objective outputs of the wrong shape
    #[error("Value error: {0}")]
    InvalidValue(String),
    /// History or configuration files cannot be written
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// History cannot be written in npy format
    #[error("Npy write error: {0}")]
    WriteNpyError(#[from] ndarray_npy::WriteNpyError),
    /// Configuration cannot be serialized
    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// Error raised within the argmin executor
    #[error(transparent)]
    ArgminError(#[from] argmin::core::Error),
    /// The step did not add any point to the doe, the state is handed back
    /// so that the run ends as converged
    #[error("No more point to add to the doe")]
    NoMorePointToAddError(Box<EgorState<f64>>),
}
