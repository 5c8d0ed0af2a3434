use thiserror::Error;

/// A result type for naive Bayes algorithms
pub type Result<T> = std::result::Result<T, NbError>;

/// An error when using naive Bayes algorithms
#[derive(Error, Debug)]
pub enum NbError {
    /// When parameters are not valid
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    /// When a declared class has no sample
    #[error("No sample for class {0}")]
    EmptyClass(usize),
    /// When a label is not one of the fitted or declared classes
    #[error("Unknown class {0}")]
    UnknownClass(usize),
    /// When points have not the expected number of features
    #[error("Expected {expected} features, got {actual}")]
    DimensionMismatch {
        /// number of features of the fitted model
        expected: usize,
        /// number of features given
        actual: usize,
    },
    /// When feature values are not valid for the density family
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
}
