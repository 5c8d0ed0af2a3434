//! This library implements [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process) regression
//! also known as [Kriging](https://en.wikipedia.org/wiki/Kriging) models.
//!
//! The fitted model interpolates the training data and provides a variance
//! estimate of its prediction, which makes it suitable as a surrogate of
//! expensive functions in sequential optimization.
//!
//! GP methods are implemented by [GaussianProcess] parameterized by [GpParams].
//! Models are also available as boxed [GpSurrogate] trait objects through
//! [GpSurrogateParams].
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
pub mod correlation_models;
mod errors;
pub mod mean_models;
mod optimization;
mod parameters;
mod surrogates;
mod utils;

pub use algorithm::*;
pub use errors::*;
pub use parameters::*;
pub use surrogates::*;
