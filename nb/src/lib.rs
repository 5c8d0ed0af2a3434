//! This library implements [naive Bayes](https://en.wikipedia.org/wiki/Naive_Bayes_classifier)
//! classifiers following the `linfa` conventions.
//!
//! Under the naive assumption, features are independent given the class:
//!
//! `p(c | x) ~ prior(c) * p(x_1 | c) * ... * p(x_nx | c)`
//!
//! The product of many small densities quickly underflows, so classes are
//! ranked with log scores and posteriors are normalized with a max-shifted softmax.
//!
//! The conditional density family is chosen with [DensityKind]:
//! * [DensityKind::Gaussian] for continuous features,
//! * [DensityKind::Multinomial] for counts,
//! * [DensityKind::Bernoulli] for binary features.
//!
//! Discrete models use an additive (Laplace) smoothing so that a feature value
//! never seen in a class does not give a null score. The gaussian model adds a
//! portion of the largest feature variance to every variance.
//!
//! # Example
//!
//! ```
//! use egolearn_nb::{DensityKind, NaiveBayes};
//! use linfa::prelude::*;
//! use ndarray::array;
//!
//! // word counts of short messages, label 1 for spam
//! let x = array![[2., 0., 1.], [3., 0., 0.], [0., 2., 3.], [0., 3., 1.]];
//! let y = array![0usize, 0, 1, 1];
//! let model = NaiveBayes::params()
//!     .density(DensityKind::Multinomial)
//!     .alpha(1.0)
//!     .fit(&Dataset::new(x, y))
//!     .expect("naive Bayes trained");
//!
//! assert_eq!(model.predict(&array![[0., 1., 1.]]), array![1usize]);
//! ```
#![warn(missing_docs)]
mod algorithm;
mod density;
mod errors;
mod parameters;

pub use algorithm::*;
pub use density::ClassDensity;
pub use errors::*;
pub use parameters::*;
