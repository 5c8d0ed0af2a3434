//! `egolearn` gathers two numeric procedures:
//!
//! * [nb]: naive Bayes classifiers scoring classes in log space,
//! * [ego]: efficient global optimization (EGO) driven by a Gaussian process
//!   surrogate ([gp]) and its constrained variant (SEGO).
//!
//! Initial designs of experiments are drawn with [doe].
//!
//! ```
//! use egolearn::ego::EgorBuilder;
//! use egolearn::nb::NaiveBayes;
//! use linfa::prelude::*;
//! use ndarray::{array, Array2, ArrayView2};
//!
//! let x = array![[1.82, 81.6], [1.80, 86.2], [1.52, 45.4], [1.65, 59.0]];
//! let y = array![0usize, 0, 1, 1];
//! let model = NaiveBayes::params()
//!     .fit(&Dataset::new(x, y))
//!     .expect("naive Bayes trained");
//! assert_eq!(model.predict(&array![[1.55, 50.]]), array![1usize]);
//!
//! fn sphere(x: &ArrayView2<f64>) -> Array2<f64> {
//!     x.mapv(|v| v * v).sum_axis(ndarray::Axis(1)).insert_axis(ndarray::Axis(1))
//! }
//! let res = EgorBuilder::optimize(sphere)
//!     .configure(|config| config.max_iters(5).seed(42))
//!     .min_within(&array![[-1., 1.]])
//!     .expect("optimizer configured")
//!     .run()
//!     .expect("sphere minimized");
//! assert!(res.y_opt[0] < 0.25);
//! ```
pub use egolearn_doe as doe;
pub use egolearn_ego as ego;
pub use egolearn_gp as gp;
pub use egolearn_nb as nb;
