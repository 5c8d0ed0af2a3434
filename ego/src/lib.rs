//! This library implements the Efficient Global Optimization method (EGO)
//! and its constrained variant (SEGO) on top of the [argmin] framework.
//!
//! Objective and constraints are expected to be computed grouped at the same time
//! hence the given function should return a matrix where the first column
//! holds the objective values and the remaining ones the constraint values.
//! The optimizer comes with a set of options to:
//! * specify the initial doe (evaluated or not),
//! * choose the infill criterion (EI, SB, LCB),
//! * declare inequality and equality constraints,
//! * save the configuration and the optimization history.
//!
//! # Examples
//!
//! ## Continuous optimization
//!
//! ```
//! use ndarray::{array, Array2, ArrayView2};
//! use egolearn_ego::EgorBuilder;
//!
//! // A one-dimensional test function, x in [0., 25.] and min xsinx(x) ~ -15.1 at x ~ 18.9
//! fn xsinx(x: &ArrayView2<f64>) -> Array2<f64> {
//!     (x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())
//! }
//!
//! // We ask for 10 iterations, each evaluating the objective at one new point
//! let res = EgorBuilder::optimize(xsinx)
//!             .configure(|config| config.max_iters(10).seed(42))
//!             .min_within(&array![[0.0, 25.0]])
//!             .expect("optimizer configured")
//!             .run()
//!             .expect("xsinx minimized");
//! println!("Minimum found f(x) = {:?} at x = {:?}", res.y_opt, res.x_opt);
//! ```
//!
//! ## Ask-and-tell
//!
//! [EgorSolver::suggest] returns the next point to evaluate given an evaluated doe,
//! the caller being in charge of the function evaluations.
//!
//! ```no_run
//! use ndarray::{array, concatenate, Axis};
//! use egolearn_ego::{EgorConfig, EgorSolver};
//!
//! let config = EgorConfig::default()
//!     .xlimits(&array![[0., 25.]])
//!     .check()
//!     .expect("valid configuration");
//! let solver = EgorSolver::new(config);
//! let mut x = array![[0.], [7.], [25.]];
//! let mut y = x.mapv(|v: f64| (v - 3.5) * ((v - 3.5) / std::f64::consts::PI).sin());
//! for _ in 0..10 {
//!     let x_next = solver.suggest(&x, &y).expect("next point").insert_axis(Axis(0));
//!     let y_next = x_next.mapv(|v| (v - 3.5) * ((v - 3.5) / std::f64::consts::PI).sin());
//!     x = concatenate![Axis(0), x, x_next];
//!     y = concatenate![Axis(0), y, y_next];
//! }
//! ```
//!
//! # Reference
//!
//! Jones, D. R., Schonlau, M., & Welch, W. J. (1998). Efficient global optimization
//! of expensive black-box functions. Journal of Global optimization, 13(4), 455-492.
//!
//! Bartoli, Nathalie, et al. Adaptive modeling strategy for constrained global
//! optimization with application to aerodynamic wing design.
//! Aerospace Science and technology 90 (2019): 85-102.
//!
#![warn(missing_docs)]
pub mod criteria;

mod egor;
mod errors;
mod solver;
mod types;
mod utils;

pub use crate::criteria::*;
pub use crate::egor::*;
pub use crate::errors::*;
pub use crate::solver::*;
pub use crate::types::*;
pub use crate::utils::{
    cstr_violation, find_best_result_index, is_feasible, norm_cdf, norm_pdf,
};
