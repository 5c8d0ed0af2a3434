use crate::EgorState;
use argmin::core::CostFunction;
use linfa::Float;
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Outcome of an optimization run
#[derive(Clone, Debug)]
pub struct OptimResult<F: Float> {
    /// Best point found
    pub x_opt: Array1<F>,
    /// Outputs at `x_opt`: objective then constraints
    pub y_opt: Array1<F>,
    /// All evaluated points, initial doe first
    pub x_doe: Array2<F>,
    /// Outputs at `x_doe`
    pub y_doe: Array2<F>,
    /// Final solver state
    pub state: EgorState<F>,
}

/// Acquisition function maximized to pick the next point to evaluate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum InfillStrategy {
    /// Expected Improvement
    EI,
    /// Surrogate based: minimum of the surrogate mean
    SB,
    /// Lower confidence bound `mu - k * sigma`
    LCB {
        /// weight of the standard deviation
        k: f64,
    },
}

/// Feasibility relation of a constraint output `c(x)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Feasible when `c(x) >= -cstr_tol`
    Inequality,
    /// Feasible when `|c(x)| <= tol`
    Equality {
        /// half width of the feasibility band
        tol: f64,
    },
}

/// Default half width of the equality constraint feasibility band
pub const DEFAULT_EQUALITY_TOL: f64 = 1e-4;

impl ConstraintKind {
    /// Equality constraint with the default tolerance
    pub fn equality() -> Self {
        ConstraintKind::Equality {
            tol: DEFAULT_EQUALITY_TOL,
        }
    }
}

/// Black-box function under optimization.
///
/// Evaluates a batch of points given as rows and returns one output row per point
/// holding `[objective, cstr_1, ..., cstr_n]`.
pub trait GroupFunc: Clone + Fn(&ArrayView2<f64>) -> Array2<f64> {}
impl<T> GroupFunc for T where T: Clone + Fn(&ArrayView2<f64>) -> Array2<f64> {}

/// Adapter of a [GroupFunc] to `argmin::core::CostFunction`
#[derive(Clone)]
pub struct ObjFunc<O: GroupFunc> {
    fobj: O,
}

impl<O: GroupFunc> ObjFunc<O> {
    /// Wraps `fobj`
    pub fn new(fobj: O) -> Self {
        ObjFunc { fobj }
    }
}

impl<O: GroupFunc> CostFunction for ObjFunc<O> {
    type Param = Array2<f64>;
    type Output = Array2<f64>;

    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        Ok((self.fobj)(&p.view()))
    }
}
