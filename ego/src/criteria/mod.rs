//! Available infill criteria to be used by Egor solver
mod ei;
mod lcb;
mod sb;

pub use ei::{ExpectedImprovement, EI};
pub use lcb::{LowerConfidenceBound, LCB};
pub use sb::{SurrogateBased, SB};

use dyn_clonable::*;
use egolearn_gp::GpSurrogate;
use ndarray::ArrayView;

/// A trait for infill criterion which maximum location will
/// determine the next most promising point expected to be the
/// optimum location of the objective function
#[clonable]
#[typetag::serde(tag = "type_infill")]
pub trait InfillCriterion: Clone + Sync + Send {
    /// Name of the infill criterion
    fn name(&self) -> &'static str;

    /// Criterion value at given point x with regards to given
    /// surrogate of the objective function and the current found min
    fn value(&self, x: &[f64], obj_model: &dyn GpSurrogate, fmin: f64) -> f64;

    /// Whether the maximum value found for the criterion means no
    /// improvement can be expected anymore
    fn is_exhausted(&self, _value: f64, _infill_tol: f64) -> bool {
        false
    }
}

impl std::fmt::Debug for dyn InfillCriterion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Predicted mean and variance of `obj_model` at the single point `x`
pub(crate) fn predict_at(obj_model: &dyn GpSurrogate, x: &[f64]) -> Option<(f64, f64)> {
    let pt = ArrayView::from_shape((1, x.len()), x).ok()?;
    obj_model
        .predict_valvar(&pt)
        .ok()
        .map(|(p, s)| (p[0], s[0].max(0.)))
}

#[cfg(test)]
pub(crate) mod tests {
    use egolearn_gp::{GpSurrogate, Result};
    use ndarray::{Array1, ArrayView2};
    use std::fmt;

    /// Surrogate predicting the same mean and variance everywhere
    pub(crate) struct FlatSurrogate {
        pub mean: f64,
        pub var: f64,
    }

    impl fmt::Display for FlatSurrogate {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "Flat(mean={}, var={})", self.mean, self.var)
        }
    }

    impl GpSurrogate for FlatSurrogate {
        fn dims(&self) -> (usize, usize) {
            (1, 1)
        }

        fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
            Ok(Array1::from_elem(x.nrows(), self.mean))
        }

        fn predict_var(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
            Ok(Array1::from_elem(x.nrows(), self.var))
        }

        fn predict_valvar(&self, x: &ArrayView2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
            Ok((self.predict(x)?, self.predict_var(x)?))
        }
    }
}
