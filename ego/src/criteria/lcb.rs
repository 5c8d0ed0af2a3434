use crate::criteria::{predict_at, InfillCriterion};
use egolearn_gp::GpSurrogate;
use serde::{Deserialize, Serialize};

/// Lower confidence bound criterion: the next point minimizes `mu - k * sigma`
#[derive(Clone, Serialize, Deserialize)]
pub struct LowerConfidenceBound {
    /// Weight of the standard deviation
    pub k: f64,
}

impl Default for LowerConfidenceBound {
    fn default() -> Self {
        LCB
    }
}

#[typetag::serde]
impl InfillCriterion for LowerConfidenceBound {
    fn name(&self) -> &'static str {
        "LCB"
    }

    fn value(&self, x: &[f64], obj_model: &dyn GpSurrogate, _fmin: f64) -> f64 {
        predict_at(obj_model, x).map_or(f64::MIN, |(pred, var)| -(pred - self.k * var.sqrt()))
    }
}

/// Lower confidence bound infill criterion with `k = 3`
pub const LCB: LowerConfidenceBound = LowerConfidenceBound { k: 3. };

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::tests::FlatSurrogate;
    use crate::criteria::SB;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lcb_and_sb() {
        let model = FlatSurrogate { mean: 2., var: 0.25 };
        assert_abs_diff_eq!(LCB.value(&[0.], &model, 0.), -0.5, epsilon = 1e-12);
        let lcb = LowerConfidenceBound { k: 1. };
        assert_abs_diff_eq!(lcb.value(&[0.], &model, 0.), -1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(SB.value(&[0.], &model, 0.), -2., epsilon = 1e-12);
        assert!(!LCB.is_exhausted(-1e3, 1e-12));
    }
}
