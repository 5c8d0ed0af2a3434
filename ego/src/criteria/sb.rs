use crate::criteria::{predict_at, InfillCriterion};
use egolearn_gp::GpSurrogate;
use serde::{Deserialize, Serialize};

/// Surrogate based criterion: the next point minimizes the surrogate mean
#[derive(Clone, Serialize, Deserialize)]
pub struct SurrogateBased;

#[typetag::serde]
impl InfillCriterion for SurrogateBased {
    fn name(&self) -> &'static str {
        "SB"
    }

    fn value(&self, x: &[f64], obj_model: &dyn GpSurrogate, _fmin: f64) -> f64 {
        predict_at(obj_model, x).map_or(f64::MIN, |(pred, _)| -pred)
    }
}

/// Surrogate based infill criterion
pub const SB: SurrogateBased = SurrogateBased {};
