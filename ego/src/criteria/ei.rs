use crate::criteria::{predict_at, InfillCriterion};
use crate::utils::{norm_cdf, norm_pdf};
use egolearn_gp::GpSurrogate;

use serde::{Deserialize, Serialize};

/// A structure for Expected Improvement implementation
#[derive(Clone, Serialize, Deserialize)]
pub struct ExpectedImprovement;

#[typetag::serde]
impl InfillCriterion for ExpectedImprovement {
    fn name(&self) -> &'static str {
        "EI"
    }

    /// Compute EI infill criterion at given `x` point using the surrogate model `obj_model`
    /// and the current minimum of the objective function.
    fn value(&self, x: &[f64], obj_model: &dyn GpSurrogate, fmin: f64) -> f64 {
        match predict_at(obj_model, x) {
            Some((pred, var)) => {
                if var < f64::EPSILON {
                    0.0
                } else {
                    let sigma = var.sqrt();
                    let args0 = (fmin - pred) / sigma;
                    let args1 = args0 * norm_cdf(args0);
                    let args2 = norm_pdf(args0);
                    sigma * (args1 + args2)
                }
            }
            None => 0.0,
        }
    }

    fn is_exhausted(&self, value: f64, infill_tol: f64) -> bool {
        value < infill_tol
    }
}

/// Expected Improvement infill criterion
pub const EI: ExpectedImprovement = ExpectedImprovement {};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::tests::FlatSurrogate;
    use approx::assert_abs_diff_eq;
    use egolearn_doe::{FullFactorial, SamplingMethod};
    use egolearn_gp::{make_surrogate_params, CorrKind, MeanKind};
    use ndarray::{array, Array2, ArrayView2};
    use ndarray_stats::QuantileExt;

    fn xsinx(x: &ArrayView2<f64>) -> Array2<f64> {
        (x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())
    }

    #[test]
    fn test_ei_zero_variance() {
        let model = FlatSurrogate {
            mean: -3.,
            var: 0.,
        };
        assert_eq!(EI.value(&[1.], &model, 0.), 0.);
        assert!(EI.is_exhausted(EI.value(&[1.], &model, 0.), 1e-12));
    }

    #[test]
    fn test_ei_closed_form() {
        // z = 0 : EI = sigma * pdf(0)
        let model = FlatSurrogate { mean: 1., var: 4. };
        assert_abs_diff_eq!(
            EI.value(&[0.], &model, 1.),
            2. * 0.3989422804014327,
            epsilon = 1e-12
        );
        // far below the current min, EI ~ fmin - mu
        let model = FlatSurrogate {
            mean: -10.,
            var: 1e-4,
        };
        assert_abs_diff_eq!(EI.value(&[0.], &model, 0.), 10., epsilon = 1e-8);
    }

    #[test]
    fn test_ei_on_xsinx_surrogate() {
        let xt = array![[0.0], [7.0], [25.0]];
        let yt = xsinx(&xt.view()).column(0).to_owned();
        let gp = make_surrogate_params(MeanKind::Constant, CorrKind::SquaredExponential)
            .train(&xt.view(), &yt.view())
            .expect("GP training");
        let fmin = *yt.min().unwrap();
        let grid = FullFactorial::new(&array![[0., 25.]]).sample(100);
        let values = grid.column(0).mapv(|v| EI.value(&[v], gp.as_ref(), fmin));
        assert!(values.iter().all(|v| *v >= 0.));
        assert!(values.iter().any(|v| *v > 0.));
    }
}
