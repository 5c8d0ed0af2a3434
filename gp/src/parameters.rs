use crate::correlation_models::CorrelationModel;
use crate::errors::{GpError, Result};
use crate::mean_models::RegressionModel;
use crate::{GP_COBYLA_MAX_EVAL, GP_COBYLA_MIN_EVAL, GP_OPTIM_N_START};
use linfa::{Float, ParamGuard};

use ndarray::{array, Array1};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Tuning policy of the correlation hyperparameters `theta`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum ThetaTuning<F: Float> {
    /// Given constant value, no optimization
    Fixed(Array1<F>),
    /// Value optimized within bounds (lower, upper) starting from the initial guess
    Full {
        /// Initial guess, either 1-dim (shared by all components) or nx-dim
        init: Array1<F>,
        /// Bounds, either 1-dim (shared by all components) or nx-dim
        bounds: Array1<(F, F)>,
    },
}

impl<F: Float> Default for ThetaTuning<F> {
    fn default() -> Self {
        ThetaTuning::Full {
            init: array![F::cast(ThetaTuning::<F>::DEFAULT_INIT)],
            bounds: array![(
                F::cast(ThetaTuning::<F>::DEFAULT_BOUNDS.0),
                F::cast(ThetaTuning::<F>::DEFAULT_BOUNDS.1),
            )],
        }
    }
}

impl<F: Float> ThetaTuning<F> {
    /// Initial guess shared by all theta components
    pub const DEFAULT_INIT: f64 = 1e-1;
    /// Default bounds for theta values
    pub const DEFAULT_BOUNDS: (f64, f64) = (1e-4, 1e2);

    /// Initial guess, or the value itself when fixed
    pub fn init(&self) -> &Array1<F> {
        match self {
            ThetaTuning::Full { init, .. } => init,
            ThetaTuning::Fixed(init) => init,
        }
    }

    /// Get bounds for theta value, `None` when fixed
    pub fn bounds(&self) -> Option<&Array1<(F, F)>> {
        match self {
            ThetaTuning::Full { bounds, .. } => Some(bounds),
            ThetaTuning::Fixed(_) => None,
        }
    }
}

/// GP hyperparameters checked by [ParamGuard], ready to fit a [crate::GaussianProcess].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, Mean: Serialize, Corr: Serialize",
        deserialize = "F: Deserialize<'de>, Mean: Deserialize<'de>, Corr: Deserialize<'de>"
    ))
)]
pub struct GpValidParams<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> {
    /// Tuning of the correlation hyperparameters
    pub(crate) theta_tuning: ThetaTuning<F>,
    /// Trend of the process
    pub(crate) mean: Mean,
    /// Kernel correlating the residuals at two points
    pub(crate) corr: Corr,
    /// Number of additional starts of the likelihood optimization
    pub(crate) n_start: usize,
    /// Max number of likelihood evaluations of one optimization
    pub(crate) max_eval: usize,
    /// Initial diagonal jitter of the correlation matrix
    pub(crate) nugget: F,
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> Default
    for GpValidParams<F, Mean, Corr>
{
    fn default() -> GpValidParams<F, Mean, Corr> {
        GpValidParams {
            theta_tuning: ThetaTuning::default(),
            mean: Mean::default(),
            corr: Corr::default(),
            n_start: GP_OPTIM_N_START,
            max_eval: GP_COBYLA_MAX_EVAL,
            nugget: F::cast(100.0) * F::epsilon(),
        }
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> GpValidParams<F, Mean, Corr> {
    /// Get mean model
    pub fn mean(&self) -> &Mean {
        &self.mean
    }

    /// Get correlation model
    pub fn corr(&self) -> &Corr {
        &self.corr
    }

    /// Get theta tuning policy
    pub fn theta_tuning(&self) -> &ThetaTuning<F> {
        &self.theta_tuning
    }

    /// Get the number of additional optimization starts
    pub fn n_start(&self) -> usize {
        self.n_start
    }

    /// Get the max number of likelihood evaluations during one optimization
    pub fn max_eval(&self) -> usize {
        self.max_eval
    }

    /// Get initial nugget
    pub fn nugget(&self) -> F {
        self.nugget
    }
}

#[derive(Clone, Debug)]
/// Builder of the GP hyperparameters, validated into [GpValidParams]
/// by `check()` or when fitting.
pub struct GpParams<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>>(
    GpValidParams<F, Mean, Corr>,
);

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> GpParams<F, Mean, Corr> {
    /// Default hyperparameters around the given trend and kernel
    pub fn new(mean: Mean, corr: Corr) -> GpParams<F, Mean, Corr> {
        Self(GpValidParams {
            mean,
            corr,
            ..Default::default()
        })
    }

    /// Set mean model.
    pub fn mean(mut self, mean: Mean) -> Self {
        self.0.mean = mean;
        self
    }

    /// Set correlation model.
    pub fn corr(mut self, corr: Corr) -> Self {
        self.0.corr = corr;
        self
    }

    /// Set initial value of theta.
    ///
    /// When theta is optimized, optimization starts from `theta_init`,
    /// otherwise it is the fixed value.
    pub fn theta_init(mut self, theta_init: Array1<F>) -> Self {
        self.0.theta_tuning = match self.0.theta_tuning {
            ThetaTuning::Full { bounds, .. } => ThetaTuning::Full {
                init: theta_init,
                bounds,
            },
            ThetaTuning::Fixed(_) => ThetaTuning::Fixed(theta_init),
        };
        self
    }

    /// Set theta search space, no-op when theta is fixed.
    pub fn theta_bounds(mut self, theta_bounds: Array1<(F, F)>) -> Self {
        if let ThetaTuning::Full { init, .. } = self.0.theta_tuning {
            self.0.theta_tuning = ThetaTuning::Full {
                init,
                bounds: theta_bounds,
            };
        }
        self
    }

    /// Set theta tuning policy
    pub fn theta_tuning(mut self, theta_tuning: ThetaTuning<F>) -> Self {
        self.0.theta_tuning = theta_tuning;
        self
    }

    /// Set the number of additional likelihood optimization starts
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.0.n_start = n_start;
        self
    }

    /// Set the max number of likelihood evaluations during one optimization,
    /// at least [crate::GP_COBYLA_MIN_EVAL].
    pub fn max_eval(mut self, max_eval: usize) -> Self {
        self.0.max_eval = GP_COBYLA_MIN_EVAL.max(max_eval);
        self
    }

    /// Set initial nugget.
    ///
    /// Nugget is added to the diagonal of the correlation matrix for numerical stability,
    /// it is increased when the factorization fails.
    pub fn nugget(mut self, nugget: F) -> Self {
        self.0.nugget = nugget;
        self
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>>
    From<GpValidParams<F, Mean, Corr>> for GpParams<F, Mean, Corr>
{
    fn from(valid: GpValidParams<F, Mean, Corr>) -> Self {
        GpParams(valid)
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> ParamGuard
    for GpParams<F, Mean, Corr>
{
    type Checked = GpValidParams<F, Mean, Corr>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let params = &self.0;
        if !(params.nugget > F::zero() && params.nugget.is_finite()) {
            return Err(GpError::InvalidValueError(format!(
                "`nugget` should be strictly positive, got {}",
                params.nugget
            )));
        }
        let init = params.theta_tuning.init();
        if init.is_empty() || init.iter().any(|t| !(*t > F::zero() && t.is_finite())) {
            return Err(GpError::InvalidValueError(format!(
                "theta values should be strictly positive, got {init}"
            )));
        }
        if let Some(bounds) = params.theta_tuning.bounds() {
            if bounds.is_empty() || bounds.iter().any(|(lo, up)| !(*lo > F::zero() && lo <= up)) {
                return Err(GpError::InvalidValueError(
                    "theta bounds should verify 0 < lower <= upper".to_string(),
                ));
            }
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
