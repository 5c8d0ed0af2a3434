use crate::errors::Result;
use crate::{correlation_models::*, mean_models::*, GaussianProcess, GpParams, ThetaTuning};
use linfa::prelude::{Dataset, Fit};
use ndarray::{Array1, ArrayView1, ArrayView2};
use paste::paste;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trained GP used as a trait object by sequential optimizers
pub trait GpSurrogate: fmt::Display + Send + Sync {
    /// Input and output dimensions
    fn dims(&self) -> (usize, usize);
    /// Predicted means at the (n, nx) `x` points
    fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>>;
    /// Predicted variances at the (n, nx) `x` points
    fn predict_var(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>>;
    /// Predicted means and variances at the (n, nx) `x` points
    fn predict_valvar(&self, x: &ArrayView2<f64>) -> Result<(Array1<f64>, Array1<f64>)>;
}

/// GP parameters able to train a boxed [GpSurrogate]
pub trait GpSurrogateParams: Send + Sync {
    /// Sets the tuning of the correlation hyperparameters
    fn set_theta_tuning(&mut self, theta_tuning: ThetaTuning<f64>);
    /// Sets the number of likelihood optimization starts
    fn set_n_start(&mut self, n_start: usize);
    /// Trains a surrogate on `x` (n, nx) and `y` (n,)
    fn train(&self, x: &ArrayView2<f64>, y: &ArrayView1<f64>) -> Result<Box<dyn GpSurrogate>>;
}

impl<Mean, Corr> GpSurrogate for GaussianProcess<f64, Mean, Corr>
where
    Mean: RegressionModel<f64>,
    Corr: CorrelationModel<f64>,
{
    fn dims(&self) -> (usize, usize) {
        GaussianProcess::dims(self)
    }

    fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        GaussianProcess::predict(self, x)
    }

    fn predict_var(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>> {
        GaussianProcess::predict_var(self, x)
    }

    fn predict_valvar(&self, x: &ArrayView2<f64>) -> Result<(Array1<f64>, Array1<f64>)> {
        GaussianProcess::predict_valvar(self, x)
    }
}

impl<Mean, Corr> GpSurrogateParams for GpParams<f64, Mean, Corr>
where
    Mean: RegressionModel<f64> + 'static,
    Corr: CorrelationModel<f64> + 'static,
{
    fn set_theta_tuning(&mut self, theta_tuning: ThetaTuning<f64>) {
        *self = self.clone().theta_tuning(theta_tuning);
    }

    fn set_n_start(&mut self, n_start: usize) {
        *self = self.clone().n_start(n_start);
    }

    fn train(&self, x: &ArrayView2<f64>, y: &ArrayView1<f64>) -> Result<Box<dyn GpSurrogate>> {
        let gp = self.fit(&Dataset::new(x.to_owned(), y.to_owned()))?;
        Ok(Box::new(gp))
    }
}

/// Available mean models
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum MeanKind {
    /// See [ConstantMean]
    #[default]
    Constant,
    /// See [LinearMean]
    Linear,
    /// See [QuadraticMean]
    Quadratic,
}

/// Available correlation models
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum CorrKind {
    /// See [SquaredExponentialCorr]
    #[default]
    SquaredExponential,
    /// See [AbsoluteExponentialCorr]
    AbsoluteExponential,
    /// See [Matern32Corr]
    Matern32,
    /// See [Matern52Corr]
    Matern52,
}

macro_rules! make_params {
    ($mean:expr, $corr:expr, $(($regr:ident, $kernel:ident)),*) => {
        paste! {
            match ($mean, $corr) {
                $(
                    (MeanKind::$regr, CorrKind::$kernel) => Box::new(
                        GpParams::<f64, [<$regr Mean>], [<$kernel Corr>]>::new(
                            [<$regr Mean>](),
                            [<$kernel Corr>](),
                        ),
                    ) as Box<dyn GpSurrogateParams>,
                )*
            }
        }
    };
}

/// Default GP parameters for the given mean and correlation models
pub fn make_surrogate_params(mean: MeanKind, corr: CorrKind) -> Box<dyn GpSurrogateParams> {
    make_params!(
        mean,
        corr,
        (Constant, SquaredExponential),
        (Constant, AbsoluteExponential),
        (Constant, Matern32),
        (Constant, Matern52),
        (Linear, SquaredExponential),
        (Linear, AbsoluteExponential),
        (Linear, Matern32),
        (Linear, Matern52),
        (Quadratic, SquaredExponential),
        (Quadratic, AbsoluteExponential),
        (Quadratic, Matern32),
        (Quadratic, Matern52)
    )
}
