use crate::correlation_models::*;
use crate::errors::{GpError, Result};
use crate::mean_models::*;
use crate::optimization::{optimize_params, prepare_multistart, to_f64, CobylaParams};
use crate::parameters::{GpParams, GpValidParams, ThetaTuning};
use crate::utils::{DiffMatrix, NormalizedData};

use linfa::prelude::{DatasetBase, Fit, Float, PredictInplace};
use linfa_linalg::{cholesky::*, qr::*, svd::*, triangular::*};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2, Zip};

use log::{debug, warn};
use ndarray_stats::QuantileExt;
use rayon::prelude::*;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Default number of multistart for hyperparameters optimization
pub const GP_OPTIM_N_START: usize = 10;
/// Minimum of function evaluations for COBYLA optimizer
pub const GP_COBYLA_MIN_EVAL: usize = 25;
/// Maximum of function evaluations for COBYLA optimizer
pub const GP_COBYLA_MAX_EVAL: usize = 1000;
/// Upper limit of the nugget when it is increased to factorize the correlation matrix
pub const GP_MAX_NUGGET: f64 = 1e-6;

/// Internal parameters computed during training
/// used later on in prediction computations
#[derive(Default, Debug, Clone)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub(crate) struct GpInnerParams<F: Float> {
    /// Gaussian process variance
    sigma2: F,
    /// Generalized least-squares regression weights
    beta: Array2<F>,
    /// Gaussian Process weights
    gamma: Array2<F>,
    /// Cholesky decomposition of the correlation matrix \[R\]
    r_chol: Array2<F>,
    /// Solution of the linear equation system : \[R\] x Ft = y
    ft: Array2<F>,
    /// R upper triangle matrix of QR decomposition of the matrix Ft
    ft_qr_r: Array2<F>,
}

/// A GP regression is an interpolation method where the
/// interpolated values are modeled by a Gaussian process with a mean and
/// governed by a prior covariance kernel, which depends on some
/// parameters to be determined.
///
/// The interpolated output is modeled as stochastic process as follows:
///
/// `Y(x) = mu(x) + Z(x)`
///
/// where:
/// * `mu(x)` is the trend, a linear combination of the basis functions of the mean model
/// * `Z(x)` is a centered gaussian process of variance `sigma2` and correlation
///   `corr(x, x')` depending on `theta` hyperparameters
///
/// `theta` is chosen by minimizing the negative log likelihood
/// `n/2 ln(sigma2) + 1/2 ln|R|` where `sigma2` is the generalized least squares
/// estimate of the process variance. The minimization is a COBYLA multistart in log10 space.
///
/// Training inputs and outputs are centered and reduced, `theta` applies to normalized inputs.
///
/// # Example
///
/// ```no_run
/// use egolearn_gp::{correlation_models::*, mean_models::*, GaussianProcess};
/// use linfa::prelude::*;
/// use ndarray::{arr2, Array, Array1, Array2, Axis};
///
/// fn xsinx(x: &Array2<f64>) -> Array1<f64> {
///     ((x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())).remove_axis(Axis(1))
/// }
///
/// let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
/// let yt = xsinx(&xt);
///
/// let kriging = GaussianProcess::<f64, ConstantMean, SquaredExponentialCorr>::params(
///                 ConstantMean::default(),
///                 SquaredExponentialCorr::default())
///                 .fit(&Dataset::new(xt, yt))
///                 .expect("Kriging trained");
///
/// let xtest = Array::linspace(0., 25., 26).insert_axis(Axis(1));
/// let (ypred, yvar) = kriging.predict_valvar(&xtest).expect("Kriging prediction");
///```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, Mean: Serialize, Corr: Serialize",
        deserialize = "F: Deserialize<'de>, Mean: Deserialize<'de>, Corr: Deserialize<'de>"
    ))
)]
pub struct GaussianProcess<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> {
    /// Correlation hyperparameters, inverse of squared length scales for squared exponential
    theta: Array1<F>,
    /// Negative log likelihood at `theta`
    neg_log_likelihood: F,
    /// Diagonal jitter actually used to factorize the correlation matrix
    nugget: F,
    /// Gaussian process internal fitted params
    inner_params: GpInnerParams<F>,
    /// Training inputs
    xt_norm: NormalizedData<F>,
    /// Training outputs
    yt_norm: NormalizedData<F>,
    /// Training dataset (input, output)
    training_data: (Array2<F>, Array1<F>),
    /// Parameters used to fit this model
    params: GpValidParams<F, Mean, Corr>,
}

/// Kriging as GP special case when using constant mean and squared exponential correlation
pub type Kriging<F> = GpParams<F, ConstantMean, SquaredExponentialCorr>;

impl<F: Float> Kriging<F> {
    /// Kriging parameters constructor
    pub fn params() -> GpParams<F, ConstantMean, SquaredExponentialCorr> {
        GpParams::new(ConstantMean(), SquaredExponentialCorr())
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> fmt::Display
    for GaussianProcess<F, Mean, Corr>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(mean={}, corr={}, theta={}, variance={}, nll={})",
            self.params.mean,
            self.params.corr,
            self.theta,
            self.inner_params.sigma2,
            self.neg_log_likelihood,
        )
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>> GaussianProcess<F, Mean, Corr> {
    /// Gp parameters contructor
    pub fn params<NewMean: RegressionModel<F>, NewCorr: CorrelationModel<F>>(
        mean: NewMean,
        corr: NewCorr,
    ) -> GpParams<F, NewMean, NewCorr> {
        GpParams::new(mean, corr)
    }

    /// Predict output values at n given `x` points of nx components specified as a (n, nx) matrix.
    /// Returns n scalar output values as a vector (n,).
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        self.check_dim(x)?;
        let xnorm = self.xt_norm.transform(x);
        let corr = self.compute_correlation(&xnorm);
        Ok(self.mean_from_corr(&xnorm, &corr))
    }

    /// Predict variance values at n given `x` points of nx components specified as a (n, nx) matrix.
    /// Returns n variance values as a vector (n,), never negative.
    pub fn predict_var(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        self.check_dim(x)?;
        let xnorm = self.xt_norm.transform(x);
        let corr = self.compute_correlation(&xnorm);
        self.var_from_corr(&xnorm, &corr)
    }

    /// Predict both output values and variances at n given `x` points
    pub fn predict_valvar(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        self.check_dim(x)?;
        let xnorm = self.xt_norm.transform(x);
        let corr = self.compute_correlation(&xnorm);
        let mean = self.mean_from_corr(&xnorm, &corr);
        let var = self.var_from_corr(&xnorm, &corr)?;
        Ok((mean, var))
    }

    fn check_dim(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<()> {
        if x.ncols() != self.xt_norm.data.ncols() {
            return Err(GpError::InvalidValueError(format!(
                "Expected points of dimension {}, got {}",
                self.xt_norm.data.ncols(),
                x.ncols()
            )));
        }
        Ok(())
    }

    fn mean_from_corr(
        &self,
        xnorm: &ArrayBase<impl Data<Elem = F>, Ix2>,
        corr: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Array1<F> {
        let f = self.params.mean.value(xnorm);
        let y_ = &f.dot(&self.inner_params.beta) + &corr.dot(&self.inner_params.gamma);
        (&y_ * &self.yt_norm.std + &self.yt_norm.mean).remove_axis(Axis(1))
    }

    fn var_from_corr(
        &self,
        xnorm: &ArrayBase<impl Data<Elem = F>, Ix2>,
        corr: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<Array1<F>> {
        let inners = &self.inner_params;
        let rt = inners.r_chol.solve_triangular(&corr.t(), UPLO::Lower)?;
        let rhs = inners.ft.t().dot(&rt) - self.params.mean.value(xnorm).t();
        let u = inners.ft_qr_r.t().solve_triangular(&rhs, UPLO::Lower)?;

        let mse = (rt.mapv(|v| v * v).sum_axis(Axis(0)).mapv(|v| F::one() - v)
            + u.mapv(|v| v * v).sum_axis(Axis(0)))
        .mapv(|v| inners.sigma2 * v);
        // rounding errors may give slightly negative values
        Ok(mse.mapv(|v| if v < F::zero() { F::zero() } else { v }))
    }

    /// Correlations between normalized `x` points and training points as a (n, nt) matrix
    fn compute_correlation(&self, xnorm: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let mut r = Array2::zeros((xnorm.nrows(), self.xt_norm.data.nrows()));
        Zip::from(r.rows_mut())
            .and(xnorm.rows())
            .for_each(|mut r_row, x_row| {
                let d = &x_row - &self.xt_norm.data;
                r_row.assign(&self.params.corr.value(&d, &self.theta).column(0));
            });
        r
    }

    /// Retrieve optimized hyperparameters theta
    pub fn theta(&self) -> &Array1<F> {
        &self.theta
    }

    /// Estimated process variance `sigma2`
    pub fn variance(&self) -> F {
        self.inner_params.sigma2
    }

    /// Negative log likelihood value at the optimized theta (normalized data)
    pub fn neg_log_likelihood(&self) -> F {
        self.neg_log_likelihood
    }

    /// Diagonal jitter used to factorize the correlation matrix
    pub fn nugget(&self) -> F {
        self.nugget
    }

    /// Retrieve input and output dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.xt_norm.data.ncols(), self.yt_norm.data.ncols())
    }

    /// Training data (x, y) used to fit the model
    pub fn training_data(&self) -> &(Array2<F>, Array1<F>) {
        &self.training_data
    }

    /// Parameters used to fit the model
    pub fn params_used(&self) -> &GpValidParams<F, Mean, Corr> {
        &self.params
    }
}

impl<F, D, Mean, Corr> PredictInplace<ArrayBase<D, Ix2>, Array1<F>>
    for GaussianProcess<F, Mean, Corr>
where
    F: Float,
    D: Data<Elem = F>,
    Mean: RegressionModel<F>,
    Corr: CorrelationModel<F>,
{
    /// **Panics** if the dimension of `x` points is not the training one.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.xt_norm.data.ncols(),
            "Points dimension must match the training one."
        );
        let xnorm = self.xt_norm.transform(x);
        let corr = self.compute_correlation(&xnorm);
        *y = self.mean_from_corr(&xnorm, &corr);
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros((x.nrows(),))
    }
}

impl<F: Float, Mean: RegressionModel<F>, Corr: CorrelationModel<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError> for GpValidParams<F, Mean, Corr>
{
    type Object = GaussianProcess<F, Mean, Corr>;

    /// Fit GP parameters using maximum likelihood
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        let y = dataset.targets().to_owned().insert_axis(Axis(1));
        if x.nrows() == 0 {
            return Err(GpError::InvalidValueError(
                "Training set should not be empty".to_string(),
            ));
        }
        if x.nrows() != y.nrows() {
            return Err(GpError::InvalidValueError(format!(
                "Training inputs ({}) and outputs ({}) should have the same number of rows",
                x.nrows(),
                y.nrows()
            )));
        }

        let dim = x.ncols();
        let theta0 = expand_to_dim(self.theta_tuning().init(), dim, "theta init")?;

        let xtrain = NormalizedData::new(x);
        let ytrain = NormalizedData::new(&y);

        let x_distances = DiffMatrix::new(&xtrain.data);
        let sums = x_distances.d.mapv(|v| v.abs()).sum_axis(Axis(1));
        if sums.min().map_or(false, |m| *m == F::zero()) {
            warn!("GP training set contains duplicated points");
        }
        let fx = self.mean().value(&xtrain.data);

        let theta = match self.theta_tuning() {
            ThetaTuning::Fixed(_) => theta0,
            ThetaTuning::Full { bounds, .. } => {
                let bounds = expand_to_dim(bounds, dim, "theta bounds")?.to_vec();
                let objfn = |x: &[f64]| -> f64 {
                    let theta: Array1<F> = x.iter().map(|v| F::cast(10f64.powf(*v))).collect();
                    // optimizer may try non finite values
                    if theta.iter().any(|v| !v.is_finite()) {
                        return f64::INFINITY;
                    }
                    let rxx = self.corr().value(&x_distances.d, &theta);
                    match reduced_likelihood(&fx, rxx, &x_distances, &ytrain, self.nugget()) {
                        Ok((nll, _, _)) => to_f64(nll),
                        Err(_) => f64::INFINITY,
                    }
                };

                let theta0 = Array1::from_iter(
                    theta0
                        .iter()
                        .zip(bounds.iter())
                        .map(|(t, (lo, up))| t.max(*lo).min(*up)),
                );
                let (theta_inits, log_bounds) =
                    prepare_multistart(self.n_start(), &theta0, &bounds);
                debug!("Optimize with multistart theta = {theta_inits} and bounds = {log_bounds:?}");
                let now = Instant::now();
                let maxeval = (10 * theta_inits.ncols()).clamp(GP_COBYLA_MIN_EVAL, self.max_eval());
                let results: Vec<(f64, Array1<f64>)> = (0..theta_inits.nrows())
                    .into_par_iter()
                    .map(|i| {
                        optimize_params(
                            objfn,
                            &theta_inits.row(i).to_owned(),
                            &log_bounds,
                            CobylaParams {
                                maxeval,
                                ..CobylaParams::default()
                            },
                        )
                    })
                    .collect();
                debug!("elapsed optim = {:?}", now.elapsed().as_millis());

                let n_failed = results.iter().filter(|(f, _)| !f.is_finite()).count();
                if n_failed > 0 {
                    warn!(
                        "{n_failed}/{} likelihood optimization starts failed",
                        results.len()
                    );
                }
                let costs: Array1<f64> = results
                    .iter()
                    .map(|(f, _)| if f.is_finite() { *f } else { f64::INFINITY })
                    .collect();
                match costs.argmin() {
                    Ok(best) if costs[best].is_finite() => {
                        results[best].1.mapv(|v| F::cast(10f64.powf(v)))
                    }
                    _ => {
                        return Err(GpError::HyperparametersOptimizationError(format!(
                            "all {} likelihood optimization starts failed",
                            theta_inits.nrows()
                        )))
                    }
                }
            }
        };

        let rxx = self.corr().value(&x_distances.d, &theta);
        let (nll, inner_params, nugget) =
            reduced_likelihood(&fx, rxx, &x_distances, &ytrain, self.nugget())?;
        if !nll.is_finite() {
            return Err(GpError::LikelihoodComputationError(format!(
                "Non finite likelihood at theta = {theta}"
            )));
        }
        Ok(GaussianProcess {
            theta,
            neg_log_likelihood: nll,
            nugget,
            inner_params,
            xt_norm: xtrain,
            yt_norm: ytrain,
            training_data: (x.to_owned(), y.remove_axis(Axis(1))),
            params: self.clone(),
        })
    }
}

/// Broadcast a 1-dim value or check a `dim`-dim one
fn expand_to_dim<T: Clone>(values: &Array1<T>, dim: usize, what: &str) -> Result<Array1<T>> {
    if values.len() == 1 {
        Ok(Array1::from_elem(dim, values[0].clone()))
    } else if values.len() == dim {
        Ok(values.to_owned())
    } else {
        Err(GpError::InvalidValueError(format!(
            "{what} should be either 1-dim or of input dimension {dim}, got {}",
            values.len()
        )))
    }
}

/// Cholesky factorization of `r_mx + nugget * I`, the nugget being
/// multiplied by 10 until the factorization succeeds or [GP_MAX_NUGGET] is exceeded.
/// Returns the lower triangular factor and the nugget used.
pub(crate) fn factorize<F: Float>(r_mx: &Array2<F>, nugget: F) -> Result<(Array2<F>, F)> {
    let max_nugget = F::cast(GP_MAX_NUGGET);
    let mut nugget = nugget;
    loop {
        let mut r = r_mx.to_owned();
        r.diag_mut().mapv_inplace(|v| v + nugget);
        match r.cholesky() {
            Ok(r_chol) => return Ok((r_chol, nugget)),
            Err(err) if nugget >= max_nugget => return Err(err.into()),
            Err(_) => {
                let next = (nugget * F::cast(10.)).max(F::epsilon()).min(max_nugget);
                debug!("Cholesky factorization failed with nugget {nugget}, retry with {next}");
                nugget = next;
            }
        }
    }
}

/// Ratio of the smallest to the largest singular value, NaN when undefined
fn inverse_condition<F: Float>(sv: &Array1<F>) -> F {
    match (sv.min(), sv.max()) {
        (Ok(min), Ok(max)) => *min / *max,
        _ => F::nan(),
    }
}

/// Compute negative log likelihood and internal parameters given
/// fx: mean basis functions at training points,
/// rxx: correlations of the training pairs of `x_distances`,
/// ytrain: normalized output training values,
/// nugget: initial diagonal jitter.
fn reduced_likelihood<F: Float>(
    fx: &ArrayBase<impl Data<Elem = F>, Ix2>,
    rxx: ArrayBase<impl Data<Elem = F>, Ix2>,
    x_distances: &DiffMatrix<F>,
    ytrain: &NormalizedData<F>,
    nugget: F,
) -> Result<(F, GpInnerParams<F>, F)> {
    let mut r_mx: Array2<F> = Array2::eye(x_distances.n_obs);
    for (i, ij) in x_distances.d_indices.outer_iter().enumerate() {
        r_mx[[ij[0], ij[1]]] = rxx[[i, 0]];
        r_mx[[ij[1], ij[0]]] = rxx[[i, 0]];
    }
    let (r_chol, nugget) = factorize(&r_mx, nugget)?;

    // Generalized least squares
    let ft = r_chol.solve_triangular(fx, UPLO::Lower)?;
    let (ft_qr_q, ft_qr_r) = ft.qr()?.into_decomp();

    let (_, sv_qr_r, _) = ft_qr_r.svd(false, false)?;
    if !(inverse_condition(&sv_qr_r) >= F::cast(1e-10)) {
        let (_, sv_f, _) = fx.svd(false, false)?;
        if !(inverse_condition(&sv_f) >= F::cast(1e-15)) {
            return Err(GpError::LikelihoodComputationError(
                "F is too ill conditioned. Poor combination \
                of regression model and observations."
                    .to_string(),
            ));
        }
        return Err(GpError::LikelihoodComputationError(
            "ft is too ill conditioned, try another theta again".to_string(),
        ));
    }
    let yt = r_chol.solve_triangular(&ytrain.data, UPLO::Lower)?;
    let beta = ft_qr_r.solve_triangular_into(ft_qr_q.t().dot(&yt), UPLO::Upper)?;
    let rho = yt - ft.dot(&beta);
    let rho_sqr = rho.mapv(|v| v * v).sum();
    let gamma = r_chol.t().solve_triangular_into(rho, UPLO::Upper)?;

    let n_obs = F::cast(x_distances.n_obs);
    let sigma2 = rho_sqr / n_obs;
    if !sigma2.is_finite() {
        return Err(GpError::LikelihoodComputationError(
            "non finite process variance".to_string(),
        ));
    }
    // constant outputs give a null variance
    let sigma2 = sigma2.max(F::min_positive_value());
    // ln|R| / 2 is the sum of the logs of the cholesky factor diagonal
    let half_logdet = r_chol.diag().mapv(|v| v.ln()).sum();
    let nll = F::cast(0.5) * n_obs * sigma2.ln() + half_logdet;

    Ok((
        nll,
        GpInnerParams {
            sigma2: sigma2 * ytrain.std[0] * ytrain.std[0],
            beta,
            gamma,
            r_chol,
            ft,
            ft_qr_r,
        },
        nugget,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use argmin_testfunctions::rosenbrock_ab as rosenbrock;
    use egolearn_doe::{Lhs, SamplingMethod};
    use linfa::prelude::{Dataset, Predict};
    use ndarray::{array, Array, Zip};
    use ndarray_rand::rand::SeedableRng;
    use paste::paste;
    use rand_xoshiro::Xoshiro256Plus;

    fn training() -> (Array2<f64>, Array1<f64>) {
        (
            array![[0.0], [1.0], [2.0], [3.0], [4.0]],
            array![0.0, 1.0, 1.5, 0.9, 1.0],
        )
    }

    macro_rules! test_gp {
        ($regr:ident, $corr:ident) => {
            paste! {
                #[test]
                fn [<test_gp_ $regr:snake _ $corr:snake>]() {
                    let (xt, yt) = training();
                    let gp = GaussianProcess::<f64, [<$regr Mean>], [<$corr Corr>]>::params(
                        [<$regr Mean>]::default(),
                        [<$corr Corr>]::default(),
                    )
                    .theta_tuning(ThetaTuning::Fixed(array![1.0]))
                    .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
                    .expect("GP fit error");

                    // interpolation of training points
                    let (yvals, yvars) = gp.predict_valvar(&xt).expect("prediction error");
                    assert_abs_diff_eq!(yvals, yt, epsilon = 1e-6);
                    assert_abs_diff_eq!(yvars, Array1::zeros(5), epsilon = 1e-6);

                    // uncertainty between training points
                    let yvar = gp.predict_var(&array![[2.5]]).expect("prediction error");
                    assert!(yvar[0] > 1e-6);
                }
            }
        };
    }

    test_gp!(Constant, SquaredExponential);
    test_gp!(Constant, AbsoluteExponential);
    test_gp!(Constant, Matern32);
    test_gp!(Constant, Matern52);

    test_gp!(Linear, SquaredExponential);
    test_gp!(Linear, AbsoluteExponential);
    test_gp!(Linear, Matern32);
    test_gp!(Linear, Matern52);

    test_gp!(Quadratic, SquaredExponential);
    test_gp!(Quadratic, AbsoluteExponential);
    test_gp!(Quadratic, Matern32);
    test_gp!(Quadratic, Matern52);

    #[test]
    fn test_optimized_theta_improves_likelihood() {
        let (xt, yt) = training();
        let ds = Dataset::new(xt.to_owned(), yt.to_owned());
        let init = Kriging::<f64>::params()
            .theta_tuning(ThetaTuning::Fixed(array![ThetaTuning::<f64>::DEFAULT_INIT]))
            .fit(&ds)
            .expect("GP fit error");
        let gp = Kriging::<f64>::params().fit(&ds).expect("GP fit error");

        let (lo, up) = ThetaTuning::<f64>::DEFAULT_BOUNDS;
        assert!(gp.theta()[0] >= lo * (1. - 1e-6) && gp.theta()[0] <= up * (1. + 1e-6));
        assert!(gp.neg_log_likelihood() <= init.neg_log_likelihood() + 1e-8);
        assert!(gp.variance() > 0.);

        let yvals = gp.predict(&xt).expect("prediction error");
        assert_abs_diff_eq!(yvals, yt, epsilon = 1e-3);
    }

    #[test]
    fn test_variance_grows_far_from_data() {
        let (xt, yt) = training();
        for theta in [0.1, 1., 10.] {
            let gp = Kriging::<f64>::params()
                .theta_tuning(ThetaTuning::Fixed(array![theta]))
                .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
                .expect("GP fit error");
            let xfar = Array::linspace(4., 14., 41).insert_axis(Axis(1));
            let vars = gp.predict_var(&xfar).expect("prediction error");
            for w in vars.windows(2) {
                assert!(w[1] >= w[0] - 1e-12, "theta={theta}: {} < {}", w[1], w[0]);
            }
        }
    }

    #[test]
    fn test_all_starts_failure() {
        let xt = array![[0.], [1.], [2.]];
        let yt = array![0., f64::NAN, 1.];
        let res = Kriging::<f64>::params().fit(&Dataset::new(xt, yt));
        assert!(matches!(
            res,
            Err(GpError::HyperparametersOptimizationError(_))
        ));
    }

    #[test]
    fn test_duplicated_points() {
        let xt = array![[0.], [1.], [1.], [2.], [3.]];
        let yt = array![0., 1., 1., 4., 9.];
        let gp = Kriging::<f64>::params()
            .theta_tuning(ThetaTuning::Fixed(array![1.]))
            .fit(&Dataset::new(xt, yt))
            .expect("GP fit with duplicates");
        assert!(gp.nugget() >= 100. * f64::EPSILON);
        let y = gp.predict(&array![[1.]]).expect("prediction error");
        assert_abs_diff_eq!(y[0], 1., epsilon = 1e-2);
    }

    #[test]
    fn test_factorize_increases_nugget() {
        let ones = Array2::<f64>::ones((3, 3));
        let (_, nugget) = factorize(&ones, 1e-20).expect("factorization");
        assert!(nugget > 1e-20 && nugget <= GP_MAX_NUGGET);

        let neg = -Array2::<f64>::eye(2);
        assert!(matches!(
            factorize(&neg, 1e-10),
            Err(GpError::LinalgError(_))
        ));
    }

    #[test]
    fn test_single_point() {
        let gp = Kriging::<f64>::params()
            .fit(&Dataset::new(array![[0.5, 0.5]], array![2.]))
            .expect("GP fit error");
        assert_eq!(gp.dims(), (2, 1));
        let y = gp.predict(&array![[0.5, 0.5], [0.9, 0.1]]).unwrap();
        assert_abs_diff_eq!(y, array![2., 2.], epsilon = 1e-6);
    }

    #[test]
    fn test_bad_dimension() {
        let (xt, yt) = training();
        let gp = Kriging::<f64>::params()
            .fit(&Dataset::new(xt, yt))
            .expect("GP fit error");
        assert!(matches!(
            gp.predict(&array![[1., 2.]]),
            Err(GpError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_linfa_predict() {
        let (xt, yt) = training();
        let gp = Kriging::<f64>::params()
            .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
            .expect("GP fit error");
        let ypred: Array1<f64> = gp.predict(&xt).unwrap();
        let ylinfa: Array1<f64> = Predict::predict(&gp, &xt);
        assert_abs_diff_eq!(ypred, ylinfa, epsilon = 1e-12);
    }

    fn rosenb(x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array1<f64> {
        let mut y: Array1<f64> = Array1::zeros(x.nrows());
        Zip::from(&mut y)
            .and(x.rows())
            .par_for_each(|yi, xi| *yi = rosenbrock(&xi.to_vec(), 1., 100.));
        y
    }

    #[test]
    fn test_rosenbrock_2d() {
        let xlimits = array![[-2., 2.], [-1., 3.]];
        let xt = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(40);
        let yt = rosenb(&xt);
        let gp = GaussianProcess::<f64, ConstantMean, Matern52Corr>::params(
            ConstantMean(),
            Matern52Corr(),
        )
        .fit(&Dataset::new(xt.to_owned(), yt.to_owned()))
        .expect("GP fit error");
        assert_eq!(gp.theta().len(), 2);

        let xv = Lhs::new(&xlimits)
            .with_rng(Xoshiro256Plus::seed_from_u64(0))
            .sample(100);
        let yv = rosenb(&xv);
        let ytest = gp.predict(&xv).unwrap();
        let err = (&ytest - &yv).mapv(|v| v * v).sum().sqrt() / yv.mapv(|v| v * v).sum().sqrt();
        assert!(err < 0.05, "relative error {err}");
    }
}
