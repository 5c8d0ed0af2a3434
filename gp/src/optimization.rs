use egolearn_doe::{Lhs, LhsKind, SamplingMethod};
use linfa::Float;
use ndarray::{s, Array1, Array2, Zip};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

pub(crate) struct CobylaParams {
    pub rhobeg: f64,
    pub ftol_rel: f64,
    pub maxeval: usize,
}

impl Default for CobylaParams {
    fn default() -> Self {
        CobylaParams {
            rhobeg: 0.5,
            ftol_rel: 1e-4,
            maxeval: 200,
        }
    }
}

/// Starting points of the likelihood optimization in log10(theta) space:
/// the initial guess followed by `n_start` points spread over the bounds.
/// Returns the starts and the bounds in log10 space.
pub(crate) fn prepare_multistart<F: Float>(
    n_start: usize,
    theta0: &Array1<F>,
    bounds: &[(F, F)],
) -> (Array2<F>, Vec<(F, F)>) {
    let bounds: Vec<(F, F)> = bounds
        .iter()
        .map(|(lo, up)| (lo.log10(), up.log10()))
        .collect();

    let mut theta0s = Array2::zeros((n_start + 1, theta0.len()));
    theta0s.row_mut(0).assign(&theta0.mapv(|v| v.log10()));

    if n_start == 1 {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let vals: Array1<F> = bounds
            .iter()
            .map(|(lo, up)| if lo < up { rng.gen_range(*lo..*up) } else { *lo })
            .collect();
        theta0s.row_mut(1).assign(&vals);
    } else if n_start > 1 {
        let mut xlimits: Array2<F> = Array2::zeros((bounds.len(), 2));
        Zip::from(xlimits.rows_mut())
            .and(&bounds)
            .for_each(|mut row, (lo, up)| {
                row[0] = *lo;
                row[1] = *up;
            });
        // fixed seed: starts only need to be spread over the search space
        let seeds = Lhs::new(&xlimits)
            .kind(LhsKind::Maximin)
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample(n_start);
        theta0s.slice_mut(s![1.., ..]).assign(&seeds);
    }
    (theta0s, bounds)
}

/// Minimize `objfn` with COBYLA starting from `param0` within `bounds`.
///
/// Returns `(f64::INFINITY, _)` when no finite objective value is reached.
pub(crate) fn optimize_params<ObjF, F>(
    objfn: ObjF,
    param0: &Array1<F>,
    bounds: &[(F, F)],
    cobyla: CobylaParams,
) -> (f64, Array1<f64>)
where
    ObjF: Fn(&[f64]) -> f64,
    F: Float,
{
    use cobyla::{minimize, Func, RhoBeg, StopTols};

    let cons: Vec<&dyn Func<()>> = vec![];
    let param0: Vec<f64> = param0.iter().map(|v| to_f64(*v)).collect();
    let bounds: Vec<(f64, f64)> = bounds
        .iter()
        .map(|(lo, up)| (to_f64(*lo), to_f64(*up)))
        .collect();

    let res = minimize(
        |x: &[f64], _u: &mut ()| objfn(x),
        &param0,
        &bounds,
        &cons,
        (),
        cobyla.maxeval,
        RhoBeg::All(cobyla.rhobeg),
        Some(StopTols {
            ftol_rel: cobyla.ftol_rel,
            ..StopTols::default()
        }),
    );
    let (x_opt, fval) = match res {
        Ok((_, x_opt, fval)) => (x_opt, fval),
        Err((status, x_opt, fval)) => {
            log::debug!("Cobyla stopped in GP likelihood optimization: {status:?}");
            (x_opt, fval)
        }
    };
    let fval = if fval.is_finite() { fval } else { f64::INFINITY };
    (fval, Array1::from_vec(x_opt))
}

#[inline]
pub(crate) fn to_f64<F: Float>(v: F) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_prepare_multistart() {
        let (starts, bounds) = prepare_multistart(5, &array![0.1, 1.], &[(1e-4, 1e2), (1e-2, 1e1)]);
        assert_eq!(starts.dim(), (6, 2));
        assert_abs_diff_eq!(starts.row(0), array![-1., 0.], epsilon = 1e-12);
        assert_abs_diff_eq!(bounds[0].0, -4., epsilon = 1e-12);
        assert_abs_diff_eq!(bounds[1].1, 1., epsilon = 1e-12);
        for row in starts.rows() {
            assert!((-4. ..=2.).contains(&row[0]));
            assert!((-2. ..=1.).contains(&row[1]));
        }
    }

    #[test]
    fn test_optimize_params() {
        let objfn = |x: &[f64]| (x[0] - 0.5).powi(2) + (x[1] + 1.).powi(2);
        let (fmin, xopt) = optimize_params(
            objfn,
            &array![0., 0.],
            &[(-2., 2.), (-2., 2.)],
            CobylaParams::default(),
        );
        assert_abs_diff_eq!(fmin, 0., epsilon = 1e-4);
        assert_abs_diff_eq!(xopt, array![0.5, -1.], epsilon = 1e-2);
    }
}
