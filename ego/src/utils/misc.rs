use libm::erfc;
use ndarray::{concatenate, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_stats::DeviationExt;

const SQRT_2PI: f64 = 2.5066282746310007;

/// Cumulative distribution function of Standard Normal at x
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Probability density function of Standard Normal at x
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / SQRT_2PI
}

/// Whether `x_new` is far enough (L1 distance) from every point of `x_data`
pub fn is_update_ok(
    x_data: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    x_new: &ArrayBase<impl Data<Elem = f64>, Ix1>,
) -> bool {
    let x_new = x_new.view();
    x_data
        .rows()
        .into_iter()
        .all(|row| row.l1_dist(&x_new).map_or(false, |d| d >= 100. * f64::EPSILON))
}

/// Appends the rows of `x_new` (resp. `y_new`) to `x_data` (resp. `y_data`),
/// skipping points too close to the existing (or just appended) ones.
/// Returns the row indices of `x_new` actually appended.
pub fn update_data(
    x_data: &mut Array2<f64>,
    y_data: &mut Array2<f64>,
    x_new: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    y_new: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> Vec<usize> {
    let kept: Vec<usize> = (0..x_new.nrows())
        .filter(|&i| {
            let x = x_new.row(i);
            let ok = is_update_ok(x_data, &x);
            if ok {
                *x_data = concatenate![Axis(0), x_data.view(), x.insert_axis(Axis(0))];
            }
            ok
        })
        .collect();
    if !kept.is_empty() {
        let y_kept = y_new.select(Axis(0), &kept);
        *y_data = concatenate![Axis(0), y_data.view(), y_kept.view()];
    }
    kept
}
