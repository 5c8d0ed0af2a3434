use linfa::Float;
use ndarray::{s, Array1, Array2, ArrayBase, Axis, Data, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A (n, nx) matrix stored centered and reduced, with the statistics used.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub(crate) struct NormalizedData<F: Float> {
    /// normalized data
    pub data: Array2<F>,
    /// mean vector computed from data
    pub mean: Array1<F>,
    /// standard deviation vector computed from data
    pub std: Array1<F>,
}

impl<F: Float> NormalizedData<F> {
    pub fn new(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> NormalizedData<F> {
        let (data, mean, std) = normalize(x);
        NormalizedData { data, mean, std }
    }

    /// Apply stored normalization to other points
    pub fn transform(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        (x - &self.mean) / &self.std
    }
}

/// Center and reduce columns of `x`. A zero or undefined deviation
/// (constant column, single row) is replaced by one.
pub(crate) fn normalize<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> (Array2<F>, Array1<F>, Array1<F>) {
    let x_mean = x
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(x.ncols()));
    let x_std = if x.nrows() < 2 {
        Array1::ones(x.ncols())
    } else {
        x.std_axis(Axis(0), F::one())
            .mapv(|v| if v == F::zero() { F::one() } else { v })
    };
    let xnorm = (x - &x_mean) / &x_std;
    (xnorm, x_mean, x_std)
}

/// Absolute componentwise differences between all pairs of rows of a training set,
/// used to build the correlation matrix.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub(crate) struct DiffMatrix<F: Float> {
    /// Differences as a (n_obs * (n_obs - 1) / 2, nx) array
    pub d: Array2<F>,
    /// Row indices (i, j), i < j, of each difference
    pub d_indices: Array2<usize>,
    /// Number of observations
    pub n_obs: usize,
}

impl<F: Float> DiffMatrix<F> {
    /// Compute differences given points as an array (n_obs, nx)
    pub fn new(x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> DiffMatrix<F> {
        let n_obs = x.nrows();
        let n_pairs = n_obs * n_obs.saturating_sub(1) / 2;
        let mut d = Array2::zeros((n_pairs, x.ncols()));
        let mut d_indices = Array2::<usize>::zeros((n_pairs, 2));
        let mut start = 0;
        for k in 0..n_obs.saturating_sub(1) {
            let end = start + n_obs - k - 1;
            let diff = &x.slice(s![k..k + 1, ..]) - &x.slice(s![k + 1.., ..]);
            d.slice_mut(s![start..end, ..]).assign(&diff.mapv(|v| v.abs()));
            for (r, i) in (start..end).zip(k + 1..n_obs) {
                d_indices[[r, 0]] = k;
                d_indices[[r, 1]] = i;
            }
            start = end;
        }
        DiffMatrix {
            d,
            d_indices,
            n_obs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_normalize() {
        let x = array![[1., 2.], [3., 2.], [5., 2.]];
        let (xnorm, mean, std) = normalize(&x);
        assert_abs_diff_eq!(mean, array![3., 2.]);
        // constant column keeps a unit deviation
        assert_abs_diff_eq!(std, array![2., 1.]);
        assert_abs_diff_eq!(xnorm, array![[-1., 0.], [0., 0.], [1., 0.]]);
    }

    #[test]
    fn test_normalize_single_row() {
        let (xnorm, _, std) = normalize(&array![[4., -1.]]);
        assert_abs_diff_eq!(std, array![1., 1.]);
        assert_abs_diff_eq!(xnorm, array![[0., 0.]]);
    }

    #[test]
    fn test_diff_matrix() {
        let x = array![[0., 1.], [2., -1.], [5., 1.]];
        let dm = DiffMatrix::new(&x);
        assert_eq!(dm.n_obs, 3);
        assert_abs_diff_eq!(dm.d, array![[2., 2.], [5., 0.], [3., 2.]]);
        assert_eq!(dm.d_indices, array![[0, 1], [0, 2], [1, 2]]);
    }
}
