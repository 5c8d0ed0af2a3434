use linfa::Float;
use ndarray::{Array1, ArrayBase, Data, Ix2};
use ndarray_stats::DeviationExt;
use rayon::prelude::*;

/// Pairwise euclidean distances between the rows of `x`, condensed as
/// `(n * (n - 1) / 2,)` in row-major upper triangle order.
pub fn pdist<F: Float>(x: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>) -> Array1<F> {
    let n = x.nrows();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();
    let distances: Vec<F> = pairs
        .par_iter()
        .map(|&(i, j)| F::cast(x.row(i).l2_dist(&x.row(j)).unwrap_or(0.)))
        .collect();
    Array1::from_vec(distances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_pdist() {
        let x = array![[0., 0.], [3., 4.], [0., 1.]];
        assert_abs_diff_eq!(pdist(&x), array![5., 1., 18f64.sqrt()], epsilon = 1e-12);
    }
}
