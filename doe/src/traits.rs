use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2};

/// A sampling method generates `ns` points within a box-shaped sample space
/// `[lower_1, upper_1] x ... x [lower_nx, upper_nx]`.
pub trait SamplingMethod<F: Float> {
    /// Bounds of the sample space as a (nx, 2) matrix
    fn sampling_space(&self) -> &Array2<F>;

    /// Generates a (ns, nx) array of samples in the unit hypercube `[0, 1]^nx`
    fn normalized_sample(&self, ns: usize) -> Array2<F>;

    /// Generates a (ns, nx) array of samples scaled to the sample space.
    fn sample(&self, ns: usize) -> Array2<F> {
        let xlimits = self.sampling_space();
        let lower = xlimits.column(0);
        let scaler = &xlimits.column(1) - &lower;
        self.normalized_sample(ns) * scaler + lower
    }
}

/// Panics when `xlimits` is not a (nx, 2) matrix of ordered bounds.
pub(crate) fn check_xlimits<F: Float>(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) {
    if xlimits.ncols() != 2 {
        panic!("xlimits must have 2 columns (lower, upper)");
    }
    if xlimits.rows().into_iter().any(|row| row[0] > row[1]) {
        panic!("xlimits lower bounds must be less or equal than upper bounds");
    }
}
