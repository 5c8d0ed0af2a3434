use crate::traits::check_xlimits;
use crate::SamplingMethod;
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2};

/// Regular grid over the sample space.
///
/// Asking for `ns` samples yields a grid with `levels = ceil(ns^(1/nx))`
/// points per dimension, hence `levels^nx` samples which may exceed `ns`.
/// Levels are the centers of `levels` equal intervals of each dimension.
pub struct FullFactorial<F: Float> {
    /// Sampling space as a (nx, 2) matrix
    xlimits: Array2<F>,
}

impl<F: Float> FullFactorial<F> {
    /// Constructor given a design space as a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// **Panics** if `xlimits` is not a (nx, 2) matrix with ordered bounds.
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        check_xlimits(xlimits);
        FullFactorial {
            xlimits: xlimits.to_owned(),
        }
    }

    fn levels(&self, ns: usize) -> usize {
        let nx = self.xlimits.nrows().max(1);
        let mut levels = (ns as f64).powf(1. / nx as f64).round() as usize;
        // integer ceil of ns^(1/nx)
        while levels.pow(nx as u32) < ns {
            levels += 1;
        }
        while levels > 1 && (levels - 1).pow(nx as u32) >= ns {
            levels -= 1;
        }
        levels
    }
}

impl<F: Float> SamplingMethod<F> for FullFactorial<F> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let nx = self.xlimits.nrows();
        if ns == 0 {
            return Array2::zeros((0, nx));
        }
        let levels = self.levels(ns);
        let n = levels.pow(nx as u32);
        Array2::from_shape_fn((n, nx), |(i, j)| {
            // jth digit of i in base `levels`, last dimension varies fastest
            let k = (i / levels.pow((nx - 1 - j) as u32)) % levels;
            F::cast((k as f64 + 0.5) / levels as f64)
        })
    }
}
