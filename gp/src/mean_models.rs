//! Trend models of the GP, fitted by generalized least squares.
//!
//! * constant: ordinary kriging, the default
//! * linear
//! * quadratic
//!
//! A model maps `(n, nx)` points to the `(n, p)` matrix of its basis functions.

use linfa::Float;
use ndarray::{concatenate, s, Array2, ArrayBase, Axis, Data, Ix2};
use paste::paste;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trait for mean models used in GP regression
pub trait RegressionModel<F: Float>: Clone + Copy + Default + fmt::Display + Sync + Send {
    /// Basis functions evaluated at the given `x` points as a (n, p) matrix
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F>;
}

/// A constant function as mean of the GP
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct ConstantMean();

impl<F: Float> RegressionModel<F> for ConstantMean {
    /// regr(x) = 1
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        Array2::<F>::ones((x.nrows(), 1))
    }
}

/// An affine function as mean of the GP
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct LinearMean();

impl<F: Float> RegressionModel<F> for LinearMean {
    /// regr(x) = [1, x_1, ..., x_nx]
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        concatenate![Axis(1), Array2::ones((x.nrows(), 1)), x.to_owned()]
    }
}

/// A 2-degree polynomial as mean of the GP
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct QuadraticMean();

impl<F: Float> RegressionModel<F> for QuadraticMean {
    /// regr(x) = [1, x_1, ..., x_nx, { x_i * x_j, j >= i }]
    fn value(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let mut res = concatenate![Axis(1), Array2::ones((x.nrows(), 1)), x.to_owned()];
        for k in 0..x.ncols() {
            let cross = x.slice(s![.., k..]).to_owned() * x.slice(s![.., k..k + 1]);
            res = concatenate![Axis(1), res, cross];
        }
        res
    }
}

macro_rules! impl_mean_display {
    ($regr:ident) => {
        paste! {
            impl fmt::Display for [<$regr Mean>] {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, "{}", stringify!($regr))
                }
            }
        }
    };
}

impl_mean_display!(Constant);
impl_mean_display!(Linear);
impl_mean_display!(Quadratic);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_linear() {
        let x = array![[1., 2.], [3., 4.]];
        let actual = LinearMean().value(&x);
        assert_abs_diff_eq!(actual, array![[1., 1., 2.], [1., 3., 4.]]);
    }

    #[test]
    fn test_quadratic() {
        let x = array![[2., 3.], [0., 1.]];
        let actual = QuadraticMean().value(&x);
        // 1, x1, x2, x1^2, x1*x2, x2^2
        let expected = array![[1., 2., 3., 4., 6., 9.], [1., 0., 1., 0., 0., 1.]];
        assert_abs_diff_eq!(actual, expected);
    }

    #[test]
    fn test_display() {
        assert_eq!("Constant", ConstantMean().to_string());
        assert_eq!("Quadratic", QuadraticMean().to_string());
    }
}
