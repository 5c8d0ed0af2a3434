//! Correlation models of the GP error term.
//!
//! All models are anisotropic, with one `theta` per input component:
//! * squared exponential: `exp(-sum theta_j d_j^2)`, `theta = 1 / l^2`
//! * absolute exponential: `exp(-sum theta_j |d_j|)`
//! * matern 3/2
//! * matern 5/2

use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2, Zip};
use paste::paste;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trait for using a correlation model in GP regression
pub trait CorrelationModel<F: Float>: Clone + Copy + Default + fmt::Display + Sync + Send {
    /// Correlation values `r(x, x')` as a (n, 1) column given
    /// `d`: (n, nx) componentwise differences between x and x',
    /// `theta`: (nx,) hyperparameters.
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array2<F>;
}

/// Squared exponential correlation model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SquaredExponentialCorr();

impl<F: Float> CorrelationModel<F> for SquaredExponentialCorr {
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array2<F> {
        let r = d.mapv(|v| v * v).dot(theta).mapv(|v| F::exp(-v));
        as_column(r)
    }
}

/// Absolute exponential correlation model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct AbsoluteExponentialCorr();

impl<F: Float> CorrelationModel<F> for AbsoluteExponentialCorr {
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array2<F> {
        let r = d.mapv(|v| v.abs()).dot(theta).mapv(|v| F::exp(-v));
        as_column(r)
    }
}

/// Matern 3/2 correlation model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Matern32Corr();

impl<F: Float> CorrelationModel<F> for Matern32Corr {
    ///  prod (1 + sqrt(3) theta_j |d_j|) exp(- sum sqrt(3) theta_j |d_j|)
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array2<F> {
        let a = scaled_abs(d, theta, F::cast(3.).sqrt());
        let poly = a
            .mapv(|v| F::one() + v)
            .map_axis(Axis(1), |row| row.product());
        as_column(poly * a.sum_axis(Axis(1)).mapv(|v| F::exp(-v)))
    }
}

/// Matern 5/2 correlation model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Matern52Corr();

impl<F: Float> CorrelationModel<F> for Matern52Corr {
    ///  prod (1 + sqrt(5) theta_j |d_j| + 5/3 theta_j^2 d_j^2) exp(- sum sqrt(5) theta_j |d_j|)
    fn value(
        &self,
        d: &ArrayBase<impl Data<Elem = F>, Ix2>,
        theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array2<F> {
        let a = scaled_abs(d, theta, F::cast(5.).sqrt());
        let third = F::cast(1. / 3.);
        let poly = a
            .mapv(|v| F::one() + v + v * v * third)
            .map_axis(Axis(1), |row| row.product());
        as_column(poly * a.sum_axis(Axis(1)).mapv(|v| F::exp(-v)))
    }
}

/// `factor * theta_j * |d_ij|`
fn scaled_abs<F: Float>(
    d: &ArrayBase<impl Data<Elem = F>, Ix2>,
    theta: &ArrayBase<impl Data<Elem = F>, Ix1>,
    factor: F,
) -> Array2<F> {
    let mut a = d.mapv(|v| v.abs() * factor);
    Zip::from(a.columns_mut())
        .and(theta)
        .for_each(|mut col, &t| col.mapv_inplace(|v| v * t));
    a
}

fn as_column<F: Float>(r: Array1<F>) -> Array2<F> {
    r.insert_axis(Axis(1))
}

macro_rules! impl_corr_display {
    ($corr:ident) => {
        paste! {
            impl fmt::Display for [<$corr Corr>] {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, "{}", stringify!($corr))
                }
            }
        }
    };
}

impl_corr_display!(SquaredExponential);
impl_corr_display!(AbsoluteExponential);
impl_corr_display!(Matern32);
impl_corr_display!(Matern52);
