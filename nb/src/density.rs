use crate::parameters::DensityKind;
use linfa::Float;
use ndarray::{Array1, ArrayBase, Axis, Data, Ix1, Ix2, Zip};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Fitted conditional distribution of the features of one class.
///
/// Whatever the family, the model only relies on [ClassDensity::log_density].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub enum ClassDensity<F: Float> {
    /// Independent normal distributions
    Gaussian {
        /// feature means
        mean: Array1<F>,
        /// smoothed feature variances
        var: Array1<F>,
    },
    /// Multinomial distribution over feature counts
    Multinomial {
        /// log probability of each feature
        feature_log_prob: Array1<F>,
    },
    /// Independent Bernoulli distributions
    Bernoulli {
        /// log probability of each feature being 1
        feature_log_prob: Array1<F>,
        /// log probability of each feature being 0
        neg_feature_log_prob: Array1<F>,
        /// values greater than the threshold are taken as 1
        binarize: Option<F>,
    },
}

impl<F: Float> ClassDensity<F> {
    /// Number of features
    pub fn n_features(&self) -> usize {
        match self {
            ClassDensity::Gaussian { mean, .. } => mean.len(),
            ClassDensity::Multinomial { feature_log_prob } => feature_log_prob.len(),
            ClassDensity::Bernoulli {
                feature_log_prob, ..
            } => feature_log_prob.len(),
        }
    }

    /// Log density (or log mass) of each feature of `x`
    pub fn feature_log_densities(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        match self {
            ClassDensity::Gaussian { mean, var } => {
                let two_pi = F::cast(2. * std::f64::consts::PI);
                let half = F::cast(0.5);
                let mut res = Array1::zeros(x.len());
                Zip::from(&mut res)
                    .and(x)
                    .and(mean)
                    .and(var)
                    .for_each(|r, &xi, &m, &v| {
                        *r = -half * (two_pi * v).ln() - (xi - m) * (xi - m) / (F::cast(2.) * v)
                    });
                res
            }
            ClassDensity::Multinomial { feature_log_prob } => x * feature_log_prob,
            ClassDensity::Bernoulli {
                feature_log_prob,
                neg_feature_log_prob,
                binarize,
            } => {
                let xb = binarized(x, *binarize);
                &xb * feature_log_prob + (xb.mapv(|v| F::one() - v)) * neg_feature_log_prob
            }
        }
    }

    /// Log of `p(x | c)` under the naive independence assumption
    pub fn log_density(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> F {
        self.feature_log_densities(x).sum()
    }
}

fn binarized<F: Float>(x: &ArrayBase<impl Data<Elem = F>, Ix1>, threshold: Option<F>) -> Array1<F> {
    match threshold {
        Some(t) => x.mapv(|v| if v > t { F::one() } else { F::zero() }),
        None => x.to_owned(),
    }
}

/// Sufficient statistics of the samples of one class
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub(crate) enum ClassStats<F: Float> {
    Moments {
        count: F,
        mean: Array1<F>,
        /// biased variance
        var: Array1<F>,
    },
    Counts {
        count: F,
        feature_count: Array1<F>,
    },
}

impl<F: Float> ClassStats<F> {
    /// Statistics of a non empty set of samples
    pub fn from_samples(
        kind: DensityKind,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        binarize: Option<F>,
    ) -> Self {
        let count = F::cast(x.nrows());
        match kind {
            DensityKind::Gaussian => {
                let mean = x.sum_axis(Axis(0)) / count;
                let var = (x - &mean).mapv(|v| v * v).sum_axis(Axis(0)) / count;
                ClassStats::Moments { count, mean, var }
            }
            DensityKind::Multinomial => ClassStats::Counts {
                count,
                feature_count: x.sum_axis(Axis(0)),
            },
            DensityKind::Bernoulli => {
                let mut feature_count = Array1::zeros(x.ncols());
                x.rows()
                    .into_iter()
                    .for_each(|row| feature_count += &binarized(&row, binarize));
                ClassStats::Counts {
                    count,
                    feature_count,
                }
            }
        }
    }

    pub fn count(&self) -> F {
        match self {
            ClassStats::Moments { count, .. } => *count,
            ClassStats::Counts { count, .. } => *count,
        }
    }

    /// Statistics of the union of both sample sets
    /// (pairwise update of Chan et al. for the moments).
    pub fn merge(&self, other: &ClassStats<F>) -> ClassStats<F> {
        match (self, other) {
            (
                ClassStats::Moments {
                    count: na,
                    mean: ma,
                    var: va,
                },
                ClassStats::Moments {
                    count: nb,
                    mean: mb,
                    var: vb,
                },
            ) => {
                let n = *na + *nb;
                let delta = mb - ma;
                let mean = ma + &(&delta * (*nb / n));
                let m2 = va * *na + vb * *nb + delta.mapv(|d| d * d) * (*na * *nb / n);
                ClassStats::Moments {
                    count: n,
                    mean,
                    var: m2 / n,
                }
            }
            (
                ClassStats::Counts {
                    count: na,
                    feature_count: fa,
                },
                ClassStats::Counts {
                    count: nb,
                    feature_count: fb,
                },
            ) => ClassStats::Counts {
                count: *na + *nb,
                feature_count: fa + fb,
            },
            // statistics of a model always come from the same density family
            _ => self.clone(),
        }
    }

    /// Smoothed density of the class
    pub fn to_density(
        &self,
        kind: DensityKind,
        alpha: F,
        epsilon: F,
        binarize: Option<F>,
    ) -> ClassDensity<F> {
        match self {
            ClassStats::Moments { mean, var, .. } => ClassDensity::Gaussian {
                mean: mean.to_owned(),
                var: var.mapv(|v| (v + epsilon).max(F::min_positive_value())),
            },
            ClassStats::Counts {
                count,
                feature_count,
            } => {
                if kind == DensityKind::Bernoulli {
                    let denom = (*count + F::cast(2.) * alpha).ln();
                    ClassDensity::Bernoulli {
                        feature_log_prob: feature_count.mapv(|c| (c + alpha).ln() - denom),
                        neg_feature_log_prob: feature_count
                            .mapv(|c| (*count - c + alpha).ln() - denom),
                        binarize,
                    }
                } else {
                    let smoothed = feature_count.mapv(|c| c + alpha);
                    let denom = smoothed.sum().ln();
                    ClassDensity::Multinomial {
                        feature_log_prob: smoothed.mapv(|c| c.ln() - denom),
                    }
                }
            }
        }
    }
}
