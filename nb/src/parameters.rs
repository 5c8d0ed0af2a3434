use crate::errors::{NbError, Result};
use linfa::{Float, ParamGuard};
use ndarray::Array1;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Family of the per-feature conditional distribution `p(x_i | c)`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum DensityKind {
    /// Continuous features, one normal distribution per feature
    #[default]
    Gaussian,
    /// Count features (e.g. word occurrences)
    Multinomial,
    /// Binary features, values greater than the binarize threshold count as 1
    Bernoulli,
}

/// A set of validated naive Bayes parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub struct NbValidParams<F: Float> {
    pub(crate) density: DensityKind,
    pub(crate) alpha: F,
    pub(crate) var_smoothing: F,
    pub(crate) priors: Option<Array1<F>>,
    pub(crate) classes: Option<Vec<usize>>,
    pub(crate) binarize: Option<F>,
}

impl<F: Float> Default for NbValidParams<F> {
    fn default() -> Self {
        NbValidParams {
            density: DensityKind::default(),
            alpha: F::one(),
            var_smoothing: F::cast(1e-9),
            priors: None,
            classes: None,
            binarize: Some(F::zero()),
        }
    }
}

impl<F: Float> NbValidParams<F> {
    /// Get the density family
    pub fn density(&self) -> DensityKind {
        self.density
    }

    /// Get the additive smoothing of discrete models
    pub fn alpha(&self) -> F {
        self.alpha
    }

    /// Get the variance smoothing of the gaussian model
    pub fn var_smoothing(&self) -> F {
        self.var_smoothing
    }

    /// Get the user priors, `None` when priors are the class frequencies
    pub fn priors(&self) -> Option<&Array1<F>> {
        self.priors.as_ref()
    }

    /// Get the declared class labels
    pub fn classes(&self) -> Option<&[usize]> {
        self.classes.as_deref()
    }

    /// Get the binarize threshold of the Bernoulli model
    pub fn binarize(&self) -> Option<F> {
        self.binarize
    }
}

/// The set of hyperparameters that can be specified for the execution of
/// the [naive Bayes algorithm](crate::NaiveBayes).
#[derive(Clone, Debug, PartialEq)]
pub struct NbParams<F: Float>(NbValidParams<F>);

impl<F: Float> Default for NbParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> NbParams<F> {
    /// Default parameters: gaussian densities, empirical priors
    pub fn new() -> Self {
        NbParams(NbValidParams::default())
    }

    /// Set the density family
    pub fn density(mut self, density: DensityKind) -> Self {
        self.0.density = density;
        self
    }

    /// Set the additive (Laplace) smoothing of discrete models, must be positive.
    pub fn alpha(mut self, alpha: F) -> Self {
        self.0.alpha = alpha;
        self
    }

    /// Set the portion of the largest feature variance added to all variances
    /// of the gaussian model.
    pub fn var_smoothing(mut self, var_smoothing: F) -> Self {
        self.0.var_smoothing = var_smoothing;
        self
    }

    /// Set class priors given in the sorted order of the class labels
    pub fn priors(mut self, priors: Array1<F>) -> Self {
        self.0.priors = Some(priors);
        self
    }

    /// Declare the set of class labels.
    ///
    /// Training then fails if a declared class has no sample or if a label is not declared.
    pub fn classes(mut self, classes: Vec<usize>) -> Self {
        self.0.classes = Some(classes);
        self
    }

    /// Set the threshold of the Bernoulli model, `None` when features are already binary
    pub fn binarize(mut self, binarize: Option<F>) -> Self {
        self.0.binarize = binarize;
        self
    }
}

impl<F: Float> ParamGuard for NbParams<F> {
    type Checked = NbValidParams<F>;
    type Error = NbError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let params = &self.0;
        if !(params.alpha > F::zero() && params.alpha.is_finite()) {
            return Err(NbError::InvalidParams(format!(
                "`alpha` should be strictly positive, got {}",
                params.alpha
            )));
        }
        if !(params.var_smoothing >= F::zero() && params.var_smoothing.is_finite()) {
            return Err(NbError::InvalidParams(format!(
                "`var_smoothing` should be positive, got {}",
                params.var_smoothing
            )));
        }
        if let Some(priors) = &params.priors {
            if priors.iter().any(|p| !(*p > F::zero())) {
                return Err(NbError::InvalidParams(format!(
                    "priors should be strictly positive, got {priors}"
                )));
            }
            if (priors.sum() - F::one()).abs() > F::cast(1e-8) {
                return Err(NbError::InvalidParams(format!(
                    "priors should sum to 1, got {priors}"
                )));
            }
            if let Some(classes) = &params.classes {
                if classes.len() != priors.len() {
                    return Err(NbError::InvalidParams(format!(
                        "{} priors given for {} classes",
                        priors.len(),
                        classes.len()
                    )));
                }
            }
        }
        if let Some(classes) = &params.classes {
            let mut sorted = classes.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if classes.is_empty() || sorted.len() != classes.len() {
                return Err(NbError::InvalidParams(
                    "declared classes should be non empty and distinct".to_string(),
                ));
            }
        }
        if let Some(threshold) = params.binarize {
            if !threshold.is_finite() {
                return Err(NbError::InvalidParams(
                    "binarize threshold should be finite".to_string(),
                ));
            }
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
