use crate::density::{ClassDensity, ClassStats};
use crate::errors::{NbError, Result};
use crate::parameters::{DensityKind, NbParams, NbValidParams};

use linfa::dataset::{AsSingleTargets, DatasetBase};
use linfa::prelude::{Fit, Float, PredictInplace};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};

use log::{debug, warn};
use ndarray_stats::QuantileExt;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Naive Bayes classifier.
///
/// Features are assumed independent given the class, so that the joint
/// likelihood of a point factorizes in per-feature densities. Classes are
/// scored in log space
///
/// `log_score(c) = ln(prior(c)) + sum_i ln(p(x_i | c))`
///
/// and posteriors are normalized with a max-shifted softmax, so that
/// scoring many features never underflows to zero.
///
/// # Example
///
/// ```
/// use egolearn_nb::NaiveBayes;
/// use linfa::prelude::*;
/// use ndarray::array;
///
/// let x = array![[1.8, 80.], [1.75, 85.], [1.6, 55.], [1.55, 50.]];
/// let y = array![0usize, 0, 1, 1];
/// let model = NaiveBayes::params()
///     .fit(&Dataset::new(x, y))
///     .expect("naive Bayes trained");
///
/// let probas = model.predict_proba(&array![[1.62, 52.]]).expect("posteriors");
/// assert!(probas[[0, 1]] > probas[[0, 0]]);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(deserialize = "F: Deserialize<'de>"))
)]
pub struct NaiveBayes<F: Float> {
    /// Sorted class labels
    classes: Vec<usize>,
    /// Sufficient statistics, one per class
    stats: Vec<ClassStats<F>>,
    /// Smoothed densities, one per class
    densities: Vec<ClassDensity<F>>,
    log_priors: Array1<F>,
    params: NbValidParams<F>,
}

impl<F: Float> NaiveBayes<F> {
    /// Naive Bayes parameters constructor
    pub fn params() -> NbParams<F> {
        NbParams::new()
    }

    /// Sorted class labels
    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    /// Fitted conditional densities in the order of [NaiveBayes::classes]
    pub fn densities(&self) -> &[ClassDensity<F>] {
        &self.densities
    }

    /// Class priors in the order of [NaiveBayes::classes]
    pub fn priors(&self) -> Array1<F> {
        self.log_priors.mapv(|v| v.exp())
    }

    /// Number of training samples seen per class
    pub fn class_counts(&self) -> Array1<F> {
        self.stats.iter().map(|s| s.count()).collect()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.densities.first().map(|d| d.n_features()).unwrap_or(0)
    }

    /// Parameters used to fit the model
    pub fn params_used(&self) -> &NbValidParams<F> {
        &self.params
    }

    fn check_dim(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<()> {
        if x.ncols() != self.n_features() {
            return Err(NbError::DimensionMismatch {
                expected: self.n_features(),
                actual: x.ncols(),
            });
        }
        Ok(())
    }

    fn joint_log_likelihood(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Array2<F> {
        let mut scores = Array2::zeros((x.nrows(), self.classes.len()));
        for (mut row, xi) in scores.rows_mut().into_iter().zip(x.rows()) {
            for (k, density) in self.densities.iter().enumerate() {
                row[k] = self.log_priors[k] + density.log_density(&xi);
            }
        }
        scores
    }

    /// Log scores `ln(prior(c)) + sum_i ln(p(x_i | c))` of the (n, nx) `x` points
    /// as a (n, n_classes) matrix.
    pub fn log_scores(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        self.check_dim(x)?;
        Ok(self.joint_log_likelihood(x))
    }

    /// Scores `prior(c) * prod_i p(x_i | c)` computed as a plain product,
    /// which underflows to zero when many features are unlikely.
    /// Use [NaiveBayes::log_scores] for ranking.
    pub fn product_scores(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        self.check_dim(x)?;
        let priors = self.priors();
        let mut scores = Array2::zeros((x.nrows(), self.classes.len()));
        for (mut row, xi) in scores.rows_mut().into_iter().zip(x.rows()) {
            for (k, density) in self.densities.iter().enumerate() {
                row[k] = density
                    .feature_log_densities(&xi)
                    .fold(priors[k], |acc, lp| acc * lp.exp());
            }
        }
        Ok(scores)
    }

    /// Posterior probabilities of the classes as a (n, n_classes) matrix, rows sum to 1.
    pub fn predict_proba(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        let mut scores = self.log_scores(x)?;
        for mut row in scores.rows_mut() {
            let max = row.max().map_or(F::neg_infinity(), |m| *m);
            row.mapv_inplace(|v| (v - max).exp());
            let norm = row.sum();
            row.mapv_inplace(|v| v / norm);
        }
        Ok(scores)
    }

    /// Update the model with a new batch of samples, the result being the
    /// same as a fit on all the samples seen so far.
    ///
    /// Labels must be classes of the fitted model. Empirical priors are updated,
    /// user priors are kept.
    pub fn partial_fit<D, T>(&mut self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<()>
    where
        D: Data<Elem = F>,
        T: AsSingleTargets<Elem = usize>,
    {
        let x = dataset.records();
        let y = dataset.as_single_targets();
        check_dataset(x, y.len(), &self.params)?;
        self.check_dim(x)?;
        if let Some(&label) = y.iter().find(|l| self.classes.binary_search(*l).is_err()) {
            return Err(NbError::UnknownClass(label));
        }
        for (k, &label) in self.classes.iter().enumerate() {
            if let Some(batch) = class_stats(x, &y, label, &self.params) {
                self.stats[k] = self.stats[k].merge(&batch);
            }
        }
        debug!("Naive Bayes updated with {} samples", y.len());
        self.refresh();
        Ok(())
    }

    /// Recompute densities and priors from the statistics
    fn refresh(&mut self) {
        let epsilon = match self.params.density() {
            DensityKind::Gaussian => self.params.var_smoothing() * max_total_variance(&self.stats),
            _ => F::zero(),
        };
        self.densities = self
            .stats
            .iter()
            .map(|s| {
                s.to_density(
                    self.params.density(),
                    self.params.alpha(),
                    epsilon,
                    self.params.binarize(),
                )
            })
            .collect();
        if self.params.density() == DensityKind::Gaussian {
            let n_degenerated = self
                .densities
                .iter()
                .filter(|d| match d {
                    ClassDensity::Gaussian { var, .. } => {
                        var.iter().any(|v| *v <= F::min_positive_value())
                    }
                    _ => false,
                })
                .count();
            if n_degenerated > 0 {
                warn!("{n_degenerated} classes have a null feature variance");
            }
        }
        self.log_priors = match self.params.priors() {
            Some(priors) => priors.mapv(|p| p.ln()),
            None => {
                let counts = self.class_counts();
                let total = counts.sum();
                counts.mapv(|c| (c / total).ln())
            }
        };
    }
}

impl<F: Float> fmt::Display for NaiveBayes<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "NaiveBayes(density={:?}, classes={:?}, priors={})",
            self.params.density(),
            self.classes,
            self.priors()
        )
    }
}

/// Largest variance of the features over all samples
fn max_total_variance<F: Float>(stats: &[ClassStats<F>]) -> F {
    stats
        .iter()
        .skip(1)
        .fold(stats.first().cloned(), |acc, s| acc.map(|a| a.merge(s)))
        .map(|total| match total {
            ClassStats::Moments { var, .. } => var.max().map_or(F::zero(), |m| *m),
            ClassStats::Counts { .. } => F::zero(),
        })
        .unwrap_or_else(F::zero)
}

fn check_dataset<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    n_targets: usize,
    params: &NbValidParams<F>,
) -> Result<()> {
    if x.nrows() == 0 {
        return Err(linfa::Error::NotEnoughSamples.into());
    }
    if x.nrows() != n_targets {
        return Err(linfa::Error::MismatchedShapes(x.nrows(), n_targets).into());
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(NbError::InvalidValue(
            "features should be finite".to_string(),
        ));
    }
    if params.density() == DensityKind::Multinomial && x.iter().any(|v| *v < F::zero()) {
        return Err(NbError::InvalidValue(
            "multinomial features should be non negative counts".to_string(),
        ));
    }
    Ok(())
}

/// Statistics of the samples labeled `label`, `None` if there is none
fn class_stats<F: Float>(
    x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    y: &ArrayBase<impl Data<Elem = usize>, ndarray::Ix1>,
    label: usize,
    params: &NbValidParams<F>,
) -> Option<ClassStats<F>> {
    let indices: Vec<usize> = y
        .iter()
        .enumerate()
        .filter(|(_, l)| **l == label)
        .map(|(i, _)| i)
        .collect();
    if indices.is_empty() {
        None
    } else {
        let xc = x.select(Axis(0), &indices);
        Some(ClassStats::from_samples(
            params.density(),
            &xc,
            params.binarize(),
        ))
    }
}

impl<F: Float, D: Data<Elem = F>, T: AsSingleTargets<Elem = usize>>
    Fit<ArrayBase<D, Ix2>, T, NbError> for NbValidParams<F>
{
    type Object = NaiveBayes<F>;

    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let x = dataset.records();
        let y = dataset.as_single_targets();
        check_dataset(x, y.len(), self)?;

        let mut found: Vec<usize> = y.to_vec();
        found.sort_unstable();
        found.dedup();
        let classes = match self.classes() {
            Some(declared) => {
                if let Some(&label) = found.iter().find(|l| !declared.contains(*l)) {
                    return Err(NbError::UnknownClass(label));
                }
                let mut declared = declared.to_vec();
                declared.sort_unstable();
                if let Some(&label) = declared.iter().find(|l| found.binary_search(*l).is_err()) {
                    return Err(NbError::EmptyClass(label));
                }
                declared
            }
            None => found,
        };
        if let Some(priors) = self.priors() {
            if priors.len() != classes.len() {
                return Err(NbError::InvalidParams(format!(
                    "{} priors given for {} classes",
                    priors.len(),
                    classes.len()
                )));
            }
        }

        let stats = classes
            .iter()
            .map(|&label| class_stats(x, &y, label, self).ok_or(NbError::EmptyClass(label)))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "Naive Bayes fitted on {} samples of classes {classes:?}",
            x.nrows()
        );

        let mut model = NaiveBayes {
            classes,
            stats,
            densities: vec![],
            log_priors: Array1::zeros(0),
            params: self.clone(),
        };
        model.refresh();
        Ok(model)
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<usize>>
    for NaiveBayes<F>
{
    /// **Panics** if the number of features of `x` is not the training one.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<usize>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.n_features(),
            "Points dimension must match the training one."
        );
        let scores = self.joint_log_likelihood(x);
        *y = scores.map_axis(Axis(1), |row| {
            let best = row.argmax().unwrap_or(0);
            self.classes[best]
        });
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<usize> {
        Array1::zeros(x.nrows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use linfa::prelude::{Dataset, Predict};
    use ndarray::{array, s, Array};

    /// Height (m), weight (kg), foot size (cm), label 0 for male and 1 for female
    fn sex_dataset() -> (Array2<f64>, Array1<usize>) {
        let imperial = array![
            [6.00, 180., 12.],
            [5.92, 190., 11.],
            [5.58, 170., 12.],
            [5.92, 165., 10.],
            [5.00, 100., 6.],
            [5.50, 150., 8.],
            [5.42, 130., 7.],
            [5.75, 150., 9.],
        ];
        let metric = imperial * array![0.3048, 0.45359237, 2.54];
        (metric, array![0usize, 0, 0, 0, 1, 1, 1, 1])
    }

    #[test]
    fn test_sex_log_scores() {
        let (x, y) = sex_dataset();
        let model = NaiveBayes::params()
            .fit(&Dataset::new(x, y))
            .expect("NB fit error");
        assert_eq!(model.classes(), &[0usize, 1]);
        assert_abs_diff_eq!(model.priors(), array![0.5, 0.5], epsilon = 1e-12);

        let xtest = array![[1.81, 59., 21.]];
        let scores = model.log_scores(&xtest).unwrap();
        assert_abs_diff_eq!(scores, array![[-20.8242, -6.3272]], epsilon = 1e-3);

        let products = model.product_scores(&xtest).unwrap();
        assert_abs_diff_eq!(
            products.mapv(f64::ln),
            scores,
            epsilon = 1e-9
        );
        assert_eq!(model.predict(&xtest), array![1usize]);
    }

    #[test]
    fn test_ranking_with_unbalanced_priors() {
        let (x, y) = sex_dataset();
        // one more male sample shifts the priors towards class 0
        let x = ndarray::concatenate![Axis(0), x, array![[1.75, 80., 28.]]];
        let y = ndarray::concatenate![Axis(0), y, array![0usize]];
        let model = NaiveBayes::params()
            .fit(&Dataset::new(x, y))
            .expect("NB fit error");
        assert_abs_diff_eq!(model.priors(), array![5. / 9., 4. / 9.], epsilon = 1e-12);

        let xtest = array![[1.81, 59., 21.]];
        let probas = model.predict_proba(&xtest).unwrap();
        assert!(probas[[0, 1]] > probas[[0, 0]]);
        assert_abs_diff_eq!(probas.sum(), 1., epsilon = 1e-12);
        let scores = model.log_scores(&xtest).unwrap();
        assert!(scores[[0, 1]] > scores[[0, 0]]);
    }

    #[test]
    fn test_posteriors_sum_to_one() {
        let (x, y) = sex_dataset();
        let model = NaiveBayes::params()
            .fit(&Dataset::new(x.to_owned(), y))
            .expect("NB fit error");
        let probas = model.predict_proba(&x).unwrap();
        assert_abs_diff_eq!(probas.sum_axis(Axis(1)), Array::ones(8), epsilon = 1e-12);
    }

    #[test]
    fn test_underflow() {
        let (x, y) = sex_dataset();
        let model = NaiveBayes::params()
            .fit(&Dataset::new(x, y))
            .expect("NB fit error");
        let xfar = array![[4., 400., 150.]];
        let products = model.product_scores(&xfar).unwrap();
        assert_eq!(products, array![[0., 0.]]);
        let scores = model.log_scores(&xfar).unwrap();
        assert!(scores.iter().all(|v| v.is_finite()));
        let probas = model.predict_proba(&xfar).unwrap();
        assert!(probas.iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(probas.sum(), 1., epsilon = 1e-12);
    }

    #[test]
    fn test_constant_feature() {
        let x = array![[1f64, 0.], [1., 1.], [1., 5.], [1., 6.]];
        let y = array![0usize, 0, 1, 1];
        let model = NaiveBayes::params()
            .fit(&Dataset::new(x, y))
            .expect("NB fit error");
        let scores = model.log_scores(&array![[1., 0.5], [2., 5.5]]).unwrap();
        assert!(scores.iter().all(|v| v.is_finite()));
        assert_eq!(model.predict(&array![[1., 0.5], [1., 5.5]]), array![0usize, 1]);
    }

    #[test]
    fn test_multinomial_unseen_value() {
        // word counts, the last word never appears in class 0
        let x = array![[3f64, 1., 0.], [2., 2., 0.], [0., 1., 4.], [1., 0., 3.]];
        let y = array![0usize, 0, 1, 1];
        let model = NaiveBayes::params()
            .density(DensityKind::Multinomial)
            .fit(&Dataset::new(x, y))
            .expect("NB fit error");
        let xtest = array![[2., 1., 1.]];
        let scores = model.log_scores(&xtest).unwrap();
        assert!(scores.iter().all(|v| v.is_finite()));
        let probas = model.predict_proba(&xtest).unwrap();
        assert!(probas[[0, 0]] > 0.);
        assert_eq!(model.predict(&xtest), array![0usize]);
    }

    #[test]
    fn test_bernoulli_unseen_value() {
        let x = array![[1f64, 0., 0.], [1., 1., 0.], [0., 0., 1.], [0., 1., 1.]];
        let y = array![3usize, 3, 7, 7];
        let model = NaiveBayes::params()
            .density(DensityKind::Bernoulli)
            .fit(&Dataset::new(x, y))
            .expect("NB fit error");
        assert_eq!(model.classes(), &[3usize, 7]);
        let xtest = array![[1., 0., 1.]];
        let scores = model.log_scores(&xtest).unwrap();
        assert!(scores.iter().all(|v| v.is_finite()));
        assert_abs_diff_eq!(scores[[0, 0]], scores[[0, 1]], epsilon = 1e-12);
        assert_eq!(model.predict(&array![[1., 1., 0.]]), array![3usize]);
    }

    #[test]
    fn test_partial_fit_gaussian() {
        let (x, y) = sex_dataset();
        let full = NaiveBayes::params()
            .fit(&Dataset::new(x.to_owned(), y.to_owned()))
            .expect("NB fit error");

        let first = [0, 1, 4, 5];
        let last = [2, 3, 6, 7];
        let mut model = NaiveBayes::params()
            .fit(&Dataset::new(
                x.select(Axis(0), &first),
                y.select(Axis(0), &first),
            ))
            .expect("NB fit error");
        model
            .partial_fit(&Dataset::new(
                x.select(Axis(0), &last),
                y.select(Axis(0), &last),
            ))
            .expect("NB update error");

        assert_abs_diff_eq!(model.class_counts(), array![4., 4.]);
        let xtest = array![[1.81, 59., 21.], [1.7, 70., 25.]];
        assert_abs_diff_eq!(
            model.log_scores(&xtest).unwrap(),
            full.log_scores(&xtest).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_partial_fit_counts() {
        let x = array![[3f64, 1., 0.], [2., 2., 0.], [0., 1., 4.], [1., 0., 3.]];
        let y = array![0usize, 0, 1, 1];
        let params = NaiveBayes::params().density(DensityKind::Multinomial);
        let full = params
            .fit(&Dataset::new(x.to_owned(), y.to_owned()))
            .expect("NB fit error");
        let mut model = params
            .fit(&Dataset::new(
                x.slice(s![1..3, ..]).to_owned(),
                y.slice(s![1..3]).to_owned(),
            ))
            .expect("NB fit error");
        model
            .partial_fit(&Dataset::new(
                x.select(Axis(0), &[0, 3]),
                y.select(Axis(0), &[0, 3]),
            ))
            .expect("NB update error");
        assert_eq!(model.densities(), full.densities());
        assert_abs_diff_eq!(model.priors(), full.priors(), epsilon = 1e-12);
    }

    #[test]
    fn test_partial_fit_unknown_class() {
        let (x, y) = sex_dataset();
        let mut model = NaiveBayes::params()
            .fit(&Dataset::new(x, y))
            .expect("NB fit error");
        let res = model.partial_fit(&Dataset::new(array![[1.7, 60., 20.]], array![2usize]));
        assert!(matches!(res, Err(NbError::UnknownClass(2))));
    }

    #[test]
    fn test_declared_classes() {
        let (x, y) = sex_dataset();
        let res = NaiveBayes::params()
            .classes(vec![0, 1, 2])
            .fit(&Dataset::new(x.to_owned(), y.to_owned()));
        assert!(matches!(res, Err(NbError::EmptyClass(2))));

        let res = NaiveBayes::params()
            .classes(vec![1, 2])
            .fit(&Dataset::new(x, y));
        assert!(matches!(res, Err(NbError::UnknownClass(0))));
    }

    #[test]
    fn test_user_priors() {
        let (x, y) = sex_dataset();
        let model = NaiveBayes::params()
            .priors(array![0.9, 0.1])
            .fit(&Dataset::new(x, y))
            .expect("NB fit error");
        let xtest = array![[1.81, 59., 21.]];
        let scores = model.log_scores(&xtest).unwrap();
        assert_abs_diff_eq!(
            scores,
            array![[-20.8242 - 0.5f64.ln() + 0.9f64.ln(), -6.3272 - 0.5f64.ln() + 0.1f64.ln()]],
            epsilon = 1e-3
        );

        let res = NaiveBayes::params()
            .priors(array![0.2, 0.3, 0.5])
            .fit(&Dataset::new(sex_dataset().0, sex_dataset().1));
        assert!(matches!(res, Err(NbError::InvalidParams(_))));
    }

    #[test]
    fn test_bad_inputs() {
        let (x, y) = sex_dataset();
        let model = NaiveBayes::params()
            .fit(&Dataset::new(x, y))
            .expect("NB fit error");
        assert!(matches!(
            model.log_scores(&array![[1.8, 70.]]),
            Err(NbError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));

        let res = NaiveBayes::<f64>::params().fit(&Dataset::new(
            Array2::<f64>::zeros((0, 2)),
            Array1::<usize>::zeros(0),
        ));
        assert!(matches!(res, Err(NbError::LinfaError(_))));

        let res = NaiveBayes::params()
            .density(DensityKind::Multinomial)
            .fit(&Dataset::new(array![[1f64, -1.]], array![0usize]));
        assert!(matches!(res, Err(NbError::InvalidValue(_))));
    }
}
