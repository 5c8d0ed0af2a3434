use crate::traits::check_xlimits;
use crate::utils::pdist;
use crate::SamplingMethod;
use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2};
use ndarray_rand::rand::{seq::SliceRandom, Rng, SeedableRng};
use ndarray_stats::QuantileExt;
use rand_xoshiro::Xoshiro256Plus;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Number of candidate designs drawn by maximin variants
const MAXIMIN_TRIALS: usize = 5;

/// Kinds of Latin Hypercube Design
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum LhsKind {
    /// sample is chosen randomly within its latin hypercube interval
    Classic,
    /// sample is the middle of its latin hypercube interval
    Centered,
    /// best of several classic designs wrt the minimal distance between points
    #[default]
    Maximin,
    /// best of several centered designs wrt the minimal distance between points
    CenteredMaximin,
}

/// Latin Hypercube Sampling: each dimension is divided into `ns` equal
/// intervals and every interval holds exactly one sample.
pub struct Lhs<F: Float, R: Rng + Clone> {
    /// Sampling space as a (nx, 2) matrix
    xlimits: Array2<F>,
    kind: LhsKind,
    /// Random generator, shared so that successive `sample` calls draw different designs
    rng: Arc<RwLock<R>>,
}

impl<F: Float> Lhs<F, Xoshiro256Plus> {
    /// Constructor given a design space as a (nx, 2) matrix \[\[lower bound, upper bound\], ...\]
    ///
    /// **Panics** if `xlimits` is not a (nx, 2) matrix with ordered bounds.
    ///
    /// ```
    /// use egolearn_doe::Lhs;
    /// use ndarray::arr2;
    ///
    /// let doe = Lhs::new(&arr2(&[[0.0, 1.0], [5.0, 10.0]]));
    /// ```
    pub fn new(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Self {
        Self::new_with_rng(xlimits, Xoshiro256Plus::from_entropy())
    }
}

impl<F: Float, R: Rng + Clone> Lhs<F, R> {
    /// Constructor with given design space and random generator.
    pub fn new_with_rng(xlimits: &ArrayBase<impl Data<Elem = F>, Ix2>, rng: R) -> Self {
        check_xlimits(xlimits);
        Lhs {
            xlimits: xlimits.to_owned(),
            kind: LhsKind::default(),
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    /// Sets the kind of LHS
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the random generator
    pub fn with_rng<R2: Rng + Clone>(self, rng: R2) -> Lhs<F, R2> {
        Lhs {
            xlimits: self.xlimits,
            kind: self.kind,
            rng: Arc::new(RwLock::new(rng)),
        }
    }

    fn strata(&self, ns: usize, centered: bool, rng: &mut R) -> Array2<F> {
        let nx = self.xlimits.nrows();
        let mut lhs = Array2::zeros((ns, nx));
        let mut perm: Vec<usize> = (0..ns).collect();
        for j in 0..nx {
            perm.shuffle(rng);
            for (i, &k) in perm.iter().enumerate() {
                let offset = if centered { 0.5 } else { rng.gen::<f64>() };
                lhs[[i, j]] = F::cast((k as f64 + offset) / ns as f64);
            }
        }
        lhs
    }

    fn maximin(&self, ns: usize, centered: bool, rng: &mut R) -> Array2<F> {
        let mut best = self.strata(ns, centered, rng);
        if ns < 2 {
            return best;
        }
        let min_dist = |doe: &Array2<F>| pdist(doe).min().map_or(F::zero(), |d| *d);
        let mut best_dist = min_dist(&best);
        for _ in 1..MAXIMIN_TRIALS {
            let lhs = self.strata(ns, centered, rng);
            let d_min = min_dist(&lhs);
            if d_min > best_dist {
                best_dist = d_min;
                best = lhs;
            }
        }
        best
    }
}

impl<F: Float, R: Rng + Clone> SamplingMethod<F> for Lhs<F, R> {
    fn sampling_space(&self) -> &Array2<F> {
        &self.xlimits
    }

    fn normalized_sample(&self, ns: usize) -> Array2<F> {
        let mut guard = self.rng.write().unwrap_or_else(|e| e.into_inner());
        let rng = &mut *guard;
        match self.kind {
            LhsKind::Classic => self.strata(ns, false, rng),
            LhsKind::Centered => self.strata(ns, true, rng),
            LhsKind::Maximin => self.maximin(ns, false, rng),
            LhsKind::CenteredMaximin => self.maximin(ns, true, rng),
        }
    }
}
