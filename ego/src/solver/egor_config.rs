//! Egor optimizer configuration.
use crate::criteria::*;
use crate::errors::{EgoError, Result};
use crate::types::*;
use egolearn_gp::{CorrKind, MeanKind};
use ndarray::{Array2, ArrayBase, Data, Ix2};
use serde::{Deserialize, Serialize};

/// Default tolerance value for inequality constraints to be satisfied (ie cstr >= -tol)
pub const DEFAULT_CSTR_TOL: f64 = 1e-6;

/// Egor optimizer configuration
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct EgorConfig {
    /// Max number of function iterations allocated to find the optimum (aka iteration budget)
    /// Note : The number of cost function evaluations is at most (n_doe + max_iters)
    /// as the run stops when no more point can be added
    pub(crate) max_iters: usize,
    /// Number of starts of the local refinement of the infill criterion maximization
    pub(crate) n_start: usize,
    /// Number of initial doe drawn using Latin hypercube sampling
    /// Note: n_doe > 0; otherwise n_doe = max(xdim + 1, 5)
    pub(crate) n_doe: usize,
    /// Number of candidates scanned by the infill criterion maximization
    /// Note: n_candidates > 0; otherwise n_candidates = max(100 * xdim, 200)
    pub(crate) n_candidates: usize,
    /// Kinds of the constraints, the function output being [objective, cstr_1, ... cstr_n]
    pub(crate) cstr_kinds: Vec<ConstraintKind>,
    /// Inequality constraints violation tolerance meaning cstr >= -cstr_tol is considered valid
    pub(crate) cstr_tol: f64,
    /// Initial doe can be either \[x\] with x inputs only or an evaluated doe \[x, y\]
    /// Note: x dimension is determined using `xlimits.nrows()`
    pub(crate) doe: Option<Array2<f64>>,
    /// Criterion to select next point to evaluate
    pub(crate) infill_criterion: Box<dyn InfillCriterion>,
    /// Threshold under which the infill criterion is considered exhausted
    pub(crate) infill_tol: f64,
    /// Mean model of the surrogates
    pub(crate) mean: MeanKind,
    /// Correlation model of the surrogates
    pub(crate) corr: CorrKind,
    /// Objective value stopping the run once reached
    pub(crate) target: Option<f64>,
    /// Directory to save the configuration and the optimization history
    pub(crate) outdir: Option<String>,
    /// A random generator seed used to get reproductible results.
    pub(crate) seed: Option<u64>,
    /// Matrix (nx, 2) of [lower bound, upper bound] of the nx components of x
    pub(crate) xlimits: Array2<f64>,
}

impl Default for EgorConfig {
    fn default() -> Self {
        EgorConfig {
            max_iters: 20,
            n_start: 20,
            n_doe: 0,
            n_candidates: 0,
            cstr_kinds: vec![],
            cstr_tol: DEFAULT_CSTR_TOL,
            doe: None,
            infill_criterion: Box::new(EI),
            infill_tol: 1e-12,
            mean: MeanKind::Constant,
            corr: CorrKind::SquaredExponential,
            target: None,
            outdir: None,
            seed: None,
            xlimits: Array2::zeros((0, 2)),
        }
    }
}

impl EgorConfig {
    /// Sets the infill criterion
    pub fn infill_criterion(mut self, infill_criterion: Box<dyn InfillCriterion>) -> Self {
        self.infill_criterion = infill_criterion;
        self
    }

    /// Sets the infill strategy
    pub fn infill_strategy(mut self, infill: InfillStrategy) -> Self {
        self.infill_criterion = match infill {
            InfillStrategy::EI => Box::new(EI),
            InfillStrategy::SB => Box::new(SB),
            InfillStrategy::LCB { k } => Box::new(LowerConfidenceBound { k }),
        };
        self
    }

    /// Sets max number of iterations to optimize the objective function
    pub fn max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Sets the number of local refinements of the infill criterion maximization (best result taken)
    pub fn n_start(mut self, n_start: usize) -> Self {
        self.n_start = n_start;
        self
    }

    /// Number of samples of initial LHS sampling (used when DOE not provided by the user)
    ///
    /// When 0 a number of points is computed automatically regarding the number of input variables
    /// of the function under optimization.
    pub fn n_doe(mut self, n_doe: usize) -> Self {
        self.n_doe = n_doe;
        self
    }

    /// Sets the number of candidates scanned before the local refinement of the infill
    /// criterion maximization. When 0 the number is computed from the input dimension.
    pub fn n_candidates(mut self, n_candidates: usize) -> Self {
        self.n_candidates = n_candidates;
        self
    }

    /// Sets the number of inequality constraints
    pub fn n_cstr(mut self, n_cstr: usize) -> Self {
        self.cstr_kinds = vec![ConstraintKind::Inequality; n_cstr];
        self
    }

    /// Sets the kinds of the constraints given in the order of the function outputs
    pub fn cstr_kinds(mut self, cstr_kinds: &[ConstraintKind]) -> Self {
        self.cstr_kinds = cstr_kinds.to_vec();
        self
    }

    /// Sets the tolerance on inequality constraints violation (`cstr >= -tol`)
    pub fn cstr_tol(mut self, tol: f64) -> Self {
        self.cstr_tol = tol;
        self
    }

    /// Sets an initial DOE \['ns', `nt`\] containing `ns` samples.
    ///
    /// Either `nt` = `nx` then only `x` input values are specified and `ns` evals are done to get y ouput doe values,
    /// or `nt = nx + ny` then `x = doe\[:, :nx\]` and `y = doe\[:, nx:\]` are specified
    pub fn doe(mut self, doe: &Array2<f64>) -> Self {
        self.doe = Some(doe.to_owned());
        self
    }

    /// Removes any previously specified initial doe to get the default doe usage
    pub fn default_doe(mut self) -> Self {
        self.doe = None;
        self
    }

    /// Sets the threshold under which the infill criterion is considered exhausted
    pub fn infill_tol(mut self, infill_tol: f64) -> Self {
        self.infill_tol = infill_tol;
        self
    }

    /// Sets the mean model used by the surrogates
    pub fn mean(mut self, mean: MeanKind) -> Self {
        self.mean = mean;
        self
    }

    /// Sets the correlation model used by the surrogates
    pub fn corr(mut self, corr: CorrKind) -> Self {
        self.corr = corr;
        self
    }

    /// Sets a known target minimum to be used as a stopping criterion.
    pub fn target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets a directory to write the configuration and the optimization history
    pub fn outdir(mut self, outdir: impl Into<String>) -> Self {
        self.outdir = Some(outdir.into());
        self
    }

    /// Do not write optimization history
    pub fn no_outdir(mut self) -> Self {
        self.outdir = None;
        self
    }

    /// Allow to specify a seed for random number generator to allow
    /// reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the design space as a (nx, 2) matrix of [lower, upper] bounds
    pub fn xlimits(mut self, xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Self {
        self.xlimits = xlimits.to_owned();
        self
    }

    /// Checks the consistency of the configuration
    pub fn check(self) -> Result<ValidEgorConfig> {
        let nx = self.xlimits.nrows();
        if nx == 0 || self.xlimits.ncols() != 2 {
            return Err(EgoError::InvalidConfigError(format!(
                "xlimits should be a non empty (nx, 2) matrix, got {:?}",
                self.xlimits.shape()
            )));
        }
        if self
            .xlimits
            .rows()
            .into_iter()
            .any(|row| !(row[0].is_finite() && row[1].is_finite() && row[0] < row[1]))
        {
            return Err(EgoError::InvalidConfigError(format!(
                "xlimits should be finite [lower, upper] intervals with lower < upper, got {}",
                self.xlimits
            )));
        }
        if let Some(doe) = self.doe.as_ref() {
            let ny = 1 + self.cstr_kinds.len();
            if doe.nrows() == 0 {
                return Err(EgoError::InvalidConfigError(
                    "initial doe should not be empty".to_string(),
                ));
            }
            if doe.ncols() != nx && doe.ncols() != nx + ny {
                return Err(EgoError::InvalidConfigError(format!(
                    "initial doe should have {} or {} columns, got {}",
                    nx,
                    nx + ny,
                    doe.ncols()
                )));
            }
            if doe.iter().any(|v| !v.is_finite()) {
                return Err(EgoError::InvalidConfigError(
                    "initial doe should only contain finite values".to_string(),
                ));
            }
        }
        if !(self.cstr_tol >= 0. && self.cstr_tol.is_finite()) {
            return Err(EgoError::InvalidConfigError(format!(
                "constraint tolerance should be positive, got {}",
                self.cstr_tol
            )));
        }
        for kind in self.cstr_kinds.iter() {
            if let ConstraintKind::Equality { tol } = kind {
                if !(*tol >= 0. && tol.is_finite()) {
                    return Err(EgoError::InvalidConfigError(format!(
                        "equality constraint tolerance should be positive, got {tol}"
                    )));
                }
            }
        }
        if !(self.infill_tol >= 0.) {
            return Err(EgoError::InvalidConfigError(format!(
                "infill tolerance should be positive, got {}",
                self.infill_tol
            )));
        }
        if self.n_start == 0 {
            return Err(EgoError::InvalidConfigError(
                "number of infill optimization starts should be at least 1".to_string(),
            ));
        }
        Ok(ValidEgorConfig(self))
    }
}

/// A checked [EgorConfig]
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ValidEgorConfig(pub(crate) EgorConfig);

impl std::ops::Deref for ValidEgorConfig {
    type Target = EgorConfig;

    fn deref(&self) -> &EgorConfig {
        &self.0
    }
}

impl ValidEgorConfig {
    /// Dimension of the inputs
    pub fn nx(&self) -> usize {
        self.xlimits.nrows()
    }

    /// Number of initial doe points drawn when no doe is given
    pub fn n_doe_value(&self) -> usize {
        if self.n_doe == 0 {
            (self.nx() + 1).max(5)
        } else {
            self.n_doe
        }
    }

    /// Number of candidates scanned by the infill criterion maximization
    pub fn n_candidates_value(&self) -> usize {
        if self.n_candidates == 0 {
            (100 * self.nx()).max(200)
        } else {
            self.n_candidates
        }
    }
}
