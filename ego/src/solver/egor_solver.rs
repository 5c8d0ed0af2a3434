//! [EgorSolver] runs EGO iterations as an `argmin::core::Solver`, hence it can be
//! driven by an `argmin::core::Executor` with its observers.
//!
//! [crate::EgorBuilder] wraps the same solver and executor behind a simpler
//! `optimize(f).min_within(xlimits).run()` interface.
//!
//! ```no_run
//! use ndarray::{array, Array2, ArrayView2};
//! use egolearn_ego::{EgorConfig, EgorSolver, InfillStrategy, ObjFunc};
//! use argmin::core::{Executor, State};
//! use argmin_testfunctions::rosenbrock_ab as rosenbrock;
//!
//! // minimum 0 at (1, 1)
//! fn rosenb(x: &ArrayView2<f64>) -> Array2<f64> {
//!     let y = x.rows().into_iter().map(|xi| rosenbrock(&xi.to_vec(), 1., 100.));
//!     Array2::from_shape_vec((x.nrows(), 1), y.collect()).expect("one output per point")
//! }
//!
//! let config = EgorConfig::default()
//!     .infill_strategy(InfillStrategy::EI)
//!     .n_doe(10)
//!     .max_iters(20)
//!     .xlimits(&array![[-2., 2.], [-2., 2.]])
//!     .check()
//!     .expect("valid configuration");
//! let res = Executor::new(ObjFunc::new(rosenb), EgorSolver::new(config))
//!     .run()
//!     .expect("Rosenbrock minimized");
//! println!("Rosenbrock min at {:?}", res.state().get_best_param());
//! ```
use crate::errors::{EgoError, Result};
use crate::solver::egor_config::ValidEgorConfig;
use crate::utils::find_best_result_index;
use crate::EgorState;

use egolearn_doe::{Lhs, SamplingMethod};
use log::{debug, info};
use ndarray::{s, Array2};

use argmin::core::{
    CostFunction, Problem, Solver, State, TerminationReason, TerminationStatus, KV,
};

use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use web_time::Instant;

/// EGO (resp. SEGO when constraints are declared) solver for the argmin framework.
#[derive(Clone, Serialize, Deserialize)]
pub struct EgorSolver {
    pub(crate) config: ValidEgorConfig,
}

impl<O> Solver<O, EgorState<f64>> for EgorSolver
where
    O: CostFunction<Param = Array2<f64>, Output = Array2<f64>>,
{
    const NAME: &'static str = "Egor";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: EgorState<f64>,
    ) -> std::result::Result<(EgorState<f64>, Option<KV>), argmin::core::Error> {
        let mut rng = match self.config.seed {
            Some(seed) => Xoshiro256Plus::seed_from_u64(seed),
            None => Xoshiro256Plus::from_entropy(),
        };
        let nx = self.config.nx();

        let (x_data, y_data) = match self.config.doe.as_ref() {
            Some(doe) if doe.ncols() == nx => {
                info!("Evaluate the given initial doe ({} points)", doe.nrows());
                (doe.to_owned(), self.eval_obj(problem, doe)?)
            }
            Some(doe) => {
                info!("Use the given evaluated doe ({} points)", doe.nrows());
                (
                    doe.slice(s![.., ..nx]).to_owned(),
                    doe.slice(s![.., nx..]).to_owned(),
                )
            }
            None => {
                let n_doe = self.config.n_doe_value();
                info!("Evaluate an initial LHS doe ({n_doe} points)");
                let x = Lhs::new(&self.config.xlimits)
                    .with_rng(Xoshiro256Plus::seed_from_u64(rng.gen()))
                    .sample(n_doe);
                let y = self.eval_obj(problem, &x)?;
                (x, y)
            }
        };

        let best_index =
            find_best_result_index(&y_data, &self.config.cstr_kinds, self.config.cstr_tol);
        info!(
            "Initial doe: best y[{}]={} at x={}",
            best_index,
            y_data.row(best_index),
            x_data.row(best_index)
        );

        let mut initial_state = state
            .max_iters(self.config.max_iters as u64)
            .target_cost(self.config.target.unwrap_or(f64::NEG_INFINITY))
            .rng(rng);
        initial_state.doe_size = x_data.nrows();
        initial_state.added = x_data.nrows();
        initial_state.cstr_kinds = self.config.cstr_kinds.clone();
        initial_state.cstr_tol = self.config.cstr_tol;
        initial_state.best_index = Some(best_index);
        initial_state.prev_best_index = Some(best_index);
        let initial_state = initial_state.data((x_data, y_data));

        Ok((initial_state, None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        state: EgorState<f64>,
    ) -> std::result::Result<(EgorState<f64>, Option<KV>), argmin::core::Error> {
        debug!(
            "Iteration {}/{} starts",
            state.get_iter() + 1,
            state.get_max_iters()
        );
        let now = Instant::now();

        let (new_state, kv) = self.ego_iteration(problem, state)?;
        if let (Some((x_data, y_data)), Some(best_index)) =
            (new_state.data.as_ref(), new_state.best_index)
        {
            info!(
                "Iteration {}/{} done in {:.3}s: best y[{}]={} at x={}",
                new_state.get_iter() + 1,
                new_state.get_max_iters(),
                now.elapsed().as_secs_f64(),
                best_index,
                y_data.row(best_index),
                x_data.row(best_index)
            );
        }
        Ok((new_state, kv))
    }

    fn terminate(&mut self, state: &EgorState<f64>) -> TerminationStatus {
        debug!(
            "Last cost {}, best cost {} (doe row {:?})",
            state.get_cost(),
            state.get_best_cost(),
            state.best_index
        );

        TerminationStatus::NotTerminated
    }
}

impl EgorSolver {
    /// Maps the end of the doe enrichment to a solver convergence
    fn ego_iteration<O: CostFunction<Param = Array2<f64>, Output = Array2<f64>>>(
        &mut self,
        problem: &mut Problem<O>,
        state: EgorState<f64>,
    ) -> std::result::Result<(EgorState<f64>, Option<KV>), argmin::core::Error> {
        match self.ego_step(problem, state) {
            Ok(new_state) => Ok((new_state, None)),
            Err(EgoError::NoMorePointToAddError(state)) => Ok((
                state.terminate_with(TerminationReason::SolverConverged),
                None,
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Evaluates the objective and constraints at the `x` points
    pub(crate) fn eval_obj<O: CostFunction<Param = Array2<f64>, Output = Array2<f64>>>(
        &self,
        pb: &mut Problem<O>,
        x: &Array2<f64>,
    ) -> Result<Array2<f64>> {
        let y = pb.problem("cost_count", |problem| problem.cost(x))?;
        let ny = 1 + self.config.cstr_kinds.len();
        if y.nrows() != x.nrows() || y.ncols() != ny {
            return Err(EgoError::InvalidValue(format!(
                "function should return a ({}, {}) matrix of [objective, constraints] values, got {:?}",
                x.nrows(),
                ny,
                y.shape()
            )));
        }
        Ok(y)
    }
}
