//! Optimizer state carried by argmin from one EGO iteration to the next.
use crate::types::ConstraintKind;
use crate::utils::{find_best_result_index, is_feasible};

use argmin::core::{ArgminFloat, Problem, State, TerminationReason, TerminationStatus};
use linfa::Float;
use ndarray::{s, Array1, Array2};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State of the [crate::EgorSolver]: the doe evaluated so far, the location
/// of its best point and the bookkeeping required by `argmin::core::Executor`.
///
/// Costs are rows of the doe outputs: the objective value followed by
/// the constraint values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EgorState<F: Float> {
    /// Last evaluated point
    pub param: Option<Array1<F>>,
    /// Best point of the doe
    pub best_param: Option<Array1<F>>,
    /// Outputs at `param`
    pub cost: Option<Array1<F>>,
    /// Outputs at `best_param`
    pub best_cost: Option<Array1<F>>,
    /// Objective value stopping the run once reached
    pub target_cost: F,

    /// Iteration counter
    pub iter: u64,
    /// Iteration where the best point last changed
    pub last_best_iter: u64,
    /// Iteration budget
    pub max_iters: u64,
    /// Function evaluation counters
    pub counts: HashMap<String, u64>,
    /// Elapsed time
    pub time: Option<web_time::Duration>,
    /// Whether and why the run stopped
    pub termination_status: TerminationStatus,

    /// Size of the initial doe
    pub doe_size: usize,
    /// Total number of evaluated points
    pub added: usize,
    /// Kinds of the constraints outputs
    pub cstr_kinds: Vec<ConstraintKind>,
    /// Inequality constraint tolerance (feasible when cstr >= -cstr_tol)
    pub cstr_tol: F,
    /// Best infill criterion value of the last iteration
    pub infill_value: F,

    /// Evaluated doe as (x, y) where y rows are [objective, cstr_1, ..., cstr_n]
    pub data: Option<(Array2<F>, Array2<F>)>,
    /// Row of the best point in data before the last iteration
    pub prev_best_index: Option<usize>,
    /// Row of the best point in data
    pub best_index: Option<usize>,

    /// Random generator passed along iterations for reproducibility
    pub rng: Option<Xoshiro256Plus>,
}

impl<F> EgorState<F>
where
    Self: State<Float = F>,
    F: Float,
{
    /// Records the last evaluated point.
    ///
    /// ```
    /// # use argmin::core::State;
    /// # use egolearn_ego::EgorState;
    /// # use ndarray::array;
    /// let state: EgorState<f64> = EgorState::new();
    /// let state = state.param(array![0.0f64, 3.0f64]);
    /// assert_eq!(state.get_param(), Some(&array![0.0, 3.0]));
    /// ```
    #[must_use]
    pub fn param(mut self, param: Array1<F>) -> Self {
        self.param = Some(param);
        self
    }

    /// Objective value stopping the run once reached (default -inf)
    #[must_use]
    pub fn target_cost(mut self, target_cost: F) -> Self {
        self.target_cost = target_cost;
        self
    }

    /// Iteration budget
    #[must_use]
    pub fn max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Records the outputs at the last evaluated point
    #[must_use]
    pub fn cost(mut self, cost: Array1<F>) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Stores the evaluated doe
    #[must_use]
    pub fn data(mut self, data: (Array2<F>, Array2<F>)) -> Self {
        self.data = Some(data);
        self
    }

    /// Takes the evaluated doe out of the state
    pub fn take_data(&mut self) -> Option<(Array2<F>, Array2<F>)> {
        self.data.take()
    }

    /// Stores the random generator
    #[must_use]
    pub fn rng(mut self, rng: Xoshiro256Plus) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Takes the random generator out of the state
    pub fn take_rng(&mut self) -> Option<Xoshiro256Plus> {
        self.rng.take()
    }

    /// Records the infill criterion value of the iteration
    #[must_use]
    pub fn infill_value(mut self, infill_value: F) -> Self {
        self.infill_value = infill_value;
        self
    }

    /// Best infill criterion value of the last iteration
    pub fn get_infill_value(&self) -> F {
        self.infill_value
    }

    /// Objective and constraint values at the last evaluated point
    pub fn get_full_cost(&self) -> Option<&Array1<F>> {
        self.cost.as_ref()
    }

    /// Objective and constraint values at the best point
    pub fn get_full_best_cost(&self) -> Option<&Array1<F>> {
        self.best_cost.as_ref()
    }
}

/// Objective value, ie first output, or +inf when unknown
fn objective_of<F: Float>(outputs: Option<&Array1<F>>) -> F {
    outputs
        .and_then(|y| y.get(0).copied())
        .unwrap_or_else(F::infinity)
}

impl<F> State for EgorState<F>
where
    F: Float + ArgminFloat,
{
    type Param = Array1<F>;
    type Float = F;

    fn new() -> Self {
        EgorState {
            param: None,
            best_param: None,
            cost: None,
            best_cost: None,
            target_cost: F::neg_infinity(),

            iter: 0,
            last_best_iter: 0,
            max_iters: u64::MAX,
            counts: HashMap::new(),
            time: Some(web_time::Duration::new(0, 0)),
            termination_status: TerminationStatus::NotTerminated,

            doe_size: 0,
            added: 0,
            cstr_kinds: vec![],
            cstr_tol: F::cast(crate::DEFAULT_CSTR_TOL),
            infill_value: F::infinity(),

            data: None,
            prev_best_index: None,
            best_index: None,

            rng: Some(Xoshiro256Plus::from_entropy()),
        }
    }

    /// Refreshes the best point from the doe data
    fn update(&mut self) {
        let Some((x_data, y_data)) = self.data.as_ref() else {
            return;
        };
        let best_index = self.best_index.unwrap_or_else(|| {
            let y_data = y_data.mapv(|v| v.to_f64().unwrap_or(f64::NAN));
            let cstr_tol = self.cstr_tol.to_f64().unwrap_or(crate::DEFAULT_CSTR_TOL);
            find_best_result_index(&y_data, &self.cstr_kinds, cstr_tol)
        });
        self.best_param = Some(x_data.row(best_index).to_owned());
        self.best_cost = Some(y_data.row(best_index).to_owned());

        let improved = best_index >= self.doe_size
            && matches!(self.prev_best_index, Some(prev_index) if prev_index != best_index);
        if improved {
            self.last_best_iter = self.iter + 1;
        }
    }

    fn get_param(&self) -> Option<&Array1<F>> {
        self.param.as_ref()
    }

    fn get_best_param(&self) -> Option<&Array1<F>> {
        self.best_param.as_ref()
    }

    fn terminate_with(mut self, reason: TerminationReason) -> Self {
        self.termination_status = TerminationStatus::Terminated(reason);
        self
    }

    fn time(&mut self, time: Option<web_time::Duration>) -> &mut Self {
        self.time = time;
        self
    }

    /// Objective value at the last evaluated point
    fn get_cost(&self) -> F {
        objective_of(self.cost.as_ref())
    }

    /// Objective value at the best point, infinite while that point violates
    /// its constraints so that a target cost only stops a feasible run
    fn get_best_cost(&self) -> F {
        match self.best_cost.as_ref() {
            Some(best) if best.len() > 1 => {
                let cstrs = best.slice(s![1..]).mapv(|v| v.to_f64().unwrap_or(f64::NAN));
                let cstr_tol = self.cstr_tol.to_f64().unwrap_or(crate::DEFAULT_CSTR_TOL);
                if is_feasible(&cstrs, &self.cstr_kinds, cstr_tol) {
                    best[0]
                } else {
                    F::infinity()
                }
            }
            best => objective_of(best),
        }
    }

    fn get_target_cost(&self) -> F {
        self.target_cost
    }

    fn get_iter(&self) -> u64 {
        self.iter
    }

    fn get_last_best_iter(&self) -> u64 {
        self.last_best_iter
    }

    fn get_max_iters(&self) -> u64 {
        self.max_iters
    }

    fn get_termination_status(&self) -> &TerminationStatus {
        &self.termination_status
    }

    fn get_termination_reason(&self) -> Option<&TerminationReason> {
        if let TerminationStatus::Terminated(reason) = &self.termination_status {
            Some(reason)
        } else {
            None
        }
    }

    fn get_time(&self) -> Option<web_time::Duration> {
        self.time
    }

    fn increment_iter(&mut self) {
        self.iter += 1;
    }

    fn func_counts<O>(&mut self, problem: &Problem<O>) {
        self.counts.extend(
            problem
                .counts
                .iter()
                .map(|(name, &count)| (name.to_string(), count)),
        );
    }

    fn get_func_counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    /// Whether the last iteration improved the best point
    fn is_best(&self) -> bool {
        self.last_best_iter == self.iter + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_update_best() {
        let mut state: EgorState<f64> = EgorState::new();
        state.cstr_kinds = vec![ConstraintKind::Inequality];
        state.doe_size = 2;
        let mut state = state.data((
            array![[0.], [1.], [2.]],
            array![[-3., -1.], [-1., 1.], [2., 0.5]],
        ));
        state.update();
        assert_eq!(state.get_best_param(), Some(&array![1.]));
        assert_eq!(state.get_best_cost(), -1.);
        assert_eq!(state.get_full_best_cost(), Some(&array![-1., 1.]));
        assert_eq!(state.get_cost(), f64::INFINITY);
    }

    #[test]
    fn test_infeasible_best_does_not_reach_target() {
        let mut state: EgorState<f64> = EgorState::new();
        state.cstr_kinds = vec![ConstraintKind::Inequality];
        state.target_cost = -1.;
        let mut state = state.data((array![[0.], [1.]], array![[-5., -2.], [-3., -0.5]]));
        state.update();
        // least violating point is kept as best but its cost is not reported
        assert_eq!(state.get_best_param(), Some(&array![1.]));
        assert_eq!(state.get_full_best_cost(), Some(&array![-3., -0.5]));
        assert_eq!(state.get_best_cost(), f64::INFINITY);
        assert!(state.get_best_cost() > state.get_target_cost());
    }

    #[test]
    fn test_improvement_tracking() {
        let mut state: EgorState<f64> = EgorState::new();
        state.doe_size = 2;
        state.prev_best_index = Some(0);
        state.best_index = Some(2);
        let mut state = state.data((array![[0.], [1.], [2.]], array![[1.], [2.], [0.5]]));
        state.update();
        assert!(state.is_best());
        state.increment_iter();
        state.prev_best_index = Some(2);
        state.update();
        assert!(!state.is_best());
    }

    #[test]
    fn test_terminate_with() {
        let state: EgorState<f64> = EgorState::new();
        assert!(!state.terminated());
        let state = state.terminate_with(TerminationReason::SolverConverged);
        assert_eq!(
            state.get_termination_reason(),
            Some(&TerminationReason::SolverConverged)
        );
    }
}
