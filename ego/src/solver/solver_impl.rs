use crate::errors::{EgoError, Result};
use crate::solver::egor_config::ValidEgorConfig;
use crate::utils::{find_best_result_index, is_update_ok, update_data};
use crate::{EgorSolver, EgorState};

use argmin::argmin_error_closure;
use argmin::core::{CostFunction, Problem};

use egolearn_gp::GpSurrogate;
use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;

impl EgorSolver {
    /// Constructor of the optimization given a checked configuration.
    ///
    /// The function under optimization should return an objective but also constraint values if any.
    /// Design space is given by the `xlimits` of the configuration.
    pub fn new(config: ValidEgorConfig) -> Self {
        EgorSolver { config }
    }

    /// Returns the configuration of the solver
    pub fn config(&self) -> &ValidEgorConfig {
        &self.config
    }

    /// Given an evaluated doe (x, y) data, return the next promising x point
    /// where optimum may occurs regarding the infill criterium.
    /// This function inverse the control of the optimization and can used
    /// ask-and-tell interface to the EGO optimizer.
    pub fn suggest(
        &self,
        x_data: &ArrayBase<impl Data<Elem = f64>, Ix2>,
        y_data: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<Array1<f64>> {
        let ny = 1 + self.config.cstr_kinds.len();
        if x_data.nrows() == 0
            || x_data.nrows() != y_data.nrows()
            || x_data.ncols() != self.config.nx()
            || y_data.ncols() != ny
        {
            return Err(EgoError::InvalidValue(format!(
                "expected (n, {}) x data and (n, {}) y data with n > 0, got {:?} and {:?}",
                self.config.nx(),
                ny,
                x_data.shape(),
                y_data.shape()
            )));
        }
        let mut rng = if let Some(seed) = self.config.seed {
            Xoshiro256Plus::seed_from_u64(seed)
        } else {
            Xoshiro256Plus::from_entropy()
        };
        let x_data = x_data.to_owned();
        let y_data = y_data.to_owned();
        let models = self.make_surrogates(&x_data, &y_data)?;
        let best_index =
            find_best_result_index(&y_data, &self.config.cstr_kinds, self.config.cstr_tol);
        let (_, x_next) = self.optimize_infill_criterion(
            models[0].as_ref(),
            &models[1..],
            y_data[[best_index, 0]],
            &x_data,
            &mut rng,
        );
        Ok(x_next)
    }

    /// Trains one surrogate per output column of `y_data`: the objective first,
    /// then the constraints.
    pub(crate) fn make_surrogates(
        &self,
        x_data: &Array2<f64>,
        y_data: &Array2<f64>,
    ) -> Result<Vec<Box<dyn GpSurrogate>>> {
        (0..y_data.ncols())
            .into_par_iter()
            .map(|k| -> Result<Box<dyn GpSurrogate>> {
                let params =
                    egolearn_gp::make_surrogate_params(self.config.mean, self.config.corr);
                let model = params.train(&x_data.view(), &y_data.column(k))?;
                debug!(
                    "{} surrogate {}",
                    if k == 0 { "Objective" } else { "Constraint" },
                    model
                );
                Ok(model)
            })
            .collect()
    }

    /// One EGO step: fit the surrogates, maximize the infill criterion,
    /// evaluate the selected point and append it to the doe.
    pub(crate) fn ego_step<O: CostFunction<Param = Array2<f64>, Output = Array2<f64>>>(
        &mut self,
        problem: &mut Problem<O>,
        state: EgorState<f64>,
    ) -> Result<EgorState<f64>> {
        let mut new_state = state;
        let mut rng = new_state
            .take_rng()
            .ok_or_else(argmin_error_closure!(PotentialBug, "EgorSolver: No rng!"))?;
        let (mut x_data, mut y_data) = new_state
            .take_data()
            .ok_or_else(argmin_error_closure!(PotentialBug, "EgorSolver: No data!"))?;
        let best_index = new_state.best_index.unwrap_or_else(|| {
            find_best_result_index(&y_data, &self.config.cstr_kinds, self.config.cstr_tol)
        });

        let models = self.make_surrogates(&x_data, &y_data)?;
        let fmin = y_data[[best_index, 0]];
        let (infill_value, x_next) = self.optimize_infill_criterion(
            models[0].as_ref(),
            &models[1..],
            fmin,
            &x_data,
            &mut rng,
        );
        new_state = new_state.infill_value(infill_value).rng(rng);
        info!(
            "Infill criterion {} max found = {}",
            self.config.infill_criterion.name(),
            infill_value
        );

        if self
            .config
            .infill_criterion
            .is_exhausted(infill_value, self.config.infill_tol)
        {
            warn!(
                "Infill criterion value {} below {}: no more improvement expected",
                infill_value, self.config.infill_tol
            );
            info!("Consider solver has converged");
            return Err(EgoError::NoMorePointToAddError(Box::new(
                new_state.data((x_data, y_data)),
            )));
        }
        if !is_update_ok(&x_data, &x_next) {
            warn!("Reject {x_next} too close to previous points");
            info!("Consider solver has converged");
            return Err(EgoError::NoMorePointToAddError(Box::new(
                new_state.data((x_data, y_data)),
            )));
        }

        let x_new = x_next.insert_axis(Axis(0));
        let y_new = self.eval_obj(problem, &x_new)?;
        let added = update_data(&mut x_data, &mut y_data, &x_new, &y_new);
        new_state.added += added.len();
        info!("+{} point, total: {} points", added.len(), new_state.added);

        let best_index =
            find_best_result_index(&y_data, &self.config.cstr_kinds, self.config.cstr_tol);
        new_state.prev_best_index = new_state.best_index;
        new_state.best_index = Some(best_index);
        Ok(new_state
            .data((x_data, y_data))
            .param(x_new.row(0).to_owned())
            .cost(y_new.row(0).to_owned()))
    }
}
