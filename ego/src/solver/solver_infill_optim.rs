use crate::types::ConstraintKind;
use crate::utils::cstr_violation;
use crate::EgorSolver;

use cobyla::{minimize, RhoBeg, StopTols};
use egolearn_doe::{Lhs, SamplingMethod};
use egolearn_gp::GpSurrogate;
use log::debug;
use ndarray::{concatenate, Array1, Array2, ArrayView1, Axis};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use rayon::prelude::*;

/// Max number of criterion evaluations of one local refinement
pub(crate) const INFILL_MAX_EVAL: usize = 500;

/// Half width of the neighbourhood of doe points scanned as candidates
/// (in the unit hypercube)
const NEIGHBOURHOOD_STEP: f64 = 1e-2;

/// `a` is better than `b` when both are feasible and `a` has a greater criterion value,
/// otherwise when `a` is less infeasible. A score is a (value, violation) couple.
fn is_better((va, ca): (f64, f64), (vb, cb): (f64, f64)) -> bool {
    if ca == 0. && cb == 0. {
        va > vb
    } else {
        ca < cb
    }
}

impl EgorSolver {
    /// Sum of the constraint violations predicted by the constraint surrogates at `x`
    pub(crate) fn predicted_violation(
        &self,
        x: &Array1<f64>,
        cstr_models: &[Box<dyn GpSurrogate>],
    ) -> f64 {
        if cstr_models.is_empty() {
            return 0.;
        }
        let pt = x.view().insert_axis(Axis(0));
        let c: Array1<f64> = cstr_models
            .iter()
            .map(|model| model.predict(&pt).map_or(f64::NEG_INFINITY, |p| p[0]))
            .collect();
        let violation = cstr_violation(&c, &self.config.cstr_kinds, self.config.cstr_tol);
        if violation.is_nan() {
            f64::INFINITY
        } else {
            violation
        }
    }

    /// Find the most promising point by maximizing the chosen infill criterion
    /// where the constraint surrogates predict feasibility.
    ///
    /// Candidates (LHS and neighbourhood of the doe points) are scanned, then the
    /// best ones are refined with COBYLA. The search is done in the unit hypercube
    /// mapped onto `xlimits`.
    /// Returns (infill_value, x_opt)
    pub(crate) fn optimize_infill_criterion(
        &self,
        obj_model: &dyn GpSurrogate,
        cstr_models: &[Box<dyn GpSurrogate>],
        fmin: f64,
        x_data: &Array2<f64>,
        rng: &mut Xoshiro256Plus,
    ) -> (f64, Array1<f64>) {
        let nx = self.config.nx();
        let lower = self.config.xlimits.column(0).to_owned();
        let width = &self.config.xlimits.column(1) - &self.config.xlimits.column(0);
        let to_x = |u: &[f64]| -> Array1<f64> { &lower + &(&width * &ArrayView1::from(u)) };

        let score = |u: &[f64]| -> (f64, f64) {
            let x = to_x(u);
            let value = self
                .config
                .infill_criterion
                .value(&x.to_vec(), obj_model, fmin);
            let value = if value.is_nan() { f64::MIN } else { value };
            (value, self.predicted_violation(&x, cstr_models))
        };

        // Candidates
        let unit = Array2::from_shape_fn((nx, 2), |(_, j)| j as f64);
        let lhs_rng = Xoshiro256Plus::seed_from_u64(rng.gen());
        let sampled = Lhs::new(&unit)
            .with_rng(lhs_rng)
            .sample(self.config.n_candidates_value());
        let u_data = (x_data - &lower) / &width;
        let mut neighbours = Array2::zeros((2 * nx * u_data.nrows(), nx));
        let mut k = 0;
        for row in u_data.rows() {
            for d in 0..nx {
                for step in [-NEIGHBOURHOOD_STEP, NEIGHBOURHOOD_STEP] {
                    let mut u = neighbours.row_mut(k);
                    u.assign(&row);
                    u[d] = (u[d] + step).clamp(0., 1.);
                    k += 1;
                }
            }
        }
        let candidates = concatenate![Axis(0), sampled, neighbours];
        let scores: Vec<(f64, f64)> = (0..candidates.nrows())
            .into_par_iter()
            .map(|i| score(&candidates.row(i).to_vec()))
            .collect();

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&i, &j| {
            let (vi, ci) = scores[i];
            let (vj, cj) = scores[j];
            ci.total_cmp(&cj).then(vj.total_cmp(&vi))
        });
        let mut best = (scores[order[0]], candidates.row(order[0]).to_owned());
        debug!(
            "Best infill candidate {} (value={}, violation={})",
            to_x(&best.1.to_vec()),
            best.0 .0,
            best.0 .1
        );

        // Local refinements
        let obj = |u: &[f64], _: &mut ()| -> f64 {
            let value = self
                .config
                .infill_criterion
                .value(&to_x(u).to_vec(), obj_model, fmin);
            if value.is_finite() {
                -value
            } else {
                f64::INFINITY
            }
        };
        let mut bands = vec![];
        for (k, kind) in self.config.cstr_kinds.iter().enumerate() {
            match kind {
                ConstraintKind::Inequality => bands.push((k, 1., self.config.cstr_tol)),
                ConstraintKind::Equality { tol } => {
                    bands.push((k, 1., *tol));
                    bands.push((k, -1., *tol));
                }
            }
        }
        // cobyla constraints are feasible when positive
        let cstrs: Vec<_> = bands
            .iter()
            .map(|&(k, sign, offset)| {
                move |u: &[f64], _: &mut ()| -> f64 {
                    let x = to_x(u).insert_axis(Axis(0));
                    let c = cstr_models[k]
                        .predict(&x.view())
                        .map_or(f64::NEG_INFINITY, |p| p[0]);
                    sign * c + offset
                }
            })
            .collect();
        let bounds = vec![(0., 1.); nx];

        let refined: Vec<((f64, f64), Array1<f64>)> = order
            .iter()
            .take(self.config.n_start)
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|&i| {
                let u0 = candidates.row(i).to_vec();
                let res = minimize(
                    &obj,
                    &u0,
                    &bounds,
                    &cstrs,
                    (),
                    INFILL_MAX_EVAL,
                    RhoBeg::All(0.1),
                    Some(StopTols {
                        ftol_rel: 1e-8,
                        ..StopTols::default()
                    }),
                );
                let u_opt = match res {
                    Ok((_, u_opt, _)) => u_opt,
                    Err((status, u_opt, _)) => {
                        debug!("Cobyla stopped in infill optimization: {status:?}");
                        u_opt
                    }
                };
                let u_opt: Vec<f64> = u_opt.into_iter().map(|v| v.clamp(0., 1.)).collect();
                (score(&u_opt), Array1::from(u_opt))
            })
            .collect();

        for (s, u) in refined {
            if is_better(s, best.0) {
                best = (s, u);
            }
        }
        let ((value, violation), u_best) = best;
        let x_best = to_x(&u_best.to_vec());
        if violation > 0. {
            debug!("No predicted feasible point, take the least infeasible one");
        }
        debug!("Infill optimum {x_best} (value={value}, violation={violation})");
        (value, x_best)
    }
}
