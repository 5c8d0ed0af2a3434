//! Egor optimizer implements EGO algorithm with basic handling of constraints.
//!
//! ```no_run
//! # use ndarray::{array, Array2, ArrayView2, Zip};
//! # use egolearn_ego::{EgorBuilder, InfillStrategy};
//! use argmin_testfunctions::rosenbrock_ab as rosenbrock;
//!
//! // Rosenbrock test function: minimum y_opt = 0 at x_opt = (1, 1)
//! fn rosenb(x: &ArrayView2<f64>) -> Array2<f64> {
//!     let mut y: Array2<f64> = Array2::zeros((x.nrows(), 1));
//!     Zip::from(y.rows_mut())
//!         .and(x.rows())
//!         .par_for_each(|mut yi, xi| yi.assign(&array![rosenbrock(&xi.to_vec(), 1., 100.)]));
//!     y
//! }
//!
//! let xlimits = array![[-2., 2.], [-2., 2.]];
//! let res = EgorBuilder::optimize(rosenb)
//!     .configure(|config| {
//!         config
//!             .infill_strategy(InfillStrategy::EI)
//!             .n_doe(10)
//!             .target(1e-1)
//!             .max_iters(30)
//!     })
//!     .min_within(&xlimits)
//!     .expect("valid configuration")
//!     .run()
//!     .expect("Rosenbrock minimization");
//! println!("Rosenbrock min result = {:?}", res.y_opt);
//! ```
//!
//! Constraints are expected to be evaluated with the objective function
//! meaning that the function passed to the optimizer has to return
//! a matrix which rows consist of [obj, cstr_1, ..., cstr_n] values.
//! An inequality constraint is satisfied when its value is positive,
//! an equality constraint when its value is zero (up to its tolerance).
//! Constraints are declared with `n_cstr` or `cstr_kinds` setters.
//!
//! ```no_run
//! # use ndarray::{array, Array2, ArrayView1, ArrayView2, Zip};
//! # use egolearn_ego::EgorBuilder;
//!
//! // Function G24: 1 global optimum y_opt = -5.5080 at x_opt =(2.3295, 3.1785)
//! fn g24(x: &ArrayView1<f64>) -> f64 {
//!    -x[0] - x[1]
//! }
//!
//! // Constraints >= 0
//! fn g24_c1(x: &ArrayView1<f64>) -> f64 {
//!     2.0 * x[0].powf(4.0) - 8.0 * x[0].powf(3.0) + 8.0 * x[0].powf(2.0) - x[1] + 2.0
//! }
//!
//! fn g24_c2(x: &ArrayView1<f64>) -> f64 {
//!     4.0 * x[0].powf(4.0) - 32.0 * x[0].powf(3.0) + 88.0 * x[0].powf(2.0)
//!     - 96.0 * x[0] - x[1] + 36.0
//! }
//!
//! // Grouped function : objective + constraints
//! fn f_g24(x: &ArrayView2<f64>) -> Array2<f64> {
//!     let mut y = Array2::zeros((x.nrows(), 3));
//!     Zip::from(y.rows_mut())
//!         .and(x.rows())
//!         .for_each(|mut yi, xi| {
//!             yi.assign(&array![g24(&xi), g24_c1(&xi), g24_c2(&xi)]);
//!         });
//!     y
//! }
//!
//! let xlimits = array![[0., 3.], [0., 4.]];
//! let res = EgorBuilder::optimize(f_g24)
//!     .configure(|config| config.n_cstr(2).n_doe(10).max_iters(40).target(-5.5080))
//!     .min_within(&xlimits)
//!     .expect("valid configuration")
//!     .run()
//!     .expect("g24 minimized");
//! println!("G24 min result = {:?}", res.y_opt);
//! ```
//!
use crate::errors::{EgoError, Result};
use crate::types::*;
use crate::{EgorConfig, EgorSolver, EgorState};

use argmin::core::observers::{Observe, ObserverMode};
use argmin::core::{Error, Executor, State, KV};
use log::info;
use ndarray::{concatenate, Array2, ArrayBase, Axis, Data, Ix2};

/// Json filename for configuration
pub const CONFIG_FILE: &str = "egor_config.json";
/// Numpy filename for optimization history
pub const HISTORY_FILE: &str = "egor_history.npy";

/// EGO optimizer builder allowing to specify function to be minimized
/// subject to constraints intended to be positive.
pub struct EgorBuilder<O: GroupFunc> {
    fobj: O,
    config: EgorConfig,
}

impl<O: GroupFunc> EgorBuilder<O> {
    /// Function to be minimized domain should be basically R^nx -> R^ny
    /// where nx is the dimension of input x and ny the output dimension
    /// equal to 1 (obj) + n (cstrs).
    /// But function has to be able to evaluate several points in one go
    /// hence take an (p, nx) matrix and return an (p, ny) matrix
    pub fn optimize(fobj: O) -> Self {
        EgorBuilder {
            fobj,
            config: EgorConfig::default(),
        }
    }

    /// Set configuration of the optimizer
    pub fn configure<F: FnOnce(EgorConfig) -> EgorConfig>(mut self, init: F) -> Self {
        self.config = init(self.config);
        self
    }

    /// Build an Egor optimizer to minimize the function within
    /// the continuous `xlimits` specified as [[lower, upper], ...] array where the
    /// number of rows gives the dimension of the inputs
    /// and the ith row is the interval of the ith component of the input x.
    pub fn min_within(self, xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Egor<O>> {
        let config = self.config.xlimits(xlimits).check()?;
        Ok(Egor {
            fobj: ObjFunc::new(self.fobj),
            solver: EgorSolver::new(config),
        })
    }
}

/// Egor optimizer structure used to parameterize the underlying `argmin::Solver`
/// and trigger the optimization using `argmin::Executor`.
#[derive(Clone)]
pub struct Egor<O: GroupFunc> {
    fobj: ObjFunc<O>,
    solver: EgorSolver,
}

impl<O: GroupFunc> Egor<O> {
    /// Returns the underlying solver
    pub fn solver(&self) -> &EgorSolver {
        &self.solver
    }

    /// Runs the (constrained) optimization of the objective function.
    pub fn run(&self) -> Result<OptimResult<f64>> {
        let config = self.solver.config();
        info!("{:?}", config);
        if let Some(outdir) = config.outdir.as_ref() {
            std::fs::create_dir_all(outdir)?;
            let filepath = std::path::Path::new(outdir).join(CONFIG_FILE);
            let json = serde_json::to_string(config)?;
            std::fs::write(filepath, json)?;
        }

        let exec = Executor::new(self.fobj.clone(), self.solver.clone());
        let result = if let Some(outdir) = config.outdir.as_ref() {
            let hist = OptimizationObserver::new(outdir.clone());
            exec.add_observer(hist, ObserverMode::Always).run()?
        } else {
            exec.run()?
        };
        info!("{}", result);

        let mut state = result.state;
        let (x_data, y_data) = state
            .take_data()
            .ok_or_else(|| EgoError::InvalidValue("no data in final state".to_string()))?;
        let (x_opt, y_opt) = match (state.get_best_param(), state.get_full_best_cost()) {
            (Some(x), Some(y)) => (x.to_owned(), y.to_owned()),
            _ => {
                return Err(EgoError::InvalidValue(
                    "no best point in final state".to_string(),
                ))
            }
        };
        info!("Data: \n{}", concatenate![Axis(1), x_data, y_data]);
        info!("Optim Result: min f(x)={} at x={}", y_opt, x_opt);

        Ok(OptimResult {
            x_opt,
            y_opt,
            x_doe: x_data,
            y_doe: y_data,
            state,
        })
    }
}

// Collects best costs and params during the optimization execution
// saved as a numpy array [costs, params] at the end.
// Only registered when outdir is specified.
#[derive(Default)]
struct OptimizationObserver {
    dir: String,
    best_params: Option<Array2<f64>>,
    best_costs: Option<Array2<f64>>,
}

impl OptimizationObserver {
    fn new(dir: String) -> Self {
        Self {
            dir,
            best_params: None,
            best_costs: None,
        }
    }

    fn record(&mut self, state: &EgorState<f64>) {
        if let (Some(bp), Some(bc)) = (state.get_best_param(), state.get_full_best_cost()) {
            let bp = bp.to_owned().insert_axis(Axis(0));
            let bc = bc.to_owned().insert_axis(Axis(0));
            self.best_params = Some(match self.best_params.take() {
                Some(params) => concatenate![Axis(0), params, bp],
                None => bp,
            });
            self.best_costs = Some(match self.best_costs.take() {
                Some(costs) => concatenate![Axis(0), costs, bc],
                None => bc,
            });
        }
    }
}

impl Observe<EgorState<f64>> for OptimizationObserver {
    fn observe_init(
        &mut self,
        _name: &str,
        state: &EgorState<f64>,
        _kv: &KV,
    ) -> std::result::Result<(), Error> {
        self.record(state);
        Ok(())
    }

    fn observe_iter(&mut self, state: &EgorState<f64>, _kv: &KV) -> std::result::Result<(), Error> {
        self.record(state);
        Ok(())
    }

    fn observe_final(&mut self, _state: &EgorState<f64>) -> std::result::Result<(), Error> {
        if let (Some(costs), Some(params)) = (self.best_costs.take(), self.best_params.take()) {
            let hist = concatenate![Axis(1), costs, params];
            std::fs::create_dir_all(&self.dir)?;
            let filepath = std::path::Path::new(&self.dir).join(HISTORY_FILE);
            info!("Save history {:?} in {:?}", hist.shape(), filepath);
            ndarray_npy::write_npy(filepath, &hist)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_feasible, ConstraintKind, InfillStrategy};
    use approx::assert_abs_diff_eq;
    use argmin::core::TerminationReason;
    use egolearn_gp::MeanKind;
    use ndarray::{array, ArrayView1, ArrayView2, Zip};
    use ndarray_npy::read_npy;
    use ndarray_stats::QuantileExt;
    use serial_test::serial;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn xsinx(x: &ArrayView2<f64>) -> Array2<f64> {
        (x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())
    }

    #[test]
    #[serial]
    fn test_xsinx_ei_adds_one_point_per_iteration() {
        init_logger();
        let n_iter = 5;
        let initial_doe = array![[0.], [7.], [25.]];
        let res = EgorBuilder::optimize(xsinx)
            .configure(|cfg| {
                cfg.infill_strategy(InfillStrategy::EI)
                    .max_iters(n_iter)
                    .doe(&initial_doe)
                    .seed(42)
            })
            .min_within(&array![[0.0, 25.0]])
            .expect("valid configuration")
            .run()
            .expect("Egor should minimize xsinx");

        assert_eq!(res.x_doe.nrows(), initial_doe.nrows() + n_iter);
        assert_eq!(res.y_doe.nrows(), initial_doe.nrows() + n_iter);
        assert_eq!(res.state.get_iter(), n_iter as u64);
        let y_min = *res.y_doe.column(0).min().unwrap();
        assert_abs_diff_eq!(res.y_opt[0], y_min);
        let y_init_min = *xsinx(&initial_doe.view()).min().unwrap();
        assert!(y_min <= y_init_min);
    }

    #[test]
    #[serial]
    fn test_xsinx_egor_builder() {
        init_logger();
        let res = EgorBuilder::optimize(xsinx)
            .configure(|cfg| cfg.max_iters(20).doe(&array![[0.], [7.], [25.]]).seed(0))
            .min_within(&array![[0.0, 25.0]])
            .expect("valid configuration")
            .run()
            .expect("Egor should minimize xsinx");
        assert_abs_diff_eq!(array![-15.1], res.y_opt, epsilon = 0.5);
        assert_abs_diff_eq!(array![18.9], res.x_opt, epsilon = 0.5);
    }

    #[test]
    #[serial]
    fn test_xsinx_lcb_egor_builder() {
        init_logger();
        let res = EgorBuilder::optimize(xsinx)
            .configure(|cfg| {
                cfg.infill_strategy(InfillStrategy::LCB { k: 3. })
                    .max_iters(20)
                    .seed(1)
            })
            .min_within(&array![[0.0, 25.0]])
            .expect("valid configuration")
            .run()
            .expect("Egor should minimize xsinx");
        assert_abs_diff_eq!(array![-15.1], res.y_opt, epsilon = 1.);
    }

    #[test]
    #[serial]
    fn test_target_stops_optimization() {
        init_logger();
        let res = EgorBuilder::optimize(xsinx)
            .configure(|cfg| {
                cfg.max_iters(30)
                    .doe(&array![[0.], [7.], [25.]])
                    .target(0.)
                    .seed(42)
            })
            .min_within(&array![[0.0, 25.0]])
            .expect("valid configuration")
            .run()
            .expect("Egor should minimize xsinx");
        assert_eq!(
            res.state.get_termination_reason(),
            Some(&TerminationReason::TargetCostReached)
        );
        assert!(res.y_opt[0] <= 0.);
    }

    #[test]
    #[serial]
    fn test_stagnation_stops_optimization() {
        init_logger();
        let initial_doe = array![[0.], [7.], [25.]];
        let res = EgorBuilder::optimize(xsinx)
            .configure(|cfg| cfg.max_iters(10).doe(&initial_doe).infill_tol(1e10).seed(42))
            .min_within(&array![[0.0, 25.0]])
            .expect("valid configuration")
            .run()
            .expect("Egor should stop without error");
        assert_eq!(
            res.state.get_termination_reason(),
            Some(&TerminationReason::SolverConverged)
        );
        assert_eq!(res.x_doe.nrows(), initial_doe.nrows());
    }

    #[test]
    #[serial]
    fn test_invalid_doe_is_rejected() {
        let res = EgorBuilder::optimize(xsinx)
            .configure(|cfg| cfg.doe(&Array2::zeros((0, 1))))
            .min_within(&array![[0.0, 25.0]]);
        assert!(matches!(res, Err(EgoError::InvalidConfigError(_))));
    }

    #[test]
    #[serial]
    fn test_history_saved_in_outdir() {
        init_logger();
        let outdir = "target/test_egor_outdir";
        let _ = std::fs::remove_dir_all(outdir);
        let n_iter = 3;
        let initial_doe = array![[0.], [7.], [25.]];
        EgorBuilder::optimize(xsinx)
            .configure(|cfg| {
                cfg.max_iters(n_iter)
                    .doe(&initial_doe)
                    .seed(42)
                    .outdir(outdir)
            })
            .min_within(&array![[0.0, 25.0]])
            .expect("valid configuration")
            .run()
            .expect("Egor should minimize xsinx");

        let json = std::fs::read_to_string(format!("{outdir}/{CONFIG_FILE}"))
            .expect("configuration saved");
        let config: crate::ValidEgorConfig =
            serde_json::from_str(&json).expect("configuration read back");
        assert_eq!(config.nx(), 1);
        let hist: Array2<f64> =
            read_npy(format!("{outdir}/{HISTORY_FILE}")).expect("history saved");
        assert_eq!(hist.ncols(), 2);
        assert!(hist.nrows() >= 2);
        // best costs never increase
        for i in 1..hist.nrows() {
            assert!(hist[[i, 0]] <= hist[[i - 1, 0]]);
        }
    }

    // Function G24: 1 global optimum y_opt = -5.5080 at x_opt =(2.3295, 3.1785)
    fn g24(x: &ArrayView1<f64>) -> f64 {
        -x[0] - x[1]
    }

    fn g24_c1(x: &ArrayView1<f64>) -> f64 {
        2.0 * x[0].powf(4.0) - 8.0 * x[0].powf(3.0) + 8.0 * x[0].powf(2.0) - x[1] + 2.0
    }

    fn g24_c2(x: &ArrayView1<f64>) -> f64 {
        4.0 * x[0].powf(4.0) - 32.0 * x[0].powf(3.0) + 88.0 * x[0].powf(2.0) - 96.0 * x[0]
            - x[1]
            + 36.0
    }

    fn f_g24(x: &ArrayView2<f64>) -> Array2<f64> {
        let mut y = Array2::zeros((x.nrows(), 3));
        Zip::from(y.rows_mut()).and(x.rows()).for_each(|mut yi, xi| {
            yi.assign(&array![g24(&xi), g24_c1(&xi), g24_c2(&xi)]);
        });
        y
    }

    #[test]
    #[serial]
    fn test_sego_g24() {
        init_logger();
        let res = EgorBuilder::optimize(f_g24)
            .configure(|cfg| cfg.n_cstr(2).n_doe(10).max_iters(40).seed(42))
            .min_within(&array![[0., 3.], [0., 4.]])
            .expect("valid configuration")
            .run()
            .expect("Egor should minimize g24");
        let kinds = [ConstraintKind::Inequality, ConstraintKind::Inequality];
        assert!(is_feasible(&res.y_opt.slice(ndarray::s![1..]), &kinds, 1e-6));
        assert!(res.y_opt[0] < -5.0, "y_opt = {}", res.y_opt);
    }

    fn sphere_on_line(x: &ArrayView2<f64>) -> Array2<f64> {
        let mut y = Array2::zeros((x.nrows(), 2));
        Zip::from(y.rows_mut()).and(x.rows()).for_each(|mut yi, xi| {
            yi.assign(&array![xi[0] * xi[0] + xi[1] * xi[1], xi[0] + xi[1] - 1.]);
        });
        y
    }

    #[test]
    #[serial]
    fn test_sego_equality_constraint() {
        init_logger();
        let tol = 1e-3;
        let res = EgorBuilder::optimize(sphere_on_line)
            .configure(|cfg| {
                cfg.cstr_kinds(&[ConstraintKind::Equality { tol }])
                    .mean(MeanKind::Linear)
                    .n_doe(10)
                    .max_iters(20)
                    .seed(42)
            })
            .min_within(&array![[-1., 2.], [-1., 2.]])
            .expect("valid configuration")
            .run()
            .expect("Egor should minimize under equality constraint");
        assert!(res.y_opt[1].abs() <= tol, "c = {}", res.y_opt[1]);
        assert_abs_diff_eq!(res.y_opt[0], 0.5, epsilon = 0.05);
    }
}
