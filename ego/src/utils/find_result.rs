use crate::types::ConstraintKind;
use ndarray::{s, Array1, ArrayBase, Data, Ix1, Ix2, Zip};
use ndarray_stats::QuantileExt;

/// Sum of the constraint violations of `c` given the constraint kinds.
///
/// Inequality constraints are violated when `c < -cstr_tol`, equality
/// constraints when `|c| > tol`. A NaN value is infinitely violated.
pub fn cstr_violation(
    c: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    cstr_kinds: &[ConstraintKind],
    cstr_tol: f64,
) -> f64 {
    c.iter()
        .zip(cstr_kinds)
        .map(|(&c, kind)| match kind {
            _ if c.is_nan() => f64::INFINITY,
            ConstraintKind::Inequality => (-cstr_tol - c).max(0.),
            ConstraintKind::Equality { tol } => (c.abs() - tol).max(0.),
        })
        .sum()
}

/// Whether the constraint values `c` satisfy their feasibility relation
pub fn is_feasible(
    c: &ArrayBase<impl Data<Elem = f64>, Ix1>,
    cstr_kinds: &[ConstraintKind],
    cstr_tol: f64,
) -> bool {
    cstr_violation(c, cstr_kinds, cstr_tol) == 0.
}

/// Find best (eg minimal) cost value (y_data\[0\]) with valid constraints.
///
/// y_data containing ns samples [objective, cstr_1, ... cstr_nc] is given as a matrix (ns, nc + 1).
/// When no point is feasible, the point with the least constraint violation is returned.
pub fn find_best_result_index(
    y_data: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    cstr_kinds: &[ConstraintKind],
    cstr_tol: f64,
) -> usize {
    let violations: Array1<f64> = y_data
        .rows()
        .into_iter()
        .map(|row| cstr_violation(&row.slice(s![1..]), cstr_kinds, cstr_tol))
        .collect();
    match violations.argmin() {
        // no feasible point, take the least violating one
        Ok(index) if violations[index] > 0. => index,
        Ok(_) => {
            let feasible_obj = Zip::from(y_data.column(0))
                .and(&violations)
                .map_collect(|&y, &v| match (v == 0., y.is_nan()) {
                    (true, false) => y,
                    (true, true) => f64::MAX,
                    (false, _) => f64::INFINITY,
                });
            feasible_obj.argmin().unwrap_or(0)
        }
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_cstr_violation() {
        let kinds = [
            ConstraintKind::Inequality,
            ConstraintKind::Equality { tol: 0.1 },
        ];
        assert_abs_diff_eq!(cstr_violation(&array![1., 0.05], &kinds, 0.), 0.);
        assert_abs_diff_eq!(cstr_violation(&array![-1e-7, 0.], &kinds, 1e-6), 0.);
        assert_abs_diff_eq!(
            cstr_violation(&array![-2., -0.3], &kinds, 0.),
            2.2,
            epsilon = 1e-12
        );
        assert!(!is_feasible(&array![1., 0.2], &kinds, 0.));
        assert_eq!(cstr_violation(&array![f64::NAN, 0.], &kinds, 0.), f64::INFINITY);
    }

    #[test]
    fn test_find_best_unconstrained() {
        let ydata = array![[1.], [-2.], [0.], [-2.5], [3.]];
        assert_eq!(find_best_result_index(&ydata, &[], 1e-6), 3);
    }

    #[test]
    fn test_find_best_feasible_first() {
        let kinds = [ConstraintKind::Inequality];
        let ydata = array![[-10., -1.], [2., 0.5], [1., 0.1], [-5., -0.2]];
        assert_eq!(find_best_result_index(&ydata, &kinds, 1e-6), 2);
        let ydata = array![[-10., -1.], [f64::NAN, 0.5], [1., f64::NAN]];
        assert_eq!(find_best_result_index(&ydata, &kinds, 1e-6), 1);
    }

    #[test]
    fn test_find_best_least_violation() {
        let kinds = [ConstraintKind::Inequality, ConstraintKind::equality()];
        let ydata = array![[-10., -1., 0.], [2., -0.5, 0.], [1., -0.1, 0.6]];
        assert_eq!(find_best_result_index(&ydata, &kinds, 1e-6), 1);
    }
}
