use std::cell::RefCell;

use ndarray::{array, Array1, ArrayView1};

use super::*;
use crate::datasets::{CSCArray, DenseDataset};
use crate::estimators::{LassoPathParams, ParamGuard};
use crate::helpers::helpers::compute_alpha_max;
use crate::helpers::test_helpers::*;
use crate::solvers::{CelerSolver, InnerSolution};

#[derive(Debug, Clone)]
struct Call {
    alpha: f64,
    w_init: Array1<f64>,
    ws_start_size: usize,
    sparse_scaling: Array1<f64>,
}

/// Solver returning `support[t]` ones at call `t` and the final gap
/// `gaps[t]`, recording what the path hands over to it.
struct RecordingSolver {
    support: Vec<usize>,
    gaps: Vec<f64>,
    calls: RefCell<Vec<Call>>,
}

impl RecordingSolver {
    fn new(support: Vec<usize>, gaps: Vec<f64>) -> Self {
        RecordingSolver {
            support,
            gaps,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl<DM, T> InnerSolver<f64, DM, T> for RecordingSolver
where
    DM: DesignMatrix<Elem = f64>,
    T: AsSingleTargets<Elem = f64>,
{
    fn solve(
        &self,
        dataset: &DatasetBase<DM, T>,
        sparse_scaling: ArrayView1<f64>,
        alpha: f64,
        w_init: Array1<f64>,
        ws_start_size: usize,
        _options: &SolverOptions<f64>,
    ) -> InnerSolution<f64> {
        let t = self.calls.borrow().len();
        self.calls.borrow_mut().push(Call {
            alpha,
            w_init: w_init.clone(),
            ws_start_size,
            sparse_scaling: sparse_scaling.to_owned(),
        });

        let n_features = dataset.design_matrix().n_features();
        let support = self.support.get(t).copied().unwrap_or(0);
        let coefficients = Array1::from_shape_fn(n_features, |j| if j < support { 1. } else { 0. });
        let gap = self.gaps.get(t).copied().unwrap_or(0.);
        InnerSolution {
            coefficients,
            dual_point: Array1::from_elem(dataset.targets().n_samples(), alpha),
            gaps: array![10. * gap + 1., gap],
            times: array![0., 0.],
        }
    }
}

fn dataset() -> DenseDataset<f64> {
    let (X, y) = generate_random_data(8, 6, 3);
    DenseDataset::from((X, y))
}

#[test]
fn test_path_state() {
    let state = PathState::<f64>::initial(4, None, 10);
    assert_eq!(state.warm_start(), Array1::zeros(4));
    assert_eq!(state.ws_start_size(), 10);

    let coef = array![1., 0., -2., 0.];
    let state = PathState::initial(4, Some(coef.view()), 1);
    assert_eq!(state.warm_start(), coef);
    assert_eq!(state.ws_start_size(), 2);

    let state = PathState::after(&Array1::<f64>::zeros(4));
    assert_eq!(state.ws_start_size(), 1);

    let state = PathState::after(&array![0., 3., 1., 0.]);
    assert_eq!(state.warm_start(), array![0., 3., 1., 0.]);
    assert_eq!(state.ws_start_size(), 2);
}

#[test]
fn test_warm_start_propagation() {
    let dataset = dataset();
    let params = LassoPathParams::new()
        .alphas(array![1., 0.5, 0.25, 0.125])
        .ws_start_size(3)
        .check()
        .unwrap();
    let solver = RecordingSolver::new(vec![0, 2, 5, 6], vec![]);

    let path = lasso_path(&dataset, &params, &solver).unwrap();
    let calls = solver.calls();

    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0].w_init, Array1::zeros(6));
    assert_eq!(calls[0].ws_start_size, 3);
    // hint = max(nnz(previous solution), 1)
    assert_eq!(calls[1].ws_start_size, 1);
    assert_eq!(calls[2].ws_start_size, 2);
    assert_eq!(calls[3].ws_start_size, 5);
    for t in 1..4 {
        assert_eq!(calls[t].w_init, path.coefficients_at(t - 1));
    }
}

#[test]
fn test_coef_init() {
    let dataset = dataset();
    let coef_init = array![0., 1.5, 0., -0.5, 2., 0.];

    let params = LassoPathParams::new()
        .alphas(array![1., 0.5])
        .coef_init(coef_init.clone())
        .ws_start_size(1)
        .check()
        .unwrap();
    let solver = RecordingSolver::new(vec![4, 4], vec![]);
    lasso_path(&dataset, &params, &solver).unwrap();
    let calls = solver.calls();
    assert_eq!(calls[0].w_init, coef_init);
    assert_eq!(calls[0].ws_start_size, 3);

    let params = LassoPathParams::new()
        .alphas(array![1.])
        .coef_init(coef_init)
        .ws_start_size(5)
        .check()
        .unwrap();
    let solver = RecordingSolver::new(vec![], vec![]);
    lasso_path(&dataset, &params, &solver).unwrap();
    assert_eq!(solver.calls()[0].ws_start_size, 5);
}

#[test]
fn test_coef_init_shape_mismatch() {
    let dataset = dataset();
    let params = LassoPathParams::new()
        .coef_init(array![1., 2.])
        .check()
        .unwrap();
    let solver = RecordingSolver::new(vec![], vec![]);
    let err = lasso_path(&dataset, &params, &solver).unwrap_err();
    assert_eq!(
        err,
        EstimatorError::ShapeMismatch {
            name: "coef_init",
            expected: 6,
            found: 2
        }
    );
    assert!(solver.calls().is_empty());
}

#[test]
fn test_supplied_grid_is_sorted() {
    let dataset = dataset();
    let params = LassoPathParams::new()
        .alphas(array![0.01, 0.5, 0.1])
        .check()
        .unwrap();
    let solver = RecordingSolver::new(vec![], vec![]);

    let path = lasso_path(&dataset, &params, &solver).unwrap();

    assert_eq!(path.alphas(), array![0.5, 0.1, 0.01]);
    let alphas: Vec<f64> = solver.calls().iter().map(|c| c.alpha).collect();
    assert_eq!(alphas, vec![0.5, 0.1, 0.01]);
}

#[test]
fn test_auto_grid() {
    let dataset = dataset();
    let params = LassoPathParams::new()
        .n_alphas(5)
        .eps(1e-2)
        .check()
        .unwrap();
    let solver = RecordingSolver::new(vec![], vec![]);

    let path = lasso_path(&dataset, &params, &solver).unwrap();
    let alpha_max = compute_alpha_max(&dataset, Array1::zeros(6).view()).unwrap();

    assert_eq!(path.n_alphas(), 5);
    assert_eq!(path.alphas()[0], alpha_max);
    approx::assert_relative_eq!(path.alphas()[4], 1e-2 * alpha_max, max_relative = 1e-12);
    for t in 1..5 {
        approx::assert_relative_eq!(
            path.alphas()[t] / path.alphas()[t - 1],
            10f64.powf(-0.5),
            max_relative = 1e-12
        );
    }
}

#[test]
fn test_logspace_grid() {
    let grid = grid::logspace_grid(2., 1e-3, 4);
    assert_array_all_close(grid.view(), array![2., 0.2, 0.02, 0.002].view(), 1e-12);

    let grid = grid::logspace_grid(2., 1e-3, 1);
    assert_eq!(grid, array![2.]);
}

#[test]
fn test_degenerate_auto_grid() {
    let (X, _) = generate_random_data(8, 6, 3);
    let dataset = DenseDataset::from((X, Array1::zeros(8)));
    let params = LassoPathParams::new().check().unwrap();
    let solver = RecordingSolver::new(vec![], vec![]);

    let err = lasso_path(&dataset, &params, &solver).unwrap_err();
    assert_eq!(err, EstimatorError::DegenerateGrid);
    assert!(solver.calls().is_empty());

    let params = LassoPathParams::new().alphas(array![1., 0.1]).check().unwrap();
    let path = lasso_path(&dataset, &params, &solver).unwrap();
    assert_eq!(path.n_alphas(), 2);
}

#[test]
fn test_auto_grid_ignores_centering() {
    let X = array![[1., 0.], [0., 1.], [3., 2.]];
    let y = array![1., 2., 4.];
    let (data, indices, indptr) = to_csc_triplet(X.view());
    let X_sparse = CSCArray::new(data.view(), indices.view(), indptr.view());
    let dataset = DatasetBase::from((X_sparse, y));

    let params = LassoPathParams::new()
        .n_alphas(3)
        .X_offset(array![4. / 3., 1.])
        .X_scale(array![1., 1.])
        .check()
        .unwrap();
    let solver = RecordingSolver::new(vec![], vec![]);
    let path = lasso_path(&dataset, &params, &solver).unwrap();

    // max(|X^T y|) / n = max(13, 10) / 3, not the centered 11 / 9
    approx::assert_relative_eq!(path.alphas()[0], 13. / 3., max_relative = 1e-12);
    assert_array_all_close(
        solver.calls()[0].sparse_scaling.view(),
        array![4. / 3., 1.].view(),
        1e-12,
    );
}

#[test]
fn test_targets_shape_mismatch() {
    let X = array![[1., 0.], [0., 1.], [3., 2.]];
    let dataset = DenseDataset::from((X.clone(), array![1., 2., 4., 0.]));
    let params = LassoPathParams::new().check().unwrap();
    let solver = RecordingSolver::new(vec![], vec![]);

    let err = lasso_path(&dataset, &params, &solver).unwrap_err();
    assert_eq!(
        err,
        EstimatorError::ShapeMismatch {
            name: "targets",
            expected: 3,
            found: 4
        }
    );
    assert!(solver.calls().is_empty());

    // trailing all-zero rows of a sparse matrix are not stored
    let (data, indices, indptr) = to_csc_triplet(X.view());
    let X_sparse = CSCArray::new(data.view(), indices.view(), indptr.view());
    let dataset = DatasetBase::from((X_sparse.clone(), array![1., 2., 4., 0.]));
    assert!(lasso_path(&dataset, &params, &solver).is_ok());

    let dataset = DatasetBase::from((X_sparse, array![1., 2.]));
    let err = lasso_path(&dataset, &params, &solver).unwrap_err();
    assert_eq!(
        err,
        EstimatorError::ShapeMismatch {
            name: "targets",
            expected: 3,
            found: 2
        }
    );
    assert_eq!(solver.calls().len(), params.n_alphas());
}

#[test]
fn test_one_warning_per_non_converged_point() {
    let dataset = dataset();
    let params = LassoPathParams::new()
        .alphas(array![1., 0.5, 0.25, 0.125])
        .tolerance(1e-4)
        .check()
        .unwrap();
    let solver = RecordingSolver::new(vec![], vec![0., 1e-2, 1e-5, 3.]);

    let path = lasso_path(&dataset, &params, &solver).unwrap();

    assert_eq!(path.n_alphas(), 4);
    assert_eq!(path.coefficients().shape(), &[6, 4]);
    assert_eq!(path.dual_gaps(), array![0., 1e-2, 1e-5, 3.]);

    let warnings = path.warnings();
    assert_eq!(warnings.len(), 2);
    assert_eq!(
        warnings[0],
        ConvergenceWarning {
            index: 1,
            alpha: 0.5,
            gap: 1e-2,
            tolerance: 1e-4
        }
    );
    assert_eq!(warnings[1].index, 3);
    assert_eq!(warnings[1].alpha, 0.125);
}

#[test]
fn test_optional_outputs() {
    let dataset = dataset();
    let solver = RecordingSolver::new(vec![], vec![]);

    let params = LassoPathParams::new()
        .alphas(array![1., 0.5])
        .check()
        .unwrap();
    let path = lasso_path(&dataset, &params, &solver).unwrap();
    assert!(path.thetas().is_none());
    assert!(path.monitor().is_none());
    assert_eq!(path.times().len(), 2);

    let params = LassoPathParams::new()
        .alphas(array![1., 0.5])
        .return_thetas(true)
        .check()
        .unwrap();
    let path = lasso_path(&dataset, &params, &solver).unwrap();
    let thetas = path.thetas().unwrap();
    assert_eq!(thetas.shape(), &[2, 8]);
    assert_eq!(thetas.row(1), Array1::from_elem(8, 0.5));
    assert!(path.monitor().is_none());

    let params = LassoPathParams::new()
        .alphas(array![1., 0.5])
        .monitor(true)
        .check()
        .unwrap();
    let path = lasso_path(&dataset, &params, &solver).unwrap();
    assert!(path.thetas().is_none());
    let monitor = path.monitor().unwrap();
    assert_eq!(monitor.gaps.len(), 2);
    assert_eq!(monitor.times.len(), 2);
    assert_eq!(monitor.gaps[0], array![1., 0.]);
}

#[test]
fn test_sparse_scaling_only_for_sparse_matrices() {
    let X = array![[1., 0.], [0., 2.], [3., 0.]];
    let y = array![1., -1., 2.];
    let (data, indices, indptr) = to_csc_triplet(X.view());
    let X_sparse = CSCArray::new(data.view(), indices.view(), indptr.view());
    let dataset = DenseDataset::from((X, y.clone()));
    let dataset_sparse = DatasetBase::from((X_sparse, y));

    let params = LassoPathParams::new()
        .alphas(array![0.1])
        .X_offset(array![1., 2. / 3.])
        .X_scale(array![2., 4.])
        .check()
        .unwrap();

    let solver = RecordingSolver::new(vec![], vec![]);
    lasso_path(&dataset_sparse, &params, &solver).unwrap();
    lasso_path(&dataset, &params, &solver).unwrap();
    let calls = solver.calls();
    assert_array_all_close(
        calls[0].sparse_scaling.view(),
        array![0.5, 1. / 6.].view(),
        1e-12,
    );
    assert_eq!(calls[1].sparse_scaling, Array1::zeros(2));

    let params = LassoPathParams::new()
        .alphas(array![0.1])
        .X_offset(array![1., 2. / 3.])
        .check()
        .unwrap();
    let solver = RecordingSolver::new(vec![], vec![]);
    lasso_path(&dataset_sparse, &params, &solver).unwrap();
    assert_eq!(solver.calls()[0].sparse_scaling, array![1., 2. / 3.]);

    let params = LassoPathParams::new()
        .alphas(array![0.1])
        .X_offset(array![1., 2., 3.])
        .check()
        .unwrap();
    assert!(matches!(
        lasso_path(&dataset_sparse, &params, &solver),
        Err(EstimatorError::ShapeMismatch { name: "X_offset", .. })
    ));
}

#[test]
fn test_path_iter_stops_early() {
    let dataset = dataset();
    let params = LassoPathParams::new().n_alphas(10).check().unwrap();
    let solver = RecordingSolver::new(vec![], vec![]);

    let iter = PathIter::new(&dataset, &params, &solver).unwrap();
    assert_eq!(iter.len(), 10);
    assert!(solver.calls().is_empty());

    let records: Vec<_> = iter.take(2).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(solver.calls().len(), 2);
}

#[test]
fn test_reference_scenario() {
    let X = array![[1., 0.], [0., 1.], [1., 1.]];
    let y = array![1., 1., 2.];
    let dataset = DenseDataset::from((X, y));
    let alpha_max = compute_alpha_max(&dataset, Array1::zeros(2).view()).unwrap();
    assert_eq!(alpha_max, 1.);

    let params = LassoPathParams::new()
        .alphas(array![alpha_max / 2.])
        .tolerance(1e-8)
        .check()
        .unwrap();
    let path = lasso_path(&dataset, &params, &CelerSolver::new()).unwrap();

    assert!(path.dual_gaps()[0] <= 1e-8);
    assert!(path.warnings().is_empty());
    assert_array_all_close(path.coefficients_at(0), array![0.5, 0.5].view(), 1e-6);
}

#[test]
fn test_null_targets_give_null_coefficients() {
    let (X, _) = generate_random_data(10, 5, 2);
    let dataset = DenseDataset::from((X, Array1::zeros(10)));
    let params = LassoPathParams::new()
        .alphas(array![1., 0.1, 1e-3])
        .check()
        .unwrap();
    let path = lasso_path(&dataset, &params, &CelerSolver::new()).unwrap();

    assert_eq!(path.coefficients(), Array2::<f64>::zeros((5, 3)));
    assert!(path.warnings().is_empty());
}

#[test]
fn test_first_solution_of_auto_grid_is_null() {
    let (X, y) = generate_random_data(20, 15, 4);
    let dataset = DenseDataset::from((X, y));
    let params = LassoPathParams::new()
        .n_alphas(10)
        .tolerance(1e-8)
        .return_thetas(true)
        .check()
        .unwrap();
    let path = lasso_path(&dataset, &params, &CelerSolver::new()).unwrap();

    assert_eq!(path.coefficients_at(0), Array1::<f64>::zeros(15));
    assert!(count_nonzero(&path.coefficients_at(9)) > 0);
    assert!(path.warnings().is_empty());
    assert!(path.dual_gaps().iter().all(|&gap| gap <= 1e-8));
}

#[test]
fn test_path_is_deterministic() {
    let (X, y) = generate_random_data(20, 30, 5);
    let dataset = DenseDataset::from((X, y));
    let params = LassoPathParams::new()
        .n_alphas(8)
        .eps(1e-2)
        .return_thetas(true)
        .check()
        .unwrap();

    let first = lasso_path(&dataset, &params, &CelerSolver::new()).unwrap();
    let second = lasso_path(&dataset, &params, &CelerSolver::new()).unwrap();

    assert_eq!(first.alphas(), second.alphas());
    assert_eq!(first.coefficients(), second.coefficients());
    assert_eq!(first.dual_gaps(), second.dual_gaps());
    assert_eq!(first.thetas(), second.thetas());
}

#[test]
fn test_sparse_path_matches_centered_dense_path() {
    let X = array![
        [1., 0., 4., 0.],
        [0., 0., 5., 2.],
        [2., 3., 0., 0.],
        [0., 1., 0., -1.],
        [3., 0., 1., 0.],
        [0., 2., 0., 1.]
    ];
    let y = array![1., 3., 2., -1., 0.5, 1.5];
    let offset = X.mean_axis(Axis(0)).unwrap();
    let X_centered = &X - &offset.view().insert_axis(Axis(0));
    let (data, indices, indptr) = to_csc_triplet(X.view());
    let X_sparse = CSCArray::new(data.view(), indices.view(), indptr.view());

    let dataset = DenseDataset::from((X_centered, y.clone()));
    let dataset_sparse = DatasetBase::from((X_sparse, y));

    let params = LassoPathParams::new()
        .alphas(array![0.5, 0.2, 0.1, 0.05, 0.01])
        .tolerance(1e-12);
    let sparse_params = params.clone().X_offset(offset).check().unwrap();
    let params = params.check().unwrap();

    let path = lasso_path(&dataset, &params, &CelerSolver::new()).unwrap();
    let path_sparse = lasso_path(&dataset_sparse, &sparse_params, &CelerSolver::new()).unwrap();

    assert_array_all_close(path.alphas(), path_sparse.alphas(), 1e-12);
    assert_array2d_all_close(path.coefficients(), path_sparse.coefficients(), 1e-6);
}
