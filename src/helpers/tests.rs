use ndarray::{array, Array1};

use super::helpers::*;
use super::prox::soft_thresholding;
use super::test_helpers::*;
use crate::datasets::{CSCArray, DatasetBase, DenseDataset};
use crate::estimators::error::EstimatorError;

#[test]
fn test_soft_thresholding() {
    assert_eq!(soft_thresholding(3.5, 1.), 2.5);
    assert_eq!(soft_thresholding(-3.5, 1.), -2.5);
    assert_eq!(soft_thresholding(0.7, 1.), 0.);
    assert_eq!(soft_thresholding(-1., 1.), 0.);
}

#[test]
fn test_compute_alpha_max() {
    let X = array![[1., 0.], [0., 1.], [1., 1.]];
    let y = array![1., 1., 2.];
    let dataset = DenseDataset::from((X, y));
    let alpha_max = compute_alpha_max(&dataset, Array1::zeros(2).view()).unwrap();
    assert_eq!(alpha_max, 1.);
}

#[test]
fn test_compute_alpha_max_sparse_matches_dense() {
    let (X, y) = generate_random_data(12, 20, 5);
    let (data, indices, indptr) = to_csc_triplet(X.view());
    let X_sparse = CSCArray::new(data.view(), indices.view(), indptr.view());
    let dataset_sparse = DatasetBase::from((X_sparse, y.clone()));
    let dataset = DenseDataset::from((X, y));

    let zeros = Array1::<f64>::zeros(20);
    let alpha_max = compute_alpha_max(&dataset, zeros.view()).unwrap();
    let alpha_max_sparse = compute_alpha_max(&dataset_sparse, zeros.view()).unwrap();
    approx::assert_abs_diff_eq!(alpha_max, alpha_max_sparse, epsilon = 1e-12);
}

#[test]
fn test_compute_alpha_max_with_centering() {
    // With a centering correction `c`, the effective columns are X_j - c_j.
    let X = array![[1., 0.], [0., 1.], [1., 1.]];
    let y = array![1., -1., 2.];
    let scaling = array![0.5, 0.];
    let dataset = DenseDataset::from((X, y));
    let alpha_max = compute_alpha_max(&dataset, scaling.view()).unwrap();
    // X_0 - 0.5 = [0.5, -0.5, 0.5] -> |X_0^T y| = 2; X_1^T y = 1
    approx::assert_abs_diff_eq!(alpha_max, 2. / 3., epsilon = 1e-12);
}

#[test]
fn test_compute_alpha_max_empty_design() {
    let X = Array1::<f64>::zeros(0).into_shape((3, 0)).unwrap();
    let y = array![1., 1., 2.];
    let dataset = DenseDataset::from((X, y));
    match compute_alpha_max(&dataset, Array1::zeros(0).view()) {
        Err(EstimatorError::EmptyDesignMatrix(_)) => (),
        other => panic!("Expected an empty design error, got {:?}", other),
    }
}

#[test]
fn test_count_nonzero() {
    assert_eq!(count_nonzero(&array![0., 1.2, 0., -3., 0.]), 2);
    assert_eq!(count_nonzero(&Array1::<f64>::zeros(4)), 0);
}

#[test]
fn test_argsort_by() {
    let arr = array![3., -1., 2.5, 0.];
    let indices = argsort_by(&arr, |a, b| a.partial_cmp(b).unwrap());
    assert_eq!(indices, vec![1, 3, 2, 0]);
}

#[test]
fn test_solve_lin_sys() {
    let A = array![[4., 1., 0.], [1., 3., 1.], [0., 1., 2.]];
    let b = array![1., 2., 3.];
    let x = solve_lin_sys(A.view(), b.view()).unwrap();
    assert_array_all_close(A.dot(&x).view(), b.view(), 1e-10);
}

#[test]
fn test_solve_lin_sys_singular() {
    let A = array![[1., 2.], [2., 4.]];
    let b = array![1., 1.];
    assert!(solve_lin_sys(A.view(), b.view()).is_err());
}
