use lassopath::datasets::{CSCArray, DatasetBase, DenseDataset};
use lassopath::estimators::error::EstimatorError;
use lassopath::estimators::{Fit, Lasso};
use lassopath::helpers::helpers::count_nonzero;
use lassopath::helpers::test_helpers::{generate_random_data, to_csc_triplet};
use lassopath::path::LassoPath;
use ndarray::Axis;

fn main() -> Result<(), EstimatorError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (X, y) = generate_random_data(100, 500, 10);
    let dataset = DenseDataset::from((X.clone(), y.clone()));

    let path = LassoPath::params()
        .n_alphas(30)
        .eps(1e-2)
        .monitor(true)
        .verbose(true)
        .fit(&dataset)?;

    for (t, alpha) in path.alphas().iter().enumerate() {
        println!(
            "alpha={:.4e} nnz={:>3} gap={:.2e} time={:.2e}s",
            alpha,
            count_nonzero(&path.coefficients_at(t)),
            path.dual_gaps()[t],
            path.times()[t]
        );
    }
    println!("{} convergence warnings", path.warnings().len());

    // Same problem with a sparse design, centered on the fly
    let offset = X.mean_axis(Axis(0)).ok_or(EstimatorError::EmptyTargets)?;
    let (data, indices, indptr) = to_csc_triplet(X.view());
    let X_sparse = CSCArray::new(data.view(), indices.view(), indptr.view());
    let dataset_sparse = DatasetBase::from((X_sparse, y));

    let alpha = path.alphas()[path.n_alphas() / 2];
    let clf = Lasso::params()
        .alpha(alpha)
        .X_offset(offset)
        .fit(&dataset_sparse)?;
    println!(
        "centered sparse fit at alpha={:.4e}: nnz={}, {} outer iterations, final gap {:.2e}",
        alpha,
        count_nonzero(&clf.coefficients()),
        clf.gaps().len(),
        clf.gaps()[clf.gaps().len() - 1]
    );

    Ok(())
}
