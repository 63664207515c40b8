use std::cmp::Ordering;

use ndarray::{Array1, ArrayView1};

use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix};
use crate::estimators::error::{EstimatorError, Result};
use crate::helpers::helpers::compute_alpha_max;
use crate::Float;

/// Returns `n_alphas` values log-spaced from `alpha_max` down to
/// `eps * alpha_max`, both ends included.
pub fn logspace_grid<F: Float>(alpha_max: F, eps: F, n_alphas: usize) -> Array1<F> {
    let mut alphas = Array1::logspace(F::cast(10.), F::zero(), eps.log10(), n_alphas) * alpha_max;
    // Pin the first value: the null vector is the exact solution there
    if let Some(first) = alphas.first_mut() {
        *first = alpha_max;
    }
    alphas
}

/// Sorts a user-supplied grid in decreasing order.
pub fn sort_descending<F: Float>(alphas: ArrayView1<F>) -> Array1<F> {
    let mut sorted = alphas.to_vec();
    sorted.sort_unstable_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    Array1::from_vec(sorted)
}

/// Builds the default grid of a dataset from `alpha_max = max|X^T y| / n`.
/// The grid ignores any centering correction. A null `alpha_max` (e.g. null
/// targets) has no meaningful grid.
pub fn alpha_grid<F, DM, T>(dataset: &DatasetBase<DM, T>, eps: F, n_alphas: usize) -> Result<Array1<F>>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    let no_scaling = Array1::<F>::zeros(dataset.design_matrix().n_features());
    let alpha_max = compute_alpha_max(dataset, no_scaling.view())?;
    if alpha_max <= F::zero() || !alpha_max.is_finite() {
        return Err(EstimatorError::DegenerateGrid);
    }
    Ok(logspace_grid(alpha_max, eps, n_alphas))
}
