use std::cmp::Ordering;

use ndarray::{Array1, ArrayView1};

use crate::datafits::Quadratic;
use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix};
use crate::helpers::helpers::argsort_by;
use crate::Float;

/// This function ranks the features by their distance to the boundary of the
/// dual feasible set, `d_j = (1 - |X̃_j^T theta|) / ||X̃_j||`. Features close
/// to the boundary are the most likely to be in the support of the solution.
/// Screened features and null columns get an infinite priority.
pub fn compute_priorities<F, DM, T>(
    dataset: &DatasetBase<DM, T>,
    datafit: &Quadratic<F>,
    theta: ArrayView1<F>,
    screened: &[bool],
) -> Array1<F>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    let theta_sum = theta.sum();
    let norms = datafit.norms();
    Array1::from_iter(screened.iter().enumerate().map(|(j, &is_screened)| {
        match is_screened || norms[j] == F::zero() {
            true => F::infinity(),
            false => (F::one() - datafit.xtv_j(dataset, theta, theta_sum, j).abs()) / norms[j],
        }
    }))
}

/// Size of the working set at outer iteration `t`.
///
/// The first working set holds at least `ws_start_size` features and every
/// feature of the initial support. Afterwards it doubles, unless pruning is
/// enabled in which case it is sized from the current support so that it can
/// shrink when features leave the support.
pub fn working_set_size(
    t: usize,
    ws_start_size: usize,
    nnz_features: usize,
    previous_size: usize,
    n_features: usize,
    prune: bool,
) -> usize {
    let ws_start_size = usize::max(ws_start_size, 1);
    let ws_size = if t == 0 {
        usize::max(ws_start_size, nnz_features)
    } else if prune {
        usize::max(ws_start_size, usize::min(2 * nnz_features, n_features))
    } else {
        2 * previous_size
    };
    usize::min(ws_size, n_features)
}

/// This function is used to construct a working set by sorting the features in
/// ascending order of priority. The `forced` features are always included
/// (unless screened), and features with an infinite priority never are. The
/// returned indices are sorted.
pub fn construct_working_set<F: Float>(
    prios: &mut Array1<F>,
    forced: &[usize],
    ws_size: usize,
) -> Vec<usize> {
    for &j in forced {
        if prios[j].is_finite() {
            prios[j] = -F::one();
        }
    }
    let n_candidates = prios.iter().filter(|p| p.is_finite()).count();

    let mut ws = argsort_by(prios, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    ws.truncate(usize::min(ws_size, n_candidates));
    ws.sort_unstable();
    ws
}
