use std::time::Instant;

use ndarray::{Array1, ArrayView1};

use super::dual::{dual_value, rescale_dual_point, DualExtrapolator};
use super::utils::{compute_priorities, construct_working_set, working_set_size};
use super::{InnerSolution, InnerSolver, SolverOptions};
use crate::datafits::Quadratic;
use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix};
use crate::helpers::helpers::count_nonzero;
use crate::penalties::L1;
use crate::Float;

/// Working set solver for the Lasso with dual extrapolation
///
/// The solver cycles through nested loops. The outer loop builds a working set
/// from the features closest to the boundary of the dual feasible set,
/// discards the features that gap-safe screening proves inactive and doubles
/// the working set until the duality gap reaches the tolerance. The inner loop
/// runs coordinate descent on the subproblem restricted to the working set,
/// monitored with dual points built from (Anderson-extrapolated) residuals.
///
/// Reference: `https://arxiv.org/abs/1802.07481`
#[derive(Debug, Clone, PartialEq)]
pub struct CelerSolver {
    K: usize,
}

impl Default for CelerSolver {
    fn default() -> Self {
        CelerSolver { K: 5 }
    }
}

impl CelerSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of residuals used for dual extrapolation.
    ///
    /// Defaults to `5` if not set.
    pub fn K(mut self, K: usize) -> Self {
        self.K = K;
        self
    }
}

impl<F, DM, T> InnerSolver<F, DM, T> for CelerSolver
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    fn solve(
        &self,
        dataset: &DatasetBase<DM, T>,
        sparse_scaling: ArrayView1<F>,
        alpha: F,
        w_init: Array1<F>,
        ws_start_size: usize,
        options: &SolverOptions<F>,
    ) -> InnerSolution<F> {
        celer(
            dataset,
            sparse_scaling,
            alpha,
            w_init,
            ws_start_size,
            options,
            self.K,
        )
    }
}

/// Cycles once through the features of the working set, updating the weights
/// and the residuals in place.
pub fn cd_epoch<F, DM, T>(
    dataset: &DatasetBase<DM, T>,
    datafit: &Quadratic<F>,
    penalty: &L1<F>,
    w: &mut Array1<F>,
    R: &mut Array1<F>,
    R_sum: &mut F,
    ws: &[usize],
) where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    let lipschitz = datafit.lipschitz();
    for &j in ws {
        match lipschitz[j] == F::zero() {
            true => continue,
            false => {
                let old_w_j = w[j];
                let grad_j = datafit.gradient_j(dataset, R.view(), *R_sum, j);
                w[j] = penalty.prox(old_w_j - grad_j / lipschitz[j], F::one() / lipschitz[j]);

                let diff = w[j] - old_w_j;
                if diff != F::zero() {
                    datafit.update_residuals(dataset, R, R_sum, diff, j);
                }
            }
        }
    }
}

/// Runs coordinate descent on the subproblem restricted to `ws` until its
/// duality gap goes below `tol_inner` or `max_epochs` is reached. Returns the
/// best dual point found for the subproblem.
#[allow(clippy::too_many_arguments)]
pub fn solve_subproblem<F, DM, T>(
    dataset: &DatasetBase<DM, T>,
    datafit: &Quadratic<F>,
    penalty: &L1<F>,
    w: &mut Array1<F>,
    R: &mut Array1<F>,
    R_sum: &mut F,
    ws: &[usize],
    tol_inner: F,
    options: &SolverOptions<F>,
    K: usize,
) -> Array1<F>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    let y = dataset.targets().as_single_target();
    let alpha = penalty.alpha();
    let n_alpha = F::cast(y.len()) * alpha;
    let gap_freq = usize::max(options.gap_freq, 1);

    let mut extrapolator = DualExtrapolator::new(K);
    let mut theta_inner = Array1::<F>::zeros(y.len());
    let mut d_obj_inner = F::zero();

    for epoch in 0..options.max_epochs {
        cd_epoch(dataset, datafit, penalty, w, R, R_sum, ws);

        if epoch % gap_freq == 0 {
            let theta_res = rescale_dual_point(dataset, datafit, R.view(), n_alpha, ws);
            let d_obj_res = dual_value(alpha, y, theta_res.view());
            if d_obj_res > d_obj_inner {
                d_obj_inner = d_obj_res;
                theta_inner = theta_res;
            }

            if options.use_acceleration {
                extrapolator.push(R.view());
                if let Some(R_acc) = extrapolator.extrapolate() {
                    let theta_acc = rescale_dual_point(dataset, datafit, R_acc.view(), n_alpha, ws);
                    let d_obj_acc = dual_value(alpha, y, theta_acc.view());
                    if d_obj_acc > d_obj_inner {
                        d_obj_inner = d_obj_acc;
                        theta_inner = theta_acc;
                    }
                }
            }

            let p_obj = datafit.value(R.view()) + penalty.value(w.view());
            let gap_inner = p_obj - d_obj_inner;

            if options.verbose_inner {
                log::debug!(
                    "Epoch {}, primal {:.10e}, gap: {:.2e}",
                    epoch + 1,
                    p_obj,
                    gap_inner
                );
            }
            if gap_inner < tol_inner {
                if options.verbose_inner {
                    log::debug!("Inner: early exit at epoch {}.", epoch + 1);
                }
                break;
            }
        }
    }

    theta_inner
}

/// Solves the Lasso for a single regularization value `alpha`, starting from
/// `w_init`.
///
/// The duality gap and the elapsed time are recorded at the end of every outer
/// iteration. When `w_init` is already optimal up to `options.tolerance`, the
/// trajectories hold the single initial gap.
pub fn celer<F, DM, T>(
    dataset: &DatasetBase<DM, T>,
    sparse_scaling: ArrayView1<F>,
    alpha: F,
    w_init: Array1<F>,
    ws_start_size: usize,
    options: &SolverOptions<F>,
    K: usize,
) -> InnerSolution<F>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    let start = Instant::now();
    let y = dataset.targets().as_single_target();
    let n_samples = F::cast(y.len());
    let n_features = dataset.design_matrix().n_features();
    let tol = options.tolerance;

    // Pre-computes the Lipschitz constants and the norms of the (implicitly
    // centered) columns used in the optimization procedure.
    let mut datafit = Quadratic::new();
    datafit.initialize(dataset, sparse_scaling);
    let penalty = L1::new(alpha);

    let all_feats: Vec<usize> = (0..n_features).collect();
    let mut w = w_init;
    let (mut R, mut R_sum) = datafit.residuals(dataset, w.view());

    let mut theta = rescale_dual_point(dataset, &datafit, R.view(), n_samples * alpha, &all_feats);
    let mut d_obj = dual_value(alpha, y, theta.view());
    let mut p_obj = datafit.value(R.view()) + penalty.value(w.view());
    let mut gap = p_obj - d_obj;

    let mut gaps = Vec::<F>::new();
    let mut times = Vec::<f64>::new();

    if gap <= tol {
        if options.verbose {
            log::info!("Initial point is optimal, gap: {:.2e} <= {:.2e}", gap, tol);
        }
        gaps.push(gap);
        times.push(start.elapsed().as_secs_f64());
    }

    let mut screened = vec![false; n_features];
    let mut ws: Vec<usize> = Vec::new();

    // Outer loop in charge of constructing the working set
    for t in 0..options.max_iterations {
        if gap <= tol {
            break;
        }

        // Gap-safe screening: features whose priority exceeds the radius of the
        // safe sphere are inactive at the optimum.
        let radius = (F::cast(2.) * gap.max(F::zero()) / n_samples).sqrt() / alpha;
        let mut prios = compute_priorities(dataset, &datafit, theta.view(), &screened);
        for j in 0..n_features {
            if !screened[j] && prios[j] > radius {
                screened[j] = true;
                prios[j] = F::infinity();
                if w[j] != F::zero() {
                    datafit.update_residuals(dataset, &mut R, &mut R_sum, -w[j], j);
                    w[j] = F::zero();
                }
            }
        }

        let ws_size = working_set_size(
            t,
            ws_start_size,
            count_nonzero(&w),
            ws.len(),
            n_features,
            options.prune,
        );
        let forced: Vec<usize> = match t == 0 || options.prune {
            true => (0..n_features).filter(|&j| w[j] != F::zero()).collect(),
            false => ws.clone(),
        };
        ws = construct_working_set(&mut prios, &forced, ws_size);

        let mut candidates = vec![rescale_dual_point(
            dataset,
            &datafit,
            R.view(),
            n_samples * alpha,
            &all_feats,
        )];

        if !ws.is_empty() {
            let n_unscreened = screened.iter().filter(|&&s| !s).count();
            let tol_inner = match ws.len() == n_unscreened {
                true => tol,
                false => F::cast(0.3) * gap,
            };

            if options.verbose {
                log::info!("Iteration {}, {} features in subproblem.", t + 1, ws.len());
            }

            let theta_inner = solve_subproblem(
                dataset,
                &datafit,
                &penalty,
                &mut w,
                &mut R,
                &mut R_sum,
                &ws,
                tol_inner,
                options,
                K,
            );

            candidates[0] =
                rescale_dual_point(dataset, &datafit, R.view(), n_samples * alpha, &all_feats);
            candidates.push(rescale_dual_point(
                dataset,
                &datafit,
                theta_inner.view(),
                F::one(),
                &all_feats,
            ));
        }

        // The dual objective never decreases: the previous dual point stays
        // feasible and is only replaced by a better one.
        for candidate in candidates {
            let d_obj_candidate = dual_value(alpha, y, candidate.view());
            if d_obj_candidate > d_obj {
                d_obj = d_obj_candidate;
                theta = candidate;
            }
        }

        p_obj = datafit.value(R.view()) + penalty.value(w.view());
        gap = p_obj - d_obj;
        gaps.push(gap);
        times.push(start.elapsed().as_secs_f64());

        if options.verbose {
            log::info!(
                "Iteration {}, primal {:.10e}, gap: {:.2e}",
                t + 1,
                p_obj,
                gap
            );
        }
        if gap <= tol {
            if options.verbose {
                log::info!("Early exit, gap: {:.2e} <= {:.2e}", gap, tol);
            }
            break;
        }
        if ws.is_empty() {
            break;
        }
    }

    if gaps.is_empty() {
        gaps.push(gap);
        times.push(start.elapsed().as_secs_f64());
    }

    InnerSolution {
        coefficients: w,
        dual_point: theta,
        gaps: Array1::from_vec(gaps),
        times: Array1::from_vec(times),
    }
}
