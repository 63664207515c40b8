use std::time::Instant;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use thiserror::Error;

use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix, DesignMatrixType};
use crate::estimators::error::{EstimatorError, Result};
use crate::estimators::hyperparams::{LassoPathParams, LassoPathValidParams};
use crate::helpers::helpers::count_nonzero;
use crate::solvers::{InnerSolver, SolverOptions};
use crate::Float;

pub mod grid;

#[cfg(test)]
mod tests;

/// The state carried from one grid point to the next: the coefficients used
/// as warm start and the size hint of the first working set.
#[derive(Debug, Clone, PartialEq)]
pub struct PathState<F> {
    coefficients: Array1<F>,
    ws_start_size: usize,
}

impl<F: Float> PathState<F> {
    /// State of the first grid point. A caller-supplied vector is used as warm
    /// start and its support is guaranteed to fit in the first working set.
    pub fn initial(n_features: usize, coef_init: Option<ArrayView1<F>>, p0: usize) -> Self {
        match coef_init {
            Some(coef) => PathState {
                coefficients: coef.to_owned(),
                ws_start_size: usize::max(count_nonzero(&coef), p0),
            },
            None => PathState {
                coefficients: Array1::zeros(n_features),
                ws_start_size: p0,
            },
        }
    }

    /// State following a solution: its support sizes the next working set.
    pub fn after(coefficients: &Array1<F>) -> Self {
        PathState {
            coefficients: coefficients.clone(),
            ws_start_size: usize::max(count_nonzero(coefficients), 1),
        }
    }

    /// A copy of the coefficients handed over to the inner solver.
    pub fn warm_start(&self) -> Array1<F> {
        self.coefficients.clone()
    }

    pub fn ws_start_size(&self) -> usize {
        self.ws_start_size
    }
}

/// Non-fatal diagnostic attached to a grid point whose final duality gap
/// exceeds the tolerance.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "Objective did not converge for alpha={alpha:.3e} (grid point {index}): duality gap \
     {gap:.3e} > tolerance {tolerance:.3e}. You might want to increase the number of \
     iterations. Fitting data with very small alpha may cause precision problems."
)]
pub struct ConvergenceWarning<F: Float> {
    pub index: usize,
    pub alpha: F,
    pub gap: F,
    pub tolerance: F,
}

/// Gap and timing trajectories of the inner solver for one grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<F> {
    pub gaps: Array1<F>,
    pub times: Array1<f64>,
}

/// The outcome of one grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionRecord<F: Float> {
    pub alpha: F,
    pub coefficients: Array1<F>,
    pub dual_point: Array1<F>,
    /// Last entry of the gap trajectory.
    pub gap: F,
    /// Wall time spent in the inner solver, in seconds.
    pub time: f64,
    /// Present when monitoring is enabled.
    pub trajectory: Option<Trajectory<F>>,
    pub warning: Option<ConvergenceWarning<F>>,
}

/// Sparse scaling vector: `X_offset / X_scale` for sparse design matrices,
/// zeros otherwise.
fn sparse_scaling<F, DM>(design_matrix: &DM, params: &LassoPathValidParams<F>) -> Result<Array1<F>>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
{
    let n_features = design_matrix.n_features();
    let offset = match params.X_offset() {
        None => return Ok(Array1::zeros(n_features)),
        Some(offset) => offset,
    };
    if offset.len() != n_features {
        return Err(EstimatorError::ShapeMismatch {
            name: "X_offset",
            expected: n_features,
            found: offset.len(),
        });
    }
    match design_matrix.matrix_type() {
        DesignMatrixType::Dense => {
            log::warn!("X_offset is ignored for dense design matrices, center the data instead.");
            Ok(Array1::zeros(n_features))
        }
        DesignMatrixType::Sparse => match params.X_scale() {
            None => Ok(offset.to_owned()),
            Some(scale) => Ok(&offset / &scale),
        },
    }
}

/// Lazily computes a regularization path, one grid point per call to
/// [`next`](Iterator::next).
///
/// The path state is threaded from one record to the next, hence grid points
/// are solved in order and never concurrently. Dropping the iterator stops the
/// path after the current grid point.
pub struct PathIter<'a, F, DM, T, S>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
    S: InnerSolver<F, DM, T>,
{
    dataset: &'a DatasetBase<DM, T>,
    solver: &'a S,
    alphas: Array1<F>,
    sparse_scaling: Array1<F>,
    options: SolverOptions<F>,
    monitor: bool,
    verbose: bool,
    state: PathState<F>,
    index: usize,
}

impl<'a, F, DM, T, S> PathIter<'a, F, DM, T, S>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
    S: InnerSolver<F, DM, T>,
{
    /// Validates the inputs against the dataset and derives the grid. No grid
    /// point is solved before the first call to `next`.
    pub fn new(
        dataset: &'a DatasetBase<DM, T>,
        params: &LassoPathValidParams<F>,
        solver: &'a S,
    ) -> Result<Self> {
        let n_features = dataset.design_matrix().n_features();
        let n_samples = dataset.targets().n_samples();
        if n_samples == 0 {
            return Err(EstimatorError::EmptyTargets);
        }
        let n_rows = dataset.design_matrix().n_samples();
        let rows_match = match dataset.design_matrix().matrix_type() {
            DesignMatrixType::Dense => n_rows == n_samples,
            DesignMatrixType::Sparse => n_rows <= n_samples,
        };
        if !rows_match {
            return Err(EstimatorError::ShapeMismatch {
                name: "targets",
                expected: n_rows,
                found: n_samples,
            });
        }
        if let Some(coef_init) = params.coef_init() {
            if coef_init.len() != n_features {
                return Err(EstimatorError::ShapeMismatch {
                    name: "coef_init",
                    expected: n_features,
                    found: coef_init.len(),
                });
            }
        }

        let sparse_scaling = sparse_scaling(dataset.design_matrix(), params)?;
        let alphas = match params.alphas() {
            Some(alphas) => grid::sort_descending(alphas),
            None => grid::alpha_grid(dataset, params.eps(), params.n_alphas())?,
        };

        Ok(PathIter {
            dataset,
            solver,
            alphas,
            sparse_scaling,
            options: params.solver_options(),
            monitor: params.monitor(),
            verbose: params.verbose(),
            state: PathState::initial(n_features, params.coef_init(), params.ws_start_size()),
            index: 0,
        })
    }

    /// The grid, in decreasing order.
    pub fn alphas(&self) -> ArrayView1<F> {
        self.alphas.view()
    }

    pub fn sparse_scaling(&self) -> ArrayView1<F> {
        self.sparse_scaling.view()
    }
}

impl<'a, F, DM, T, S> Iterator for PathIter<'a, F, DM, T, S>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
    S: InnerSolver<F, DM, T>,
{
    type Item = SolutionRecord<F>;

    fn next(&mut self) -> Option<Self::Item> {
        let t = self.index;
        let alpha = *self.alphas.get(t)?;
        let n_alphas = self.alphas.len();

        if self.verbose {
            log::info!("Computing alpha {}/{}: {:.3e}", t + 1, n_alphas, alpha);
        }

        let start = Instant::now();
        let solution = self.solver.solve(
            self.dataset,
            self.sparse_scaling.view(),
            alpha,
            self.state.warm_start(),
            self.state.ws_start_size(),
            &self.options,
        );
        let time = start.elapsed().as_secs_f64();

        let gap = solution.final_gap();
        let tolerance = self.options.tolerance;
        let warning = match gap > tolerance || gap.is_nan() {
            true => {
                let warning = ConvergenceWarning {
                    index: t,
                    alpha,
                    gap,
                    tolerance,
                };
                log::warn!("{}", warning);
                Some(warning)
            }
            false => None,
        };

        self.state = PathState::after(&solution.coefficients);
        self.index += 1;

        Some(SolutionRecord {
            alpha,
            gap,
            time,
            trajectory: match self.monitor {
                true => Some(Trajectory {
                    gaps: solution.gaps,
                    times: solution.times,
                }),
                false => None,
            },
            coefficients: solution.coefficients,
            dual_point: solution.dual_point,
            warning,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.alphas.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<'a, F, DM, T, S> ExactSizeIterator for PathIter<'a, F, DM, T, S>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
    S: InnerSolver<F, DM, T>,
{
}

/// Per grid point trajectories of the inner solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor<F> {
    pub gaps: Vec<Array1<F>>,
    pub times: Vec<Array1<f64>>,
}

/// A fitted Lasso regularization path
///
/// Column `t` of the coefficients solves the Lasso for the `t`-th value of the
/// (decreasing) grid.
#[derive(Debug, Clone, PartialEq)]
pub struct LassoPath<F: Float> {
    pub(crate) alphas: Array1<F>,
    pub(crate) coefficients: Array2<F>,
    pub(crate) dual_gaps: Array1<F>,
    pub(crate) times: Array1<f64>,
    pub(crate) thetas: Option<Array2<F>>,
    pub(crate) monitor: Option<Monitor<F>>,
    pub(crate) warnings: Vec<ConvergenceWarning<F>>,
}

impl<F: Float> LassoPath<F> {
    /// This method instantiates the path hyperparameters with their default
    /// values.
    pub fn params() -> LassoPathParams<F> {
        LassoPathParams::new()
    }

    /// Stacks the records of a path into parallel arrays indexed by grid
    /// position.
    pub fn from_records(
        records: Vec<SolutionRecord<F>>,
        n_features: usize,
        n_samples: usize,
        return_thetas: bool,
        monitor: bool,
    ) -> Self {
        let n_alphas = records.len();
        let mut coefficients = Array2::<F>::zeros((n_features, n_alphas));
        let mut thetas = match return_thetas {
            true => Some(Array2::<F>::zeros((n_alphas, n_samples))),
            false => None,
        };
        let mut trajectories = match monitor {
            true => Some(Monitor {
                gaps: Vec::with_capacity(n_alphas),
                times: Vec::with_capacity(n_alphas),
            }),
            false => None,
        };
        let mut warnings = Vec::new();

        for (t, record) in records.iter().enumerate() {
            coefficients.column_mut(t).assign(&record.coefficients);
            if let Some(thetas) = thetas.as_mut() {
                thetas.row_mut(t).assign(&record.dual_point);
            }
            if let (Some(trajectories), Some(trajectory)) =
                (trajectories.as_mut(), record.trajectory.as_ref())
            {
                trajectories.gaps.push(trajectory.gaps.clone());
                trajectories.times.push(trajectory.times.clone());
            }
            if let Some(warning) = record.warning.as_ref() {
                warnings.push(warning.clone());
            }
        }

        LassoPath {
            alphas: records.iter().map(|r| r.alpha).collect(),
            dual_gaps: records.iter().map(|r| r.gap).collect(),
            times: records.iter().map(|r| r.time).collect(),
            coefficients,
            thetas,
            monitor: trajectories,
            warnings,
        }
    }

    /// The grid, in decreasing order.
    pub fn alphas(&self) -> ArrayView1<F> {
        self.alphas.view()
    }

    /// Coefficients of shape `(n_features, n_alphas)`.
    pub fn coefficients(&self) -> ArrayView2<F> {
        self.coefficients.view()
    }

    /// Coefficients of the `t`-th grid point.
    pub fn coefficients_at(&self, t: usize) -> ArrayView1<F> {
        self.coefficients.index_axis(Axis(1), t)
    }

    /// Final duality gap of every grid point.
    pub fn dual_gaps(&self) -> ArrayView1<F> {
        self.dual_gaps.view()
    }

    /// Seconds spent in the inner solver for every grid point.
    pub fn times(&self) -> ArrayView1<f64> {
        self.times.view()
    }

    /// Dual points of shape `(n_alphas, n_samples)`, when requested.
    pub fn thetas(&self) -> Option<ArrayView2<F>> {
        self.thetas.as_ref().map(|thetas| thetas.view())
    }

    pub fn monitor(&self) -> Option<&Monitor<F>> {
        self.monitor.as_ref()
    }

    /// One warning per grid point whose final gap exceeds the tolerance.
    pub fn warnings(&self) -> &[ConvergenceWarning<F>] {
        &self.warnings
    }

    pub fn n_alphas(&self) -> usize {
        self.alphas.len()
    }
}

/// Computes the Lasso regularization path of a dataset with `solver`.
///
/// Inputs are validated before the first grid point is solved. Non-convergence
/// is reported through [`LassoPath::warnings`] and never stops the path.
pub fn lasso_path<F, DM, T, S>(
    dataset: &DatasetBase<DM, T>,
    params: &LassoPathValidParams<F>,
    solver: &S,
) -> Result<LassoPath<F>>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
    S: InnerSolver<F, DM, T>,
{
    let records: Vec<SolutionRecord<F>> = PathIter::new(dataset, params, solver)?.collect();
    Ok(LassoPath::from_records(
        records,
        dataset.design_matrix().n_features(),
        dataset.targets().n_samples(),
        params.return_thetas(),
        params.monitor(),
    ))
}
