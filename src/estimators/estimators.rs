use ndarray::{Array1, ArrayView1};

use super::error::{EstimatorError, Result};
use super::hyperparams::{LassoParams, LassoPathValidParams, LassoValidParams};
use super::traits::Fit;

use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix};
use crate::path::{lasso_path, ConvergenceWarning, LassoPath};
use crate::solvers::CelerSolver;
use crate::Float;

/// This implements the computation of a regularization path with the working
/// set solver, for dense and sparse design matrices.
impl<F, DM, T> Fit<DM, T, EstimatorError> for LassoPathValidParams<F>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    /// If successful, the output is a [`LassoPath`] holding one solution per
    /// value of the grid.
    type Object = LassoPath<F>;

    fn fit(&self, dataset: &DatasetBase<DM, T>) -> Result<Self::Object> {
        let solver = CelerSolver::new().K(self.K());
        lasso_path(dataset, self, &solver)
    }
}

/// The Lasso estimator
///
/// The Lasso estimator solves a regularized least-square regression problem
/// for a single value of `alpha`. The L1-regularization used yields sparse
/// solutions. Besides the coefficients, it exposes the dual point certifying
/// them and the duality gap and timing trajectories of the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Lasso<F: Float> {
    coefficients: Array1<F>,
    dual_point: Array1<F>,
    gaps: Array1<F>,
    times: Array1<f64>,
    warning: Option<ConvergenceWarning<F>>,
}

impl<F: Float> Lasso<F> {
    /// This method instantiates a Lasso estimator with default parameters
    /// for the working set solver.
    pub fn params() -> LassoParams<F> {
        LassoParams::new()
    }

    /// Extracts the only grid point of a one-element path.
    pub fn from_path(path: LassoPath<F>) -> Self {
        let LassoPath {
            coefficients,
            thetas,
            monitor,
            warnings,
            ..
        } = path;

        let (gaps, times) = monitor
            .and_then(|monitor| {
                let gaps = monitor.gaps.into_iter().next()?;
                let times = monitor.times.into_iter().next()?;
                Some((gaps, times))
            })
            .unwrap_or_default();

        Lasso {
            coefficients: coefficients.column(0).to_owned(),
            dual_point: thetas
                .map(|thetas| thetas.row(0).to_owned())
                .unwrap_or_default(),
            gaps,
            times,
            warning: warnings.into_iter().next(),
        }
    }

    /// This method is a getter for the coefficients vector.
    pub fn coefficients(&self) -> ArrayView1<F> {
        self.coefficients.view()
    }

    pub fn dual_point(&self) -> ArrayView1<F> {
        self.dual_point.view()
    }

    /// Duality gap at the end of each outer iteration of the solver.
    pub fn gaps(&self) -> ArrayView1<F> {
        self.gaps.view()
    }

    /// Seconds elapsed in the solver at the end of each outer iteration.
    pub fn times(&self) -> ArrayView1<f64> {
        self.times.view()
    }

    /// Present when the final duality gap exceeds the tolerance.
    pub fn warning(&self) -> Option<&ConvergenceWarning<F>> {
        self.warning.as_ref()
    }
}

/// This implements the working set optimization procedure for a single value
/// of `alpha`, for dense and sparse design matrices.
impl<F, DM, T> Fit<DM, T, EstimatorError> for LassoValidParams<F>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    /// If successful, the output of the solver is an instance of [`Lasso`]
    /// containing the fitted coefficients.
    type Object = Lasso<F>;

    fn fit(&self, dataset: &DatasetBase<DM, T>) -> Result<Self::Object> {
        let solver = CelerSolver::new().K(self.K());
        let path = lasso_path(dataset, &self.path_params(), &solver)?;
        Ok(Lasso::from_path(path))
    }
}
