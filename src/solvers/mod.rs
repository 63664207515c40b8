use ndarray::{Array1, ArrayView1};

use super::Float;
use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix};

pub mod celer;
pub mod dual;
pub mod utils;


pub use celer::CelerSolver;

/// Budgets and switches shared by every call of an inner solver along a
/// regularization path.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOptions<F> {
    /// Maximum number of outer iterations (working set definitions).
    pub max_iterations: usize,
    /// Number of coordinate descent epochs between two duality gap
    /// computations in the subproblem.
    pub gap_freq: usize,
    /// Maximum number of coordinate descent epochs on each subproblem.
    pub max_epochs: usize,
    /// The solver stops as soon as the duality gap goes below this value.
    pub tolerance: F,
    /// Extrapolates dual points from the last residuals.
    pub use_acceleration: bool,
    /// Sizes working sets from the current support instead of only growing
    /// them.
    pub prune: bool,
    pub verbose: bool,
    pub verbose_inner: bool,
}

impl<F: Float> Default for SolverOptions<F> {
    fn default() -> Self {
        SolverOptions {
            max_iterations: 20,
            gap_freq: 10,
            max_epochs: 50000,
            tolerance: F::cast(1e-6),
            use_acceleration: true,
            prune: false,
            verbose: false,
            verbose_inner: false,
        }
    }
}

/// The output of an inner solver for a single regularization value.
#[derive(Debug, Clone, PartialEq)]
pub struct InnerSolution<F> {
    pub coefficients: Array1<F>,
    pub dual_point: Array1<F>,
    /// Duality gap at the end of each outer iteration actually performed.
    pub gaps: Array1<F>,
    /// Seconds elapsed since entering the solver, at each outer iteration.
    pub times: Array1<f64>,
}

impl<F: Float> InnerSolution<F> {
    /// The last duality gap of the trajectory. An empty trajectory certifies
    /// nothing, hence an infinite gap.
    pub fn final_gap(&self) -> F {
        match self.gaps.len().checked_sub(1) {
            Some(last) => self.gaps[last],
            None => F::infinity(),
        }
    }
}

/// This trait is the contract between the path controller and the solver of
/// a single Lasso problem
///
/// ```ignore
/// 1 / (2 * n_samples) * ||y - X̃w||^2_2 + alpha * ||w||_1
/// ```
///
/// where `X̃` is the design matrix implicitly centered by `sparse_scaling`.
///
/// Implementations start from `w_init`, treat `ws_start_size` as an advisory
/// first working set size and never fail: when the budgets are exhausted they
/// return their best iterate and let the gap trajectory reveal the shortfall.
pub trait InnerSolver<F, DM, T>
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
    ) -> InnerSolution<F>;
}
