use ndarray::{Array1, ArrayView1};

use super::error::{EstimatorError, Result};
use super::param_guard::ParamGuard;
use super::Float;
use crate::solvers::SolverOptions;

fn to_f32<F: Float>(x: F) -> f32 {
    x.to_f32().unwrap_or(f32::NAN)
}

/// Checks shared by the path and the single-alpha hyperparameters.
fn check_solver_options<F: Float>(
    options: &SolverOptions<F>,
    ws_start_size: usize,
    X_offset: Option<&Array1<F>>,
    X_scale: Option<&Array1<F>>,
) -> Result<()> {
    if options.tolerance.is_negative() || !options.tolerance.is_finite() {
        return Err(EstimatorError::InvalidTolerance(to_f32(options.tolerance)));
    }
    if options.max_iterations == 0 {
        return Err(EstimatorError::InvalidMaxIterations(options.max_iterations));
    }
    if options.gap_freq == 0 {
        return Err(EstimatorError::InvalidGapFreq(options.gap_freq));
    }
    if options.max_epochs == 0 {
        return Err(EstimatorError::InvalidMaxEpochs(options.max_epochs));
    }
    if ws_start_size == 0 {
        return Err(EstimatorError::InvalidWsStartSize(ws_start_size));
    }
    if let Some(scale) = X_scale {
        if let Some(j) = scale.iter().position(|s| *s == F::zero() || !s.is_finite()) {
            return Err(EstimatorError::InvalidScale(j));
        }
        if let Some(offset) = X_offset {
            if offset.len() != scale.len() {
                return Err(EstimatorError::ShapeMismatch {
                    name: "X_scale",
                    expected: offset.len(),
                    found: scale.len(),
                });
            }
        }
    }
    Ok(())
}

/// A verified hyperparameter set ready for the computation of a Lasso
/// regularization path
#[derive(Debug, Clone, PartialEq)]
pub struct LassoPathValidParams<F> {
    eps: F,
    n_alphas: usize,
    alphas: Option<Array1<F>>,
    coef_init: Option<Array1<F>>,
    ws_start_size: usize,
    K: usize,
    return_thetas: bool,
    monitor: bool,
    X_offset: Option<Array1<F>>,
    X_scale: Option<Array1<F>>,
    options: SolverOptions<F>,
}

impl<F: Float> LassoPathValidParams<F> {
    pub fn eps(&self) -> F {
        self.eps
    }

    pub fn n_alphas(&self) -> usize {
        self.n_alphas
    }

    pub fn alphas(&self) -> Option<ArrayView1<F>> {
        self.alphas.as_ref().map(|alphas| alphas.view())
    }

    pub fn coef_init(&self) -> Option<ArrayView1<F>> {
        self.coef_init.as_ref().map(|coef| coef.view())
    }

    pub fn max_iterations(&self) -> usize {
        self.options.max_iterations
    }

    pub fn gap_freq(&self) -> usize {
        self.options.gap_freq
    }

    pub fn max_epochs(&self) -> usize {
        self.options.max_epochs
    }

    pub fn ws_start_size(&self) -> usize {
        self.ws_start_size
    }

    pub fn tolerance(&self) -> F {
        self.options.tolerance
    }

    pub fn K(&self) -> usize {
        self.K
    }

    pub fn use_acceleration(&self) -> bool {
        self.options.use_acceleration
    }

    pub fn prune(&self) -> bool {
        self.options.prune
    }

    pub fn return_thetas(&self) -> bool {
        self.return_thetas
    }

    pub fn monitor(&self) -> bool {
        self.monitor
    }

    pub fn verbose(&self) -> bool {
        self.options.verbose
    }

    pub fn verbose_inner(&self) -> bool {
        self.options.verbose_inner
    }

    pub fn X_offset(&self) -> Option<ArrayView1<F>> {
        self.X_offset.as_ref().map(|offset| offset.view())
    }

    pub fn X_scale(&self) -> Option<ArrayView1<F>> {
        self.X_scale.as_ref().map(|scale| scale.view())
    }

    /// The budgets and switches forwarded to the inner solver on every grid
    /// point.
    pub fn solver_options(&self) -> SolverOptions<F> {
        self.options.clone()
    }
}

/// A hyper-parameter set during construction
///
/// Configures the computation of the solutions of
/// ```ignore
/// 1 / (2 * n_samples) * ||y - Xw||^2_2
///     + alpha * ||w||_1
/// ```
/// over a decreasing grid of `alpha` values.
#[derive(Debug, Clone, PartialEq)]
pub struct LassoPathParams<F>(LassoPathValidParams<F>);

impl<F: Float> Default for LassoPathParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Configure and compute a Lasso regularization path
impl<F: Float> LassoPathParams<F> {
    /// Create default path hyper parameters
    pub fn new() -> LassoPathParams<F> {
        Self(LassoPathValidParams {
            eps: F::cast(1e-3),
            n_alphas: 100,
            alphas: None,
            coef_init: None,
            ws_start_size: 10,
            K: 5,
            return_thetas: false,
            monitor: false,
            X_offset: None,
            X_scale: None,
            options: SolverOptions::default(),
        })
    }

    /// Set the length of the path: `alpha_min = eps * alpha_max`.
    /// Defaults to `1e-3` if not set.
    ///
    /// The default grid needs `alpha_max = max|X^T y| / n_samples > 0`: with
    /// null targets (or null columns) fitting fails with
    /// [`EstimatorError::DegenerateGrid`]. Pass an explicit grid through
    /// [`alphas`](Self::alphas) to fit such a dataset.
    pub fn eps(mut self, eps: F) -> Self {
        self.0.eps = eps;
        self
    }

    /// Set the number of values in the default grid, see [`eps`](Self::eps)
    /// for when it can be built. Defaults to `100` if not set.
    pub fn n_alphas(mut self, n_alphas: usize) -> Self {
        self.0.n_alphas = n_alphas;
        self
    }

    /// Set an explicit grid, which overrides `eps` and `n_alphas`. It is
    /// processed in decreasing order.
    pub fn alphas(mut self, alphas: Array1<F>) -> Self {
        self.0.alphas = Some(alphas);
        self
    }

    /// Set the warm start of the first grid point.
    /// Defaults to the null vector if not set.
    pub fn coef_init(mut self, coef_init: Array1<F>) -> Self {
        self.0.coef_init = Some(coef_init);
        self
    }

    /// Set the maximum number of iterations in the outer loop used to build
    /// working sets.
    /// Defaults to `20` if not set.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.0.options.max_iterations = max_iterations;
        self
    }

    /// Set the number of epochs between two duality gap computations in the
    /// inner loop.
    /// Defaults to `10` if not set.
    pub fn gap_freq(mut self, gap_freq: usize) -> Self {
        self.0.options.gap_freq = gap_freq;
        self
    }

    /// Set the maximum number of epochs in the inner loop during the descent
    /// routine.
    /// Defaults to `50000` if not set.
    pub fn max_epochs(mut self, max_epochs: usize) -> Self {
        self.0.options.max_epochs = max_epochs;
        self
    }

    /// Set the initial working set size.
    ///
    /// Defaults to `10` if not set.
    pub fn ws_start_size(mut self, ws_start_size: usize) -> Self {
        self.0.ws_start_size = ws_start_size;
        self
    }

    /// Set the stopping criterion for the optimization routine (duality gap).
    ///
    /// Defaults to `1e-6` if not set.
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.options.tolerance = tolerance;
        self
    }

    /// Set the number of points used for dual extrapolation.
    ///
    /// Defaults to `5` if not set.
    pub fn K(mut self, K: usize) -> Self {
        self.0.K = K;
        self
    }

    /// Enables the use of Anderson extrapolation of the residuals to build
    /// dual points.
    /// Defaults to `true` if not set.
    pub fn use_acceleration(mut self, use_acceleration: bool) -> Self {
        self.0.options.use_acceleration = use_acceleration;
        self
    }

    /// Sizes working sets from the current support, letting them shrink.
    ///
    /// Defaults to `false` if not set.
    pub fn prune(mut self, prune: bool) -> Self {
        self.0.options.prune = prune;
        self
    }

    /// Keeps the dual point of every grid point.
    ///
    /// Defaults to `false` if not set.
    pub fn return_thetas(mut self, return_thetas: bool) -> Self {
        self.0.return_thetas = return_thetas;
        self
    }

    /// Keeps the gap and timing trajectories of the inner solver for every
    /// grid point.
    /// Defaults to `false` if not set.
    pub fn monitor(mut self, monitor: bool) -> Self {
        self.0.monitor = monitor;
        self
    }

    /// Sets the verbosity level of the path and of the outer loop.
    ///
    /// Defaults to `false` if not set.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.0.options.verbose = verbose;
        self
    }

    /// Sets the verbosity level of the inner loop.
    ///
    /// Defaults to `false` if not set.
    pub fn verbose_inner(mut self, verbose_inner: bool) -> Self {
        self.0.options.verbose_inner = verbose_inner;
        self
    }

    /// Set the feature means of a sparse design matrix, to solve the Lasso as
    /// if it was centered.
    pub fn X_offset(mut self, X_offset: Array1<F>) -> Self {
        self.0.X_offset = Some(X_offset);
        self
    }

    /// Set the feature scales matching `X_offset`.
    /// Defaults to ones if not set.
    pub fn X_scale(mut self, X_scale: Array1<F>) -> Self {
        self.0.X_scale = Some(X_scale);
        self
    }
}

impl<F: Float> ParamGuard for LassoPathParams<F> {
    type Checked = LassoPathValidParams<F>;
    type Error = EstimatorError;

    /// Validate the hyper parameters
    fn check_ref(&self) -> Result<&Self::Checked> {
        match self.0.alphas.as_ref() {
            Some(alphas) => {
                if alphas.is_empty() {
                    return Err(EstimatorError::EmptyAlphas);
                }
                if let Some(alpha) = alphas.iter().find(|a| **a <= F::zero() || !a.is_finite()) {
                    return Err(EstimatorError::InvalidRegularization(to_f32(*alpha)));
                }
            }
            None => {
                if self.0.eps <= F::zero() || self.0.eps > F::one() || !self.0.eps.is_finite() {
                    return Err(EstimatorError::InvalidEps(to_f32(self.0.eps)));
                }
                if self.0.n_alphas == 0 {
                    return Err(EstimatorError::InvalidNAlphas(self.0.n_alphas));
                }
            }
        }
        check_solver_options(
            &self.0.options,
            self.0.ws_start_size,
            self.0.X_offset.as_ref(),
            self.0.X_scale.as_ref(),
        )?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// A verified hyperparameter set ready for the fitting of a Lasso regression model
#[derive(Debug, Clone, PartialEq)]
pub struct LassoValidParams<F> {
    alpha: F,
    w_init: Option<Array1<F>>,
    ws_start_size: usize,
    K: usize,
    X_offset: Option<Array1<F>>,
    X_scale: Option<Array1<F>>,
    options: SolverOptions<F>,
}

impl<F: Float> LassoValidParams<F> {
    pub fn alpha(&self) -> F {
        self.alpha
    }

    pub fn w_init(&self) -> Option<ArrayView1<F>> {
        self.w_init.as_ref().map(|w| w.view())
    }

    pub fn max_iterations(&self) -> usize {
        self.options.max_iterations
    }

    pub fn max_epochs(&self) -> usize {
        self.options.max_epochs
    }

    pub fn ws_start_size(&self) -> usize {
        self.ws_start_size
    }

    pub fn tolerance(&self) -> F {
        self.options.tolerance
    }

    pub fn K(&self) -> usize {
        self.K
    }

    /// The one-element path these hyperparameters specialize: dual points and
    /// monitoring are forced on.
    pub fn path_params(&self) -> LassoPathValidParams<F> {
        LassoPathValidParams {
            eps: F::cast(1e-3),
            n_alphas: 1,
            alphas: Some(Array1::from_elem(1, self.alpha)),
            coef_init: self.w_init.clone(),
            ws_start_size: self.ws_start_size,
            K: self.K,
            return_thetas: true,
            monitor: true,
            X_offset: self.X_offset.clone(),
            X_scale: self.X_scale.clone(),
            options: self.options.clone(),
        }
    }
}

/// A hyper-parameter set during construction
///
/// Configures and minimizes the following objective function:
/// ```ignore
/// 1 / (2 * n_samples) * ||y - Xw||^2_2
///     + alpha * ||w||_1
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LassoParams<F>(LassoValidParams<F>);

impl<F: Float> Default for LassoParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// Configure and fit a Lasso model
impl<F: Float> LassoParams<F> {
    /// Create default Lasso hyper parameters
    pub fn new() -> LassoParams<F> {
        Self(LassoValidParams {
            alpha: F::one(),
            w_init: None,
            ws_start_size: 10,
            K: 5,
            X_offset: None,
            X_scale: None,
            options: SolverOptions {
                max_iterations: 100,
                ..SolverOptions::default()
            },
        })
    }

    /// Set the regularization hyperparameter. A higher value yields sparser
    /// solutions.
    /// Defaults to `1` if not set.
    pub fn alpha(mut self, alpha: F) -> Self {
        self.0.alpha = alpha;
        self
    }

    /// Set the starting point of the solver.
    /// Defaults to the null vector if not set.
    pub fn w_init(mut self, w_init: Array1<F>) -> Self {
        self.0.w_init = Some(w_init);
        self
    }

    /// Set the maximum number of iterations in the outer loop used to build
    /// working sets.
    /// Defaults to `100` if not set.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.0.options.max_iterations = max_iterations;
        self
    }

    /// Set the number of epochs between two duality gap computations.
    /// Defaults to `10` if not set.
    pub fn gap_freq(mut self, gap_freq: usize) -> Self {
        self.0.options.gap_freq = gap_freq;
        self
    }

    /// Set the maximum number of epochs in the inner loop during the descent
    /// routine.
    /// Defaults to `50000` if not set.
    pub fn max_epochs(mut self, max_epochs: usize) -> Self {
        self.0.options.max_epochs = max_epochs;
        self
    }

    /// Set the initial working set size.
    ///
    /// Defaults to `10` if not set.
    pub fn ws_start_size(mut self, ws_start_size: usize) -> Self {
        self.0.ws_start_size = ws_start_size;
        self
    }

    /// Set the stopping criterion for the optimization routine (duality gap).
    ///
    /// Defaults to `1e-6` if not set.
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.0.options.tolerance = tolerance;
        self
    }

    /// Set the number of points used for dual extrapolation.
    ///
    /// Defaults to `5` if not set.
    pub fn K(mut self, K: usize) -> Self {
        self.0.K = K;
        self
    }

    /// Enables the use of Anderson extrapolation of the residuals to build
    /// dual points.
    /// Defaults to `true` if not set.
    pub fn use_acceleration(mut self, use_acceleration: bool) -> Self {
        self.0.options.use_acceleration = use_acceleration;
        self
    }

    /// Defaults to `false` if not set.
    pub fn prune(mut self, prune: bool) -> Self {
        self.0.options.prune = prune;
        self
    }

    /// Sets the verbosity level of the solver.
    ///
    /// Defaults to `false` if not set.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.0.options.verbose = verbose;
        self
    }

    /// Defaults to `false` if not set.
    pub fn verbose_inner(mut self, verbose_inner: bool) -> Self {
        self.0.options.verbose_inner = verbose_inner;
        self
    }

    pub fn X_offset(mut self, X_offset: Array1<F>) -> Self {
        self.0.X_offset = Some(X_offset);
        self
    }

    pub fn X_scale(mut self, X_scale: Array1<F>) -> Self {
        self.0.X_scale = Some(X_scale);
        self
    }
}

impl<F: Float> ParamGuard for LassoParams<F> {
    type Checked = LassoValidParams<F>;
    type Error = EstimatorError;

    /// Validate the hyper parameters
    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.alpha <= F::zero() || !self.0.alpha.is_finite() {
            return Err(EstimatorError::InvalidRegularization(to_f32(self.0.alpha)));
        }
        check_solver_options(
            &self.0.options,
            self.0.ws_start_size,
            self.0.X_offset.as_ref(),
            self.0.X_scale.as_ref(),
        )?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
