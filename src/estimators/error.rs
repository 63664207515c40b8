use ndarray_stats::errors::MinMaxError;
use thiserror::Error;

/// Simplified `Result` using [`EstimatorError`] as error type
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Error variants from hyperparameter construction or path estimation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimatorError {
    /// Regularization values must be positive and finite
    #[error("invalid alpha {0}")]
    InvalidRegularization(f32),
    #[error("invalid eps {0}, expected a value in (0, 1]")]
    InvalidEps(f32),
    #[error("invalid n_alphas {0}")]
    InvalidNAlphas(usize),
    #[error("the grid of alphas is empty")]
    EmptyAlphas,
    #[error("invalid tolerance {0}")]
    InvalidTolerance(f32),
    #[error("invalid max_iterations {0}")]
    InvalidMaxIterations(usize),
    #[error("invalid gap_freq {0}")]
    InvalidGapFreq(usize),
    #[error("invalid max_epochs {0}")]
    InvalidMaxEpochs(usize),
    #[error("invalid ws_start_size {0}")]
    InvalidWsStartSize(usize),
    #[error("{name} has length {found}, expected {expected}")]
    ShapeMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    /// The feature scale at this index is null or not finite
    #[error("invalid X_scale at index {0}")]
    InvalidScale(usize),
    #[error("the targets are empty")]
    EmptyTargets,
    /// `alpha_max` is null, every value of the default grid would be zero
    #[error("alpha_max is zero, no regularization path can be derived from it")]
    DegenerateGrid,
    #[error("the design matrix has no feature")]
    EmptyDesignMatrix(#[from] MinMaxError),
}
