use crate::Float;


pub mod error;
pub mod estimators;
pub mod hyperparams;
pub mod param_guard;
pub mod traits;

pub use estimators::Lasso;
pub use hyperparams::{LassoParams, LassoPathParams, LassoPathValidParams, LassoValidParams};
pub use param_guard::ParamGuard;
pub use traits::Fit;
