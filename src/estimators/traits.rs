use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix};

/// Fit trait
///
/// The fittable trait allows an estimator to be fitted to a dataset (a combination
/// of design matrix and targets). More formally, the model estimates the
/// coefficients that minimize the Lasso objective, for one or several values of
/// the regularization hyperparameter.
pub trait Fit<DM: DesignMatrix, T: AsSingleTargets, E: std::error::Error> {
    type Object;

    fn fit(&self, dataset: &DatasetBase<DM, T>) -> Result<Self::Object, E>;
}
