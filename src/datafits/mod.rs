use ndarray::{Array1, ArrayView1};

use super::Float;
use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix};


/// Quadratic datafit
///
/// The squared-norm residuals datafit `||y - X̃w||^2 / (2 * n_samples)` of the
/// Lasso. `X̃` is the design matrix implicitly centered by a per-feature
/// `sparse_scaling` vector `c`, i.e. `X̃_j = X_j - c_j * 1`, which lets an
/// uncentered sparse matrix behave as if it were centered without densifying
/// it. With `c = 0` this is the plain least-squares datafit.
///
/// The datafit works on residuals `R = y - X̃w` and stores the quantities
/// pre-computed before the optimization routine.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadratic<F: Float> {
    lipschitz: Array1<F>,
    norms: Array1<F>,
    column_sums: Array1<F>,
    sparse_scaling: Array1<F>,
}

impl<F: Float> Default for Quadratic<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> Quadratic<F> {
    pub fn new() -> Self {
        Quadratic {
            lipschitz: Array1::<F>::zeros(0),
            norms: Array1::<F>::zeros(0),
            column_sums: Array1::<F>::zeros(0),
            sparse_scaling: Array1::<F>::zeros(0),
        }
    }

    /// Computes `X̃_j^T v = X_j^T v - c_j * sum(v)` without materializing the
    /// centered column. `v_sum` is the sum of the entries of `v`.
    pub fn centered_column_dot<DM, T>(
        dataset: &DatasetBase<DM, T>,
        sparse_scaling: ArrayView1<F>,
        v: ArrayView1<F>,
        v_sum: F,
        j: usize,
    ) -> F
    where
        DM: DesignMatrix<Elem = F>,
        T: AsSingleTargets<Elem = F>,
    {
        let dot = dataset.design_matrix().column_dot(v, j);
        match sparse_scaling[j] == F::zero() {
            true => dot,
            false => dot - sparse_scaling[j] * v_sum,
        }
    }

    /// This method is called before looping onto the features, to precompute
    /// the Lipschitz constants (used as stepsizes) and the norms of the
    /// centered columns.
    pub fn initialize<DM, T>(&mut self, dataset: &DatasetBase<DM, T>, sparse_scaling: ArrayView1<F>)
    where
        DM: DesignMatrix<Elem = F>,
        T: AsSingleTargets<Elem = F>,
    {
        let n_samples = F::cast(dataset.targets().n_samples());
        let X = dataset.design_matrix();
        let n_features = X.n_features();

        self.sparse_scaling = sparse_scaling.to_owned();
        self.column_sums = Array1::from_iter((0..n_features).map(|j| X.column_sum(j)));
        // ||X_j - c_j||^2 = ||X_j||^2 - 2 c_j sum(X_j) + n c_j^2
        self.norms = Array1::from_iter((0..n_features).map(|j| {
            let c_j = self.sparse_scaling[j];
            let nrm2 = X.column_norm2(j) - F::cast(2.) * c_j * self.column_sums[j]
                + n_samples * c_j * c_j;
            nrm2.max(F::zero()).sqrt()
        }));
        self.lipschitz = self.norms.mapv(|nrm| nrm * nrm / n_samples);
    }

    /// This method computes the value of the datafit given the residuals.
    pub fn value(&self, R: ArrayView1<F>) -> F {
        R.dot(&R) / F::cast(2 * R.len())
    }

    /// Computes `X̃_j^T v` with the scaling vector stored at initialization.
    pub fn xtv_j<DM, T>(&self, dataset: &DatasetBase<DM, T>, v: ArrayView1<F>, v_sum: F, j: usize) -> F
    where
        DM: DesignMatrix<Elem = F>,
        T: AsSingleTargets<Elem = F>,
    {
        Self::centered_column_dot(dataset, self.sparse_scaling.view(), v, v_sum, j)
    }

    /// This method computes the value of the gradient at some point w for
    /// coordinate j, given the residuals `R = y - X̃w` and their sum.
    pub fn gradient_j<DM, T>(
        &self,
        dataset: &DatasetBase<DM, T>,
        R: ArrayView1<F>,
        R_sum: F,
        j: usize,
    ) -> F
    where
        DM: DesignMatrix<Elem = F>,
        T: AsSingleTargets<Elem = F>,
    {
        -self.xtv_j(dataset, R, R_sum, j) / F::cast(R.len())
    }

    /// Applies `w_j <- w_j + diff` to the residuals, i.e. subtracts
    /// `diff * X̃_j` from `R`, and keeps the running sum of `R` up to date.
    pub fn update_residuals<DM, T>(
        &self,
        dataset: &DatasetBase<DM, T>,
        R: &mut Array1<F>,
        R_sum: &mut F,
        diff: F,
        j: usize,
    ) where
        DM: DesignMatrix<Elem = F>,
        T: AsSingleTargets<Elem = F>,
    {
        let c_j = self.sparse_scaling[j];
        dataset.design_matrix().update_model_fit(R, -diff, j);
        *R_sum -= diff * self.column_sums[j];
        if c_j != F::zero() {
            R.mapv_inplace(|r| r + diff * c_j);
            *R_sum += diff * c_j * F::cast(R.len());
        }
    }

    /// Computes the residuals `y - X̃w` from scratch, along with their sum.
    pub fn residuals<DM, T>(&self, dataset: &DatasetBase<DM, T>, w: ArrayView1<F>) -> (Array1<F>, F)
    where
        DM: DesignMatrix<Elem = F>,
        T: AsSingleTargets<Elem = F>,
    {
        let mut R = dataset.targets().as_single_target().to_owned();
        let mut R_sum = R.sum();
        for (j, &wj) in w.iter().enumerate() {
            if wj != F::zero() {
                self.update_residuals(dataset, &mut R, &mut R_sum, wj, j);
            }
        }
        (R, R_sum)
    }

    /// Inverse stepsizes of coordinate descent: `||X̃_j||^2 / n_samples`.
    pub fn lipschitz(&self) -> ArrayView1<F> {
        self.lipschitz.view()
    }

    /// Euclidean norms of the centered columns.
    pub fn norms(&self) -> ArrayView1<F> {
        self.norms.view()
    }
}
