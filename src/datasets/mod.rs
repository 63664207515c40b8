use ndarray::{Array1, Array2, ArrayView1};

pub mod csc_array;
mod impl_datasets;
mod impl_design_matrix;
mod impl_targets;


pub use csc_array::CSCArray;

/// The storage layout of a design matrix. The path controller relies on it to
/// decide whether an implicit centering correction applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignMatrixType {
    Dense,
    Sparse,
}

/// A dataset is the combination of a design matrix and a target vector. Both
/// are borrowed read-only by the solvers for the whole regularization path.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBase<DM, T>
where
    DM: DesignMatrix,
{
    pub design_matrix: DM,
    pub targets: T,
}

/// A dataset backed by a dense (preferably Fortran-ordered) design matrix.
pub type DenseDataset<F> = DatasetBase<Array2<F>, Array1<F>>;

/// A dataset backed by a borrowed compressed sparse column design matrix.
pub type SparseDataset<'a, F> = DatasetBase<CSCArray<'a, F>, Array1<F>>;

/// This trait abstracts the column-wise operations the coordinate descent
/// solvers perform on a design matrix, so that the same solver code runs on
/// dense and sparse storage.
pub trait DesignMatrix: Sized {
    type Elem;

    /// Number of columns.
    fn n_features(&self) -> usize;

    /// Number of rows. A sparse matrix does not store its shape and reports
    /// the number of rows its stored entries span, which is a lower bound.
    fn n_samples(&self) -> usize;

    fn matrix_type(&self) -> DesignMatrixType;

    /// Computes `X[:, j]^T v`.
    fn column_dot(&self, v: ArrayView1<Self::Elem>, j: usize) -> Self::Elem;

    /// Computes the sum of the entries of column `j`.
    fn column_sum(&self, j: usize) -> Self::Elem;

    /// Computes the squared euclidean norm of column `j`.
    fn column_norm2(&self, j: usize) -> Self::Elem;

    /// Adds `diff * X[:, j]` to `Xw` in place.
    fn update_model_fit(&self, Xw: &mut Array1<Self::Elem>, diff: Self::Elem, j: usize);
}

/// Single-task targets, i.e. a vector of observations.
pub trait AsSingleTargets {
    type Elem;

    fn n_samples(&self) -> usize;

    fn as_single_target(&self) -> ArrayView1<Self::Elem>;
}
