use super::{CSCArray, DesignMatrix, DesignMatrixType};
use crate::Float;
use ndarray::{Array1, ArrayBase, ArrayView1, Axis, Data, Ix2};

/// This implements the [`DesignMatrix`] trait for dense matrices.
impl<F: Float, S: Data<Elem = F>> DesignMatrix for ArrayBase<S, Ix2> {
    type Elem = F;

    fn n_features(&self) -> usize {
        self.len_of(Axis(1))
    }

    fn n_samples(&self) -> usize {
        self.len_of(Axis(0))
    }

    fn matrix_type(&self) -> DesignMatrixType {
        DesignMatrixType::Dense
    }

    fn column_dot(&self, v: ArrayView1<F>, j: usize) -> F {
        self.column(j).dot(&v)
    }

    fn column_sum(&self, j: usize) -> F {
        self.column(j).sum()
    }

    fn column_norm2(&self, j: usize) -> F {
        let Xj = self.column(j);
        Xj.dot(&Xj)
    }

    fn update_model_fit(&self, Xw: &mut Array1<F>, diff: F, j: usize) {
        Xw.scaled_add(diff, &self.column(j));
    }
}

/// This implements the [`DesignMatrix`] trait for sparse matrices.
impl<F: Float> DesignMatrix for CSCArray<'_, F> {
    type Elem = F;

    fn n_features(&self) -> usize {
        self.indptr.len().saturating_sub(1)
    }

    fn n_samples(&self) -> usize {
        // Negative row indices address no valid row
        self.indices
            .iter()
            .map(|&i| usize::try_from(i).map_or(usize::MAX, |i| i.saturating_add(1)))
            .max()
            .unwrap_or(0)
    }

    fn matrix_type(&self) -> DesignMatrixType {
        DesignMatrixType::Sparse
    }

    fn column_dot(&self, v: ArrayView1<F>, j: usize) -> F {
        let mut res = F::zero();
        for idx in self.column_range(j) {
            res += self.data[idx] * v[self.indices[idx] as usize];
        }
        res
    }

    fn column_sum(&self, j: usize) -> F {
        self.column_range(j).map(|idx| self.data[idx]).sum()
    }

    fn column_norm2(&self, j: usize) -> F {
        self.column_range(j)
            .map(|idx| self.data[idx] * self.data[idx])
            .sum()
    }

    fn update_model_fit(&self, Xw: &mut Array1<F>, diff: F, j: usize) {
        for idx in self.column_range(j) {
            Xw[self.indices[idx] as usize] += diff * self.data[idx];
        }
    }
}

/// This implements the [`DesignMatrix`] trait for references.
impl<DM: DesignMatrix> DesignMatrix for &DM {
    type Elem = DM::Elem;

    fn n_features(&self) -> usize {
        (*self).n_features()
    }

    fn n_samples(&self) -> usize {
        (*self).n_samples()
    }

    fn matrix_type(&self) -> DesignMatrixType {
        (*self).matrix_type()
    }

    fn column_dot(&self, v: ArrayView1<Self::Elem>, j: usize) -> Self::Elem {
        (*self).column_dot(v, j)
    }

    fn column_sum(&self, j: usize) -> Self::Elem {
        (*self).column_sum(j)
    }

    fn column_norm2(&self, j: usize) -> Self::Elem {
        (*self).column_norm2(j)
    }

    fn update_model_fit(&self, Xw: &mut Array1<Self::Elem>, diff: Self::Elem, j: usize) {
        (*self).update_model_fit(Xw, diff, j);
    }
}
