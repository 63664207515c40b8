use ndarray::ArrayView1;

/// A borrowed matrix in compressed sparse column format, laid out like
/// `scipy.sparse.csc_matrix`: the non-zero values of column `j` are
/// `data[indptr[j]..indptr[j + 1]]` and their row positions are the matching
/// slice of `indices`.
#[derive(Debug, Clone, PartialEq)]
pub struct CSCArray<'a, F> {
    pub data: ArrayView1<'a, F>,
    pub indices: ArrayView1<'a, i32>,
    pub indptr: ArrayView1<'a, i32>,
}

impl<'a, F> CSCArray<'a, F> {
    pub fn new(
        data: ArrayView1<'a, F>,
        indices: ArrayView1<'a, i32>,
        indptr: ArrayView1<'a, i32>,
    ) -> CSCArray<'a, F> {
        CSCArray {
            data,
            indices,
            indptr,
        }
    }

    /// Range of the stored entries of column `j` in `data` and `indices`.
    pub(crate) fn column_range(&self, j: usize) -> std::ops::Range<usize> {
        self.indptr[j] as usize..self.indptr[j + 1] as usize
    }
}
