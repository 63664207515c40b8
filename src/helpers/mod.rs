#[cfg(test)]
mod tests;

/// This module implements the proximal operator of the L1 penalty.
pub mod prox {
    use crate::Float;

    /// The soft-thresholding operator is the proximal operator used by
    /// [`L1`](crate::penalties::L1).
    pub fn soft_thresholding<F: Float>(x: F, threshold: F) -> F {
        if x > threshold {
            x - threshold
        } else if x < -threshold {
            x + threshold
        } else {
            F::zero()
        }
    }
}

/// This module contains helper functions to compute the maximum regularization
/// hyperparameter of the Lasso and a few numerical routines used by the
/// working-set solver.
pub mod helpers {
    use crate::datafits::Quadratic;
    use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix};
    use crate::estimators::error::{EstimatorError, Result};
    use crate::Float;
    use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Data, Ix1};
    use ndarray_stats::QuantileExt;
    use std::cmp::Ordering;

    /// This function computes the maximum regularization hyperparameter value
    /// `max_j |X̃_j^T y| / n_samples`, where `X̃` is the design matrix corrected
    /// by the implicit centering `sparse_scaling` (pass zeros for none). For
    /// every larger value the null vector is a solution of the Lasso.
    pub fn compute_alpha_max<F, DM, T>(
        dataset: &DatasetBase<DM, T>,
        sparse_scaling: ArrayView1<F>,
    ) -> Result<F>
    where
        F: Float,
        DM: DesignMatrix<Elem = F>,
        T: AsSingleTargets<Elem = F>,
    {
        let n_samples = F::cast(dataset.targets().n_samples());
        let y = dataset.targets().as_single_target();
        let y_sum = y.sum();
        let Xty = Array1::from_iter((0..dataset.design_matrix().n_features()).map(|j| {
            Quadratic::centered_column_dot(dataset, sparse_scaling, y, y_sum, j).abs()
        }));
        let alpha_max = *Xty.max().map_err(EstimatorError::from)?;
        Ok(alpha_max / n_samples)
    }

    /// Counts the non-zero entries of a vector.
    pub fn count_nonzero<F: Float, S: Data<Elem = F>>(w: &ArrayBase<S, Ix1>) -> usize {
        w.iter().filter(|&&wj| wj != F::zero()).count()
    }

    /// This is a helper method that sorts the indices of an array based on some
    /// `compare` closure. It is used when building working sets in order to
    /// rank the features by priority.
    /// Reference: `https://github.com/rust-ndarray/ndarray/issues/1145`
    pub fn argsort_by<S, F>(arr: &ArrayBase<S, Ix1>, mut compare: F) -> Vec<usize>
    where
        S: Data,
        F: FnMut(&S::Elem, &S::Elem) -> Ordering,
    {
        let mut indices: Vec<usize> = (0..arr.len()).collect();
        indices.sort_unstable_by(move |&i, &j| compare(&arr[i], &arr[j]));
        indices
    }

    /// This function solves a linear system using Gaussian elimination. It is
    /// called by the Anderson extrapolation of the residuals to invert the
    /// (small, K x K) extrapolation matrix. We made the choice not to use a BLAS
    /// subroutine since it introduces unsafe code and a significantly larger
    /// bundle size.
    pub fn solve_lin_sys<F: Float>(
        A: ArrayView2<F>,
        b: ArrayView1<F>,
    ) -> std::result::Result<Array1<F>, &'static str> {
        let size = b.len();
        if size == 0 {
            return Err("Empty linear system");
        }

        // Concatenation
        let mut system = Array2::<F>::zeros((size, size + 1));
        for i in 0..size {
            for j in 0..(size + 1) {
                system[[i, j]] = if j == size { b[i] } else { A[[i, j]] };
            }
        }

        // Echelon form
        for i in 0..size - 1 {
            for j in i..size - 1 {
                if system[[i, i]] == F::zero() {
                    continue;
                } else {
                    let factor = system[[j + 1, i]] / system[[i, i]];
                    for k in i..size + 1 {
                        system[[j + 1, k]] = system[[j + 1, k]] - factor * system[[i, k]];
                    }
                }
            }
        }

        // Gaussian eliminated
        for i in (1..size).rev() {
            if system[[i, i]] == F::zero() {
                continue;
            } else {
                for j in (1..i + 1).rev() {
                    let factor = system[[j - 1, i]] / system[[i, i]];
                    for k in (0..size + 1).rev() {
                        system[[j - 1, k]] = system[[j - 1, k]] - factor * system[[i, k]];
                    }
                }
            }
        }

        let mut x = Array1::<F>::zeros(size);
        for i in 0..size {
            if system[[i, i]] == F::zero() {
                return Err("Infinitely many solutions or singular matrix");
            } else {
                system[[i, size]] = system[[i, size]] / system[[i, i]];
                system[[i, i]] = F::one();
                x[i] = system[[i, size]];
            }
        }

        Ok(x)
    }
}

/// This module contains helpers functions to efficiently write tests.
pub mod test_helpers {
    use crate::Float;
    use approx::AbsDiffEq;
    use ndarray::prelude::*;
    use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    pub fn assert_array_all_close<F>(x: ArrayView1<F>, y: ArrayView1<F>, delta: F)
    where
        F: Float + AbsDiffEq<Epsilon = F>,
    {
        assert_eq!(x.len(), y.len());
        for i in 0..x.len() {
            if x[i].abs_diff_ne(&y[i], delta) {
                panic!("x: {}, y: {} ; with precision level {}", x[i], y[i], delta);
            }
        }
    }

    pub fn assert_array2d_all_close<F>(x: ArrayView2<F>, y: ArrayView2<F>, delta: F)
    where
        F: Float + AbsDiffEq<Epsilon = F>,
    {
        assert_eq!(x.shape(), y.shape());
        for i in 0..x.shape()[0] {
            for j in 0..x.shape()[1] {
                if x[[i, j]].abs_diff_ne(&y[[i, j]], delta) {
                    panic!(
                        "x: {}, y: {} ; with precision level {}",
                        x[[i, j]],
                        y[[i, j]],
                        delta
                    );
                }
            }
        }
    }

    pub fn fill_random_vector(capacity: usize, seed: u64) -> Vec<f64> {
        let mut r = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0., 1.).unwrap();

        let mut data_x: Vec<f64> = Vec::with_capacity(capacity);
        for _ in 0..data_x.capacity() {
            data_x.push(normal.sample(&mut r));
        }
        data_x
    }

    /// Generates a Fortran-ordered gaussian design matrix and a noisy target
    /// `y = X w + e` where `w` has `n_informative` non-zero entries.
    pub fn generate_random_data(
        n_samples: usize,
        n_features: usize,
        n_informative: usize,
    ) -> (Array2<f64>, Array1<f64>) {
        let data_x = fill_random_vector(n_samples * n_features, 42);
        let data_w = fill_random_vector(n_features, 43);
        let data_e = fill_random_vector(n_samples, 44);
        let X = Array2::from_shape_vec((n_samples, n_features).f(), data_x).unwrap();
        let mut true_w = Array1::from_shape_vec(n_features, data_w).unwrap();
        true_w
            .iter_mut()
            .skip(n_informative)
            .for_each(|wj| *wj = 0.);
        let noise = Array1::from_shape_vec(n_samples, data_e).unwrap() * 0.1;
        let y = X.dot(&true_w) + noise;

        (X, y)
    }

    /// Converts a dense matrix to the `(data, indices, indptr)` triplet of its
    /// compressed sparse column representation.
    pub fn to_csc_triplet(X: ArrayView2<f64>) -> (Array1<f64>, Array1<i32>, Array1<i32>) {
        let mut data = Vec::new();
        let mut indices = Vec::new();
        let mut indptr = vec![0];
        for col in X.columns() {
            for (i, &x) in col.iter().enumerate() {
                if x != 0. {
                    data.push(x);
                    indices.push(i as i32);
                }
            }
            indptr.push(data.len() as i32);
        }
        (
            Array1::from_vec(data),
            Array1::from_vec(indices),
            Array1::from_vec(indptr),
        )
    }
}
