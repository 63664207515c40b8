use std::collections::VecDeque;

use ndarray::{Array1, Array2, ArrayView1};

use crate::datafits::Quadratic;
use crate::datasets::{AsSingleTargets, DatasetBase, DesignMatrix};
use crate::helpers::helpers::solve_lin_sys;
use crate::Float;

/// Computes the value of the Lasso dual objective
///
/// ```ignore
/// D(theta) = alpha * y^T theta - n_samples * alpha^2 * ||theta||^2 / 2
/// ```
///
/// which lower bounds the primal objective for any `theta` such that
/// `||X̃^T theta||_inf <= 1`.
pub fn dual_value<F: Float>(alpha: F, y: ArrayView1<F>, theta: ArrayView1<F>) -> F {
    let n_samples = F::cast(y.len());
    alpha * y.dot(&theta) - n_samples * alpha * alpha * theta.dot(&theta) / F::cast(2.)
}

/// Computes `max_{j in features} |X̃_j^T v|`.
pub fn max_abs_correlation<F, DM, T>(
    dataset: &DatasetBase<DM, T>,
    datafit: &Quadratic<F>,
    v: ArrayView1<F>,
    features: &[usize],
) -> F
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    let v_sum = v.sum();
    features.iter().fold(F::zero(), |max_val, &j| {
        F::max(max_val, datafit.xtv_j(dataset, v, v_sum, j).abs())
    })
}

/// Rescales `v` into the dual feasible set restricted to `features`:
/// `v / max(floor, max_j |X̃_j^T v|)`.
///
/// With the residuals and `floor = n_samples * alpha` this is the classical
/// residual rescaling, which converges to the dual solution when the primal
/// iterates converge. With a dual point and `floor = 1` it turns a point that
/// is only feasible for a subproblem into a feasible point of the full
/// problem.
pub fn rescale_dual_point<F, DM, T>(
    dataset: &DatasetBase<DM, T>,
    datafit: &Quadratic<F>,
    v: ArrayView1<F>,
    floor: F,
    features: &[usize],
) -> Array1<F>
where
    F: Float,
    DM: DesignMatrix<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    let scale = F::max(floor, max_abs_correlation(dataset, datafit, v, features));
    match scale == F::zero() {
        true => Array1::zeros(v.len()),
        false => &v / scale,
    }
}

/// Anderson extrapolation of the residuals
///
/// Once the support is identified, coordinate descent iterates follow a
/// vector autoregressive process and a linear combination of the last `K + 1`
/// residuals extrapolates their limit. Rescaled, the extrapolated residuals
/// give much better dual points than the current residuals, hence tighter
/// duality gaps and earlier stopping.
///
/// Reference: `https://arxiv.org/abs/1907.05830`
#[derive(Debug, Clone)]
pub struct DualExtrapolator<F> {
    K: usize,
    last_K_R: VecDeque<Array1<F>>,
}

impl<F: Float> DualExtrapolator<F> {
    pub fn new(K: usize) -> Self {
        DualExtrapolator {
            K,
            last_K_R: VecDeque::with_capacity(K + 1),
        }
    }

    /// Stores a copy of the residuals, forgetting the oldest stored ones
    /// beyond `K + 1`.
    pub fn push(&mut self, R: ArrayView1<F>) {
        if self.last_K_R.len() == self.K + 1 {
            self.last_K_R.pop_front();
        }
        self.last_K_R.push_back(R.to_owned());
    }

    /// Computes the extrapolated residuals, or `None` while fewer than `K + 1`
    /// residuals are stored or when the extrapolation matrix is singular.
    pub fn extrapolate(&self) -> Option<Array1<F>> {
        let K = self.K;
        if K == 0 || self.last_K_R.len() < K + 1 {
            return None;
        }
        let n_samples = self.last_K_R[0].len();

        let U = Array2::from_shape_fn((K, n_samples), |(k, i)| {
            self.last_K_R[k + 1][i] - self.last_K_R[k][i]
        });
        let C = U.dot(&U.t());

        // Some extrapolation matrices are so ill-conditioned that the solve
        // yields inf or NaN values. Extrapolation is then simply skipped.
        let z = solve_lin_sys(C.view(), Array1::<F>::ones(K).view()).ok()?;
        let z_sum = z.sum();
        if z_sum == F::zero() || !z_sum.is_finite() {
            return None;
        }
        let c = &z / z_sum;

        let R_acc = self
            .last_K_R
            .iter()
            .skip(1)
            .zip(c.iter())
            .fold(Array1::<F>::zeros(n_samples), |acc, (R_k, &c_k)| {
                acc + &(R_k * c_k)
            });
        match R_acc.iter().all(|r| r.is_finite()) {
            true => Some(R_acc),
            false => None,
        }
    }
}
