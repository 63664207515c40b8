use super::AsSingleTargets;
use ndarray::{ArrayBase, ArrayView1, Axis, Data, Ix1};

impl<F, S: Data<Elem = F>> AsSingleTargets for ArrayBase<S, Ix1> {
    type Elem = F;

    fn n_samples(&self) -> usize {
        self.len_of(Axis(0))
    }

    fn as_single_target(&self) -> ArrayView1<F> {
        self.view()
    }
}

impl<T: AsSingleTargets> AsSingleTargets for &T {
    type Elem = T::Elem;

    fn n_samples(&self) -> usize {
        (*self).n_samples()
    }

    fn as_single_target(&self) -> ArrayView1<Self::Elem> {
        (*self).as_single_target()
    }
}
