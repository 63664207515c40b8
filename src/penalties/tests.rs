use ndarray::array;

use crate::penalties::*;

#[test]
fn test_value_l1() {
    let a = array![3.4, 2.1, -2.3, -0.3, 4.5];
    let pen = L1::new(3.2);
    approx::assert_abs_diff_eq!(pen.value(a.view()), 40.32, epsilon = 1e-12);
}

#[test]
fn test_prox_l1() {
    let pen = L1::new(2.);
    assert_eq!(pen.prox(0.3, 1. / 0.5), 0.0);
    assert_eq!(pen.prox(12.4, 1. / 0.5), 8.4);
    assert_eq!(pen.prox(-49.2, 1. / 0.5), -45.2);
}
