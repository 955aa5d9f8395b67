use reserve_pool::FixedPoint;

use crate::test_fixture::SCALAR_6;

pub fn assert_approx_eq_abs(a: u128, b: u128, delta: u128) {
    assert!(
        a.abs_diff(b) <= delta,
        "assertion failed: `(left != right)` \
         (left: `{:?}`, right: `{:?}`, epsilon: `{:?}`)",
        a,
        b,
        delta
    );
}

/// Assert `a` is within `delta_e6` of `b`, relative to `b` and expressed in 6 decimals
pub fn assert_approx_eq_rel(a: u128, b: u128, delta_e6: u128) {
    let epsilon = b.fixed_mul_floor(delta_e6, SCALAR_6).unwrap();
    assert!(
        a.abs_diff(b) <= epsilon,
        "assertion failed: `(left != right)` \
         (left: `{:?}`, right: `{:?}`, epsilon: `{:?}`)",
        a,
        b,
        epsilon
    );
}
