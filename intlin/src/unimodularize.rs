//! Unimodular completion of integer matrices.

use crate::gcd::{gcd, gcdx};
use crate::matrix::Matrix;
use crate::normal_form;

/// If the columns of `A` extend to a basis of the full integer lattice,
/// returns the unimodular `U` with `U * A` equal to the identity stacked
/// on zeros; the leading columns of `U⁻¹` then equal `A`. Returns `None`
/// when no unimodular completion exists.
pub fn unimodularize(a: Matrix<i64>) -> Option<Matrix<i64>> {
    let cols = a.num_cols();
    let (h, u) = normal_form::hermite(a);
    for m in 0..cols {
        if h[(m, m)] != 1 {
            return None;
        }
    }
    Some(u)
}

/// Solve `a*x + b*y == c` over the integers.
pub fn linear_diophantine(c: i64, a: i64, b: i64) -> Option<(i64, i64)> {
    if c == 0 {
        return Some((0, 0));
    }
    if a == 0 && b == 0 {
        return None;
    }
    let (g, x, y) = gcdx(a, b);
    if c % g != 0 {
        return None;
    }
    let f = c / g;
    Some((x * f, y * f))
}

/// Solve `a*x + b*y + d*z == c` over the integers.
pub fn linear_diophantine3(c: i64, a: i64, b: i64, d: i64) -> Option<(i64, i64, i64)> {
    if c == 0 {
        return Some((0, 0, 0));
    }
    if a == 0 && b == 0 {
        let (y, z) = linear_diophantine(c, b, d)?;
        return Some((0, y, z));
    }
    // a*x + b*y = g*w, then g*w + d*z = c
    let g = gcd(a, b);
    let (w, z) = linear_diophantine(c, g, d)?;
    let (x, y) = linear_diophantine(g * w, a, b)?;
    Some((x, y, z))
}
