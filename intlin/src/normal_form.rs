//! Exact integer normal forms.
//!
//! Hermite normal form, Bareiss fraction-free elimination, row-echelon
//! simplification, diagonalizing solves, scaled inversion, null spaces,
//! and greedy unimodular orthogonalization. Every routine preserves exact
//! divisibility; no rational intermediates are materialized.

use crate::gcd::{div_exact, gcd, gcdx, lcm_non_unity};
use crate::matrix::Matrix;
use crate::vector::Vector;
use crate::{Error, Result};

/// For a pivot pair `(a, b)` returns `(p, q, a/g, b/g)` with
/// `p*a + q*b == g`; the fast path for `|a| == 1` avoids the extended gcd.
fn gcdx_scale(a: i64, b: i64) -> (i64, i64, i64, i64) {
    if a.abs() == 1 {
        return (a, 0, a, b);
    }
    let (g, p, q) = gcdx(a, b);
    (p, q, a / g, b / g)
}

/// Bring a nonzero entry into `a[(piv, c)]` by a row swap from below.
/// Returns `true` when the whole column segment is zero.
fn pivot_rows(a: &mut Matrix<i64>, c: usize, m: usize, piv: usize) -> bool {
    let mut p = piv;
    while a[(p, c)] == 0 {
        p += 1;
        if p == m {
            return true;
        }
    }
    a.swap_rows(piv, p);
    false
}

fn pivot_rows_pair(a: &mut Matrix<i64>, b: &mut Matrix<i64>, c: usize, m: usize, piv: usize) -> bool {
    let mut p = piv;
    while a[(p, c)] == 0 {
        p += 1;
        if p == m {
            return true;
        }
    }
    a.swap_rows(piv, p);
    b.swap_rows(piv, p);
    false
}

/// Zero the entries of column `r` below row `c` by gcd row rotations.
fn zero_sup_diagonal(a: &mut Matrix<i64>, r: usize, c: usize) {
    let (m, n) = (a.num_rows(), a.num_cols());
    for j in c + 1..m {
        let aii = a[(c, r)];
        let aij = a[(j, r)];
        if aij != 0 {
            let (p, q, aiir, aijr) = gcdx_scale(aii, aij);
            for k in 0..n {
                let ack = a[(c, k)];
                let ajk = a[(j, k)];
                a[(c, k)] = p * ack + q * ajk;
                a[(j, k)] = aiir * ajk - aijr * ack;
            }
        }
    }
}

fn zero_sup_diagonal_pair(a: &mut Matrix<i64>, b: &mut Matrix<i64>, r: usize, c: usize) {
    let (m, n) = (a.num_rows(), a.num_cols());
    let k_cols = b.num_cols();
    debug_assert_eq!(m, b.num_rows());
    for j in c + 1..m {
        let aii = a[(c, r)];
        let aij = a[(j, r)];
        if aij != 0 {
            let (p, q, aiir, aijr) = gcdx_scale(aii, aij);
            for k in 0..n {
                let ack = a[(c, k)];
                let ajk = a[(j, k)];
                a[(c, k)] = p * ack + q * ajk;
                a[(j, k)] = aiir * ajk - aijr * ack;
            }
            for k in 0..k_cols {
                let bck = b[(c, k)];
                let bjk = b[(j, k)];
                b[(c, k)] = p * bck + q * bjk;
                b[(j, k)] = aiir * bjk - aijr * bck;
            }
        }
    }
}

/// Make the pivot positive and reduce the entries above it into
/// `[0, pivot)` by floor-division row updates.
fn reduce_sub_diagonal(a: &mut Matrix<i64>, r: usize, c: usize) {
    let mut akk = a[(c, r)];
    if akk < 0 {
        akk = -akk;
        let n = a.num_cols();
        for k in 0..n {
            a[(c, k)] = -a[(c, k)];
        }
    }
    for z in 0..c {
        let azr = a[(z, r)];
        if azr != 0 {
            let mut f = azr / akk;
            if azr < 0 && azr != f * akk {
                f -= 1;
            }
            if f != 0 {
                let n = a.num_cols();
                for k in 0..n {
                    a[(z, k)] -= f * a[(c, k)];
                }
            }
        }
    }
}

fn reduce_sub_diagonal_pair(a: &mut Matrix<i64>, b: &mut Matrix<i64>, r: usize, c: usize) {
    let mut akk = a[(c, r)];
    if akk < 0 {
        akk = -akk;
        for k in 0..a.num_cols() {
            a[(c, k)] = -a[(c, k)];
        }
        for k in 0..b.num_cols() {
            b[(c, k)] = -b[(c, k)];
        }
    }
    for z in 0..c {
        let azr = a[(z, r)];
        if azr != 0 {
            let mut f = azr;
            if akk != 1 {
                let old = f;
                f /= akk;
                if old < 0 && old != f * akk {
                    f -= 1;
                }
            }
            for k in 0..a.num_cols() {
                a[(z, k)] -= f * a[(c, k)];
            }
            for k in 0..b.num_cols() {
                b[(z, k)] -= f * b[(c, k)];
            }
        }
    }
}

fn reduce_column(a: &mut Matrix<i64>, c: usize, r: usize) {
    zero_sup_diagonal(a, c, r);
    reduce_sub_diagonal(a, c, r);
}

fn reduce_column_pair(a: &mut Matrix<i64>, b: &mut Matrix<i64>, c: usize, r: usize) {
    zero_sup_diagonal_pair(a, b, c, r);
    reduce_sub_diagonal_pair(a, b, c, r);
}

/// Number of leading rows that are not identically zero, assuming zero
/// rows have been pivoted to the bottom.
pub fn num_nonzero_rows(a: &Matrix<i64>) -> usize {
    let mut m = a.num_rows();
    while m > 0 && a.row_is_zero(m - 1) {
        m -= 1;
    }
    m
}

fn simplify_system_impl(a: &mut Matrix<i64>, col_init: usize) -> usize {
    let (m, n) = (a.num_rows(), a.num_cols());
    let mut r = 0;
    let mut c = col_init;
    while c < n && r < m {
        if !pivot_rows(a, c, m, r) {
            reduce_column(a, c, r);
            r += 1;
        }
        c += 1;
    }
    num_nonzero_rows(a)
}

/// Row echelon with reduced off-diagonal entries; drops zero rows.
pub fn simplify_system(a: &mut Matrix<i64>) {
    simplify_system_from(a, 0)
}

/// [`simplify_system`] ignoring the leading `col_init` columns for pivots.
pub fn simplify_system_from(a: &mut Matrix<i64>, col_init: usize) {
    let r = simplify_system_impl(a, col_init);
    a.truncate_rows(r);
}

fn simplify_system_pair_impl(a: &mut Matrix<i64>, b: &mut Matrix<i64>) {
    let (m, n) = (a.num_rows(), a.num_cols());
    let mut r = 0;
    let mut c = 0;
    while c < n && r < m {
        if !pivot_rows_pair(a, b, c, m, r) {
            reduce_column_pair(a, b, c, r);
            r += 1;
        }
        c += 1;
    }
}

/// Echelon-reduce `a`, applying identical row operations to `b`; zero rows
/// of `a` are truncated from both.
pub fn simplify_system_pair(a: &mut Matrix<i64>, b: &mut Matrix<i64>) {
    simplify_system_pair_impl(a, b);
    let r = num_nonzero_rows(a);
    if r < a.num_rows() {
        a.truncate_rows(r);
        b.truncate_rows(r);
    }
}

pub fn rank(mut a: Matrix<i64>) -> usize {
    simplify_system_impl(&mut a, 0)
}

/// Hermite normal form: returns `(H, U)` with `U * A == H`, `U`
/// unimodular, and `H` in row echelon with positive pivots and reduced
/// entries above each pivot. Rank-deficient columns are skipped.
pub fn hermite(mut a: Matrix<i64>) -> (Matrix<i64>, Matrix<i64>) {
    let mut u = Matrix::identity(a.num_rows());
    simplify_system_pair_impl(&mut a, &mut u);
    (a, u)
}

/// Use row `r` to zero out the rest of column `c` in both directions.
fn zero_column_pair(a: &mut Matrix<i64>, b: &mut Matrix<i64>, c: usize, r: usize) {
    let (m, n) = (a.num_rows(), a.num_cols());
    let k_cols = b.num_cols();
    debug_assert_eq!(m, b.num_rows());
    for j in 0..r {
        let mut arc = a[(r, c)];
        let mut ajc = a[(j, c)];
        if ajc != 0 {
            let g = gcd(arc, ajc);
            arc /= g;
            ajc /= g;
            for k in 0..n {
                a[(j, k)] = arc * a[(j, k)] - ajc * a[(r, k)];
            }
            for k in 0..k_cols {
                b[(j, k)] = arc * b[(j, k)] - ajc * b[(r, k)];
            }
        }
    }
    // rows below: rotate so earlier columns stay zeroed
    for j in r + 1..m {
        let arc = a[(r, c)];
        let ajc = a[(j, c)];
        if ajc != 0 {
            let (p, q, arcr, ajcr) = gcdx_scale(arc, ajc);
            for k in 0..n {
                let ark = a[(r, k)];
                let ajk = a[(j, k)];
                a[(r, k)] = q * ajk + p * ark;
                a[(j, k)] = arcr * ajk - ajcr * ark;
            }
            for k in 0..k_cols {
                let brk = b[(r, k)];
                let bjk = b[(j, k)];
                b[(r, k)] = q * bjk + p * brk;
                b[(j, k)] = arcr * bjk - ajcr * brk;
            }
        }
    }
}

fn zero_column(a: &mut Matrix<i64>, c: usize, r: usize) {
    let (m, n) = (a.num_rows(), a.num_cols());
    for j in 0..r {
        let mut arc = a[(r, c)];
        let mut ajc = a[(j, c)];
        if ajc != 0 {
            let g = gcd(arc, ajc);
            arc /= g;
            ajc /= g;
            for k in 0..n {
                a[(j, k)] = arc * a[(j, k)] - ajc * a[(r, k)];
            }
        }
    }
    for j in r + 1..m {
        let arc = a[(r, c)];
        let ajc = a[(j, c)];
        if ajc != 0 {
            let (p, q, arcr, ajcr) = gcdx_scale(arc, ajc);
            for k in 0..n {
                let ark = a[(r, k)];
                let ajk = a[(j, k)];
                a[(r, k)] = q * ajk + p * ark;
                a[(j, k)] = arcr * ajk - ajcr * ark;
            }
        }
    }
}

/// Left-multiply `A x = B` by row operations until `A` is diagonal; both
/// operands are overwritten. Once diagonal, the solution reads off as
/// `x_i = B_i / A_ii` row by row, with the diagonal as denominators.
pub fn solve_system_pair(a: &mut Matrix<i64>, b: &mut Matrix<i64>) {
    let (m, n) = (a.num_rows(), a.num_cols());
    let mut r = 0;
    let mut c = 0;
    while c < n && r < m {
        if !pivot_rows_pair(a, b, c, m, r) {
            zero_column_pair(a, b, c, r);
            r += 1;
        }
        c += 1;
    }
}

/// Diagonalize the leading `k` columns of `a` in place.
pub fn solve_system_upto(a: &mut Matrix<i64>, k: usize) {
    let m = a.num_rows();
    let mut r = 0;
    let mut c = 0;
    while c < k && r < m {
        if !pivot_rows(a, c, m, r) {
            zero_column(a, c, r);
            r += 1;
        }
        c += 1;
    }
}

/// Diagonalize all but the last column; that column is the right-hand
/// side being solved for.
pub fn solve_system(a: &mut Matrix<i64>) {
    solve_system_upto(a, a.num_cols() - 1)
}

/// Bareiss fraction-free elimination in place. Every intermediate divides
/// exactly by the previous pivot. Returns, per pivot column, the row index
/// at which the pivot was found before swapping.
pub fn bareiss(a: &mut Matrix<i64>) -> Vector<usize> {
    let (m, n) = (a.num_rows(), a.num_cols());
    let mut pivots = Vector::with_capacity(m.min(n));
    let mut prev = 1i64;
    let mut r = 0;
    let mut c = 0;
    while c < n && r < m {
        let mut piv = r;
        let found = loop {
            if a[(piv, c)] != 0 {
                break true;
            }
            piv += 1;
            if piv == m {
                break false;
            }
        };
        if found {
            pivots.push(piv);
            a.swap_rows(r, piv);
            for k in r + 1..m {
                for j in c + 1..n {
                    let u = a[(r, c)] * a[(k, j)] - a[(k, c)] * a[(r, j)];
                    a[(k, j)] = div_exact(u, prev);
                }
                a[(k, c)] = 0;
            }
            prev = a[(r, c)];
            r += 1;
        }
        c += 1;
    }
    pivots
}

/// `inv(A) -> (D, B)` with `D` diagonal and `D⁻¹ B = A⁻¹`.
pub fn inv(mut a: Matrix<i64>) -> (Matrix<i64>, Matrix<i64>) {
    debug_assert!(a.is_square());
    let mut b = Matrix::identity(a.num_cols());
    solve_system_pair(&mut a, &mut b);
    (a, b)
}

/// `scaled_inv(A) -> (B, s)` with `B * A == s * I`, `s` the lcm of the
/// pivot denominators. Fails on singular input.
pub fn scaled_inv(mut a: Matrix<i64>) -> Result<(Matrix<i64>, i64)> {
    debug_assert!(a.is_square());
    let mut b = Matrix::identity(a.num_cols());
    solve_system_pair(&mut a, &mut b);
    let diag = a.diag();
    if diag.iter().any(|&d| d == 0) || diag.len() < a.num_rows() {
        return Err(Error::Singular);
    }
    let (s, non_unity) = lcm_non_unity(&diag);
    if non_unity {
        for i in 0..a.num_rows() {
            let f = s / a[(i, i)];
            for j in 0..b.num_cols() {
                b[(i, j)] *= f;
            }
        }
    }
    Ok((b, s))
}

/// Basis of the left null space: `N * A == 0`, `N` of maximal rank.
pub fn null_space(mut a: Matrix<i64>) -> Matrix<i64> {
    let m = a.num_rows();
    let mut b = Matrix::identity(m);
    solve_system_pair(&mut a, &mut b);
    let r = num_nonzero_rows(&a);
    b.block(r, m, 0, m)
}

// ---- orthogonalization ----------------------------------------------------

fn drop_col(a: &mut Matrix<i64>, i: usize, m: usize, n: usize) {
    // shift the columns after `i` left; `n` is the new column count
    if n <= i {
        return;
    }
    for r in 0..m {
        for c in i..n {
            a[(r, c)] = a[(r, c + 1)];
        }
    }
}

fn zero_sup_diagonal_ortho(a: &mut Matrix<i64>, km: &mut Matrix<i64>, i: usize, m: usize, n: usize) {
    for j in i + 1..m {
        let aii = a[(i, i)];
        let aji = a[(j, i)];
        if aji != 0 {
            let (p, q, aiir, aijr) = gcdx_scale(aii, aji);
            for k in 0..n {
                let aik = a[(i, k)];
                let ajk = a[(j, k)];
                a[(i, k)] = p * aik + q * ajk;
                a[(j, k)] = aiir * ajk - aijr * aik;
            }
            for k in 0..m {
                let kik = km[(i, k)];
                let kjk = km[(j, k)];
                km[(i, k)] = p * kik + q * kjk;
                km[(j, k)] = aiir * kjk - aijr * kik;
            }
        }
    }
}

fn zero_sub_diagonal_ortho(a: &mut Matrix<i64>, km: &mut Matrix<i64>, i: usize, m: usize, n: usize) {
    let aii = a[(i, i)];
    if aii == -1 {
        for c in 0..n {
            a[(i, c)] = -a[(i, c)];
        }
        for c in 0..m {
            km[(i, c)] = -km[(i, c)];
        }
    } else {
        debug_assert_eq!(aii, 1);
    }
    for z in 0..i {
        let azi = a[(z, i)];
        if azi != 0 {
            for c in 0..n {
                a[(z, c)] -= azi * a[(i, c)];
            }
            for c in 0..m {
                km[(z, c)] -= azi * km[(i, c)];
            }
        }
    }
}

/// Greedy unimodular orthogonalization: selects a maximal prefix-priority
/// subset of the columns of `A` admitting a unimodular `K` with
/// `K * A[:, included] == I`, returning `(K, included)`.
pub fn orthogonalize(mut a: Matrix<i64>) -> (Matrix<i64>, Vector<usize>) {
    let m = a.num_rows();
    let mut n = a.num_cols();
    let mut k = Matrix::identity(m);
    let mut included = Vector::with_capacity(m.min(n));
    let mut i = 0;
    let mut j = 0;
    while i < m.min(n) {
        if pivot_rows_pair(&mut a, &mut k, i, m, i) {
            // linear combination of the previous columns
            n -= 1;
            drop_col(&mut a, i, m, n);
            a.truncate_cols(n);
        } else {
            zero_sup_diagonal_ortho(&mut a, &mut k, i, m, n);
            if a[(i, i)].abs() != 1 {
                // including this column would break unimodularity
                n -= 1;
                drop_col(&mut a, i, m, n);
                a.truncate_cols(n);
            } else {
                zero_sub_diagonal_ortho(&mut a, &mut k, i, m, n);
                included.push(j);
                i += 1;
            }
        }
        j += 1;
    }
    (k, included)
}
