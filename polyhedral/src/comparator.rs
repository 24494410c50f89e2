//! Implication queries on systems of affine inequalities.
//!
//! Given `A` (rows `a·x >= 0`) and optionally `E` (rows `e·x == 0`), a
//! [`SymbolicComparator`] decides whether a query inequality `q·x >= 0`
//! is implied. By Farkas' lemma the implication holds iff `q` is a
//! non-negative combination of the rows of `A` (plus any combination of
//! the rows of `E`), so construction reduces the slack-augmented,
//! transposed system to `U·B = D·V` form once, and queries only solve
//! against the stored `(U, V, d)`.
//!
//! Index 0 of every vector is a literal constant; further indices are
//! symbols or variables. [`Compare`] derives every other ordering from
//! `greater_equal_zero`: strict comparison decrements the literal slot,
//! `<=` negates, equality checks both directions.

use crate::poset::PartiallyOrderedSet;
use crate::simplex::Simplex;
use crate::symbolics::{MPoly, Monomial};
use intlin::gcd::lcm;
use intlin::normal_form;
use intlin::{Matrix, Vector};

/// Orderings derived from a single `greater_equal_zero` primitive.
///
/// Only `true` answers are meaningful: `greater(x) == false` does not
/// imply `less_equal(x)`.
pub trait Compare {
    /// Number of leading entries of a query that carry constants and
    /// symbols.
    fn num_const_terms(&self) -> usize;

    /// Is `x·v >= 0` implied for every `v` satisfying the constraints?
    fn greater_equal_zero(&self, x: &[i64]) -> bool;

    fn greater_equal(&self, x: &[i64], y: &[i64]) -> bool {
        let n = self.num_const_terms();
        debug_assert!(x.len() >= n && y.len() >= n);
        let delta: Vec<i64> = (0..n).map(|i| x[i] - y[i]).collect();
        self.greater_equal_zero(&delta)
    }

    fn greater(&self, x: &[i64], y: &[i64]) -> bool {
        let n = self.num_const_terms();
        debug_assert!(x.len() >= n && y.len() >= n);
        let mut delta: Vec<i64> = (0..n).map(|i| x[i] - y[i]).collect();
        delta[0] -= 1;
        self.greater_equal_zero(&delta)
    }

    fn less_equal(&self, x: &[i64], y: &[i64]) -> bool {
        self.greater_equal(y, x)
    }

    fn less(&self, x: &[i64], y: &[i64]) -> bool {
        self.greater(y, x)
    }

    fn equal(&self, x: &[i64], y: &[i64]) -> bool {
        if x == y {
            return true;
        }
        self.greater_equal(x, y) && self.greater_equal(y, x)
    }

    fn less_equal_zero(&self, x: &[i64]) -> bool {
        let n = self.num_const_terms();
        let neg: Vec<i64> = x.iter().take(n).map(|&v| -v).collect();
        self.greater_equal_zero(&neg)
    }

    fn greater_zero(&self, x: &[i64]) -> bool {
        let n = self.num_const_terms();
        let mut d: Vec<i64> = x.iter().take(n).copied().collect();
        d[0] -= 1;
        self.greater_equal_zero(&d)
    }

    fn less_zero(&self, x: &[i64]) -> bool {
        let n = self.num_const_terms();
        let mut d: Vec<i64> = x.iter().take(n).map(|&v| -v).collect();
        d[0] -= 1;
        self.greater_equal_zero(&d)
    }

    fn equal_zero(&self, x: &[i64]) -> bool {
        x.iter().all(|&v| v == 0) || (self.greater_equal_zero(x) && self.less_equal_zero(x))
    }

    /// Is `x + y == 0` implied?
    fn equal_negative(&self, x: &[i64], y: &[i64]) -> bool {
        let n = self.num_const_terms();
        debug_assert!(x.len() >= n && y.len() >= n);
        let sum: Vec<i64> = (0..n).map(|i| x[i] + y[i]).collect();
        self.equal_zero(&sum)
    }
}

/// Comparator backed by the `(U, V, d)` decomposition of the
/// slack-augmented constraint system.
pub struct SymbolicComparator {
    u: Matrix<i64>,
    v: Matrix<i64>,
    d: Vector<i64>,
    num_var: usize,
    num_equations: usize,
    poset: Option<PartiallyOrderedSet>,
    num_sym: usize,
}

impl SymbolicComparator {
    /// Comparator for `A·x >= 0` (rows of `a`), with index 0 treated as
    /// a non-negative literal-constant slot when `pos0` is set.
    pub fn from_inequalities(a: &Matrix<i64>, pos0: bool) -> SymbolicComparator {
        Self::construct(a, None, pos0, 0)
    }

    /// Comparator for `A·x >= 0 ∧ E·x == 0`.
    pub fn with_equalities(a: &Matrix<i64>, e: &Matrix<i64>, pos0: bool) -> SymbolicComparator {
        Self::construct(a, Some(e), pos0, 0)
    }

    /// Like [`SymbolicComparator::with_equalities`], with the trailing
    /// `num_non_neg` variables additionally constrained non-negative.
    pub fn non_negative(
        a: &Matrix<i64>,
        e: Option<&Matrix<i64>>,
        num_non_neg: usize,
    ) -> SymbolicComparator {
        Self::construct(a, e, true, num_non_neg)
    }

    /// Attach a POSet over the symbol slots `1..=num_sym` of the query
    /// layout; purely symbolic residuals fall back to it when the linear
    /// test is inconclusive.
    pub fn with_poset(mut self, poset: PartiallyOrderedSet, num_sym: usize) -> SymbolicComparator {
        debug_assert!(num_sym < self.num_var);
        self.poset = Some(poset);
        self.num_sym = num_sym;
        self
    }

    fn construct(
        a: &Matrix<i64>,
        e: Option<&Matrix<i64>>,
        pos0: bool,
        num_non_neg: usize,
    ) -> SymbolicComparator {
        let num_var = a.num_cols();
        let num_con_explicit = a.num_rows() + pos0 as usize;
        let num_ineq = num_con_explicit + num_non_neg;
        let num_eq = e.map_or(0, |e| e.num_rows());
        let num_equations = num_ineq + num_eq;
        let rows_b = num_var + num_ineq;
        let cols_b = 2 * num_ineq + num_eq;

        // B = [ A'(+e0)  E'  0 ]
        //     [ S        0   I ]
        let mut b: Matrix<i64> = Matrix::zeroed(rows_b, cols_b);
        if pos0 {
            b[(0, 0)] = 1;
        }
        let at = a.transpose();
        b.set_block(0, pos0 as usize, &at);
        if let Some(e) = e {
            b.set_block(0, num_ineq, &e.transpose());
        }
        for j in 0..num_non_neg {
            b[(num_var - num_non_neg + j, num_con_explicit + j)] = 1;
        }
        for j in 0..num_ineq {
            b[(j + num_var, j)] = -1;
            b[(j + num_var, j + num_equations)] = 1;
        }

        let mut u: Matrix<i64> = Matrix::identity(rows_b);
        normal_form::simplify_system_pair(&mut b, &mut u);
        let rank = b.num_rows();
        let mut cmp = SymbolicComparator {
            u,
            v: b,
            d: Vector::new(),
            num_var,
            num_equations,
            poset: None,
            num_sym: 0,
        };
        if rank < cols_b {
            // column-rank-deficient: diagonalize H' V' = I for the
            // null-space factorization
            let mut ht = cmp.v.transpose();
            let mut vt: Matrix<i64> = Matrix::identity(cols_b);
            normal_form::solve_system_pair(&mut ht, &mut vt);
            for i in 0..rank {
                cmp.d.push(ht[(i, i)]);
            }
            cmp.v = vt.transpose();
        }
        cmp
    }

    /// Infeasibility of the stored system: an infeasible system implies
    /// even `-1 >= 0`, so query the negated constant direction.
    pub fn is_empty(&self) -> bool {
        let b = self.u.col(0).to_vector();
        let neg: Vec<i64> = b.iter().map(|&x| -x).collect();
        self.solves_nonneg(&neg)
    }

    fn query_vector(&self, query: &[i64]) -> Vector<i64> {
        // b = U[:, ..len(q)] * q
        let mut out = Vector::with_capacity(self.u.num_rows());
        for i in 0..self.u.num_rows() {
            let mut acc = 0i64;
            for (j, &q) in query.iter().enumerate() {
                acc += self.u[(i, j)] * q;
            }
            out.push(acc);
        }
        out
    }

    /// Core test: can `b` be written as the image of a Farkas-consistent
    /// combination?
    fn solves_nonneg(&self, b: &[i64]) -> bool {
        if self.d.is_empty() {
            // full column rank: solve [V | b] directly and check that
            // every slack component has the sign its denominator gives
            let rows = self.v.num_rows();
            let cols = self.v.num_cols();
            let mut h: Matrix<i64> = Matrix::zeroed(rows, cols + 1);
            h.set_block(0, 0, &self.v);
            for i in 0..rows {
                h[(i, cols)] = b[i];
            }
            normal_form::solve_system(&mut h);
            for i in self.num_equations..rows {
                let rhs = h[(i, cols)];
                if rhs != 0 && ((rhs > 0) != (h[(i, i)] > 0)) {
                    return false;
                }
            }
            true
        } else {
            // rank deficient: ask the simplex whether the residual is a
            // non-negative combination of the null-space columns
            let num_slack = self.v.num_rows() - self.num_equations;
            let rank = self.u.num_rows();
            let mut dlcm = 1i64;
            for &di in self.d.iter() {
                dlcm = lcm(dlcm, di);
            }
            let mut b2: Vec<i64> = Vec::with_capacity(rank);
            for (i, &di) in self.d.iter().enumerate() {
                b2.push(b[i] * (dlcm / di));
            }
            let mut c: Vec<i64> = Vec::with_capacity(num_slack);
            for i in 0..num_slack {
                let mut acc = 0i64;
                for (j, &b2j) in b2.iter().enumerate() {
                    acc += self.v[(i + self.num_equations, j)] * b2j;
                }
                c.push(acc);
            }
            let ns_dim = self.v.num_cols() - rank;
            // rows [c | -J -> +J]: does some free y (split into y+ - y-)
            // satisfy the slack signs?
            let mut w: Matrix<i64> = Matrix::zeroed(num_slack, 2 * ns_dim + 1);
            for i in 0..num_slack {
                w[(i, 0)] = c[i];
                for j in 0..ns_dim {
                    let val = self.v[(i + self.num_equations, rank + j)] * dlcm;
                    w[(i, j + 1)] = -val;
                    w[(i, ns_dim + 1 + j)] = val;
                }
            }
            let couple: Matrix<i64> = Matrix::zeroed(0, w.num_cols());
            Simplex::positive_variables(&w, &couple).is_some()
        }
    }

    /// The residual over the symbol slots as a polynomial, if the query
    /// touches no actual variables.
    fn symbolic_residual(&self, x: &[i64]) -> Option<MPoly> {
        if x.iter().skip(self.num_sym + 1).any(|&v| v != 0) {
            return None;
        }
        let mut p = MPoly::constant(*x.first()?);
        for (k, &coef) in x.iter().enumerate().take(self.num_sym + 1).skip(1) {
            p.add_term(coef, Monomial::var(k as u32));
        }
        Some(p)
    }
}

impl Compare for SymbolicComparator {
    fn num_const_terms(&self) -> usize {
        self.num_var
    }

    fn greater_equal_zero(&self, x: &[i64]) -> bool {
        let b = self.query_vector(x);
        if self.solves_nonneg(&b) {
            return true;
        }
        // symbolic fallback: prove positivity of the residual polynomial
        if let Some(poset) = &self.poset {
            if let Some(p) = self.symbolic_residual(x) {
                return poset.known_greater_equal_zero(&p);
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_constraints_imply_sum() {
        // x0 >= 0, x1 >= 0 implies x0 + x1 >= 0
        let a: Matrix<i64> = "[1 0; 0 1]".parse().unwrap();
        let cmp = SymbolicComparator::from_inequalities(&a, true);
        assert!(cmp.greater_equal_zero(&[0, 1, 1]));
        assert!(!cmp.greater_equal_zero(&[-1, 0, 0]));
    }
}
