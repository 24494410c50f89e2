//! Simplex over integer tableaux with per-row denominators.
//!
//! The tableau is one integer matrix. Row 0 carries basic-variable
//! markers (column of variable `j` holds `1 + r` when `j` is basic in
//! constraint row `r`), row 1 carries the cost numerators, and the
//! remaining rows are constraints. Column 0 holds each row's basic
//! variable index, column 1 the row denominator, column 2 the
//! right-hand-side numerator. A constraint row with denominator `d`
//! represents the equation `(1/d) * numerators`; the invariant after
//! every pivot is that the basic variable's numerator equals `d`, so the
//! basic solution reads off as `rhs / d`.
//!
//! Construction via [`Simplex::positive_variables`] runs a phase-1
//! simplex with artificial variables and reports infeasibility by
//! returning `None`; a feasible tableau comes back with the artificials
//! eliminated and a zero cost row, ready for [`Simplex::run`].

use intlin::gcd::gcd;
use intlin::{Matrix, Rational};
use tracing::trace;

const ROW_COST: usize = 1;
const COL_BASIC: usize = 0;
const COL_DENOM: usize = 1;
const COL_RHS: usize = 2;
const COL_VAR0: usize = 3;

pub struct Simplex {
    tab: Matrix<i64>,
    num_con: usize,
    num_vars: usize,
}

impl Simplex {
    /// Feasibility-checked construction for `A x <= b`, `E x == q`,
    /// `x >= 0`. Each row of `a` is `[b | a…]` meaning `a…·x <= b`; each
    /// row of `e` is `[q | e…]` meaning `e…·x == q`. Slack variables come
    /// first in the variable order, then the `x` variables. Returns
    /// `None` when the system is infeasible (or feasibility could not be
    /// established within the integer range).
    pub fn positive_variables(a: &Matrix<i64>, e: &Matrix<i64>) -> Option<Simplex> {
        let width = if a.num_rows() > 0 {
            a.num_cols()
        } else {
            e.num_cols()
        };
        debug_assert!(width > 0);
        debug_assert!(a.num_rows() == 0 || a.num_cols() == width);
        debug_assert!(e.num_rows() == 0 || e.num_cols() == width);
        let n_x = width - 1;

        // drop redundant equalities, and catch contradictions early
        let mut eq = e.clone();
        if eq.num_rows() > 1 {
            intlin::normal_form::simplify_system_from(&mut eq, 1);
        }
        for r in 0..eq.num_rows() {
            let coeffs_zero = (1..width).all(|c| eq[(r, c)] == 0);
            if coeffs_zero && eq[(r, 0)] != 0 {
                return None;
            }
        }

        let num_slack = a.num_rows();
        let num_eq = eq.num_rows();
        let num_con = num_slack + num_eq;
        let num_vars = num_slack + n_x;

        // decide which rows need an artificial basic variable
        let mut needs_art: Vec<bool> = Vec::with_capacity(num_con);
        for i in 0..num_slack {
            needs_art.push(a[(i, 0)] < 0);
        }
        for _ in 0..num_eq {
            needs_art.push(true);
        }
        let num_art = needs_art.iter().filter(|&&x| x).count();

        let mut s = Simplex {
            tab: Matrix::zeroed(num_con + 2, COL_VAR0 + num_vars + num_art),
            num_con,
            num_vars,
        };
        s.tab[(ROW_COST, COL_DENOM)] = 1;
        let mut art = 0usize;
        for r in 0..num_con {
            let row = 2 + r;
            s.tab[(row, COL_DENOM)] = 1;
            let (rhs, coeffs): (i64, Vec<i64>) = if r < num_slack {
                let sign = if a[(r, 0)] < 0 { -1 } else { 1 };
                let mut cs = vec![0i64; num_vars];
                cs[r] = sign;
                for j in 0..n_x {
                    cs[num_slack + j] = sign * a[(r, 1 + j)];
                }
                (sign * a[(r, 0)], cs)
            } else {
                let k = r - num_slack;
                let sign = if eq[(k, 0)] < 0 { -1 } else { 1 };
                let mut cs = vec![0i64; num_vars];
                for j in 0..n_x {
                    cs[num_slack + j] = sign * eq[(k, 1 + j)];
                }
                (sign * eq[(k, 0)], cs)
            };
            s.tab[(row, COL_RHS)] = rhs;
            for (j, &c) in coeffs.iter().enumerate() {
                s.tab[(row, COL_VAR0 + j)] = c;
            }
            if needs_art[r] {
                let col = COL_VAR0 + num_vars + art;
                s.tab[(row, col)] = 1;
                s.set_basic(r, num_vars + art);
                art += 1;
            } else {
                s.set_basic(r, r);
            }
        }

        if num_art > 0 {
            // phase 1: minimize the sum of the artificials
            for t in 0..num_art {
                s.tab[(ROW_COST, COL_VAR0 + num_vars + t)] = 1;
            }
            s.price_out()?;
            s.optimize(s.num_vars)?;
            if s.tab[(ROW_COST, COL_RHS)] != 0 {
                trace!(num_con, num_vars, "phase-1 infeasible");
                return None;
            }
            s.evict_artificials()?;
            s.tab.truncate_cols(COL_VAR0 + s.num_vars);
        }
        // reset the cost row for the caller
        for c in 0..s.tab.num_cols() {
            s.tab[(ROW_COST, c)] = 0;
        }
        s.tab[(ROW_COST, COL_DENOM)] = 1;
        Some(s)
    }

    pub fn num_variables(&self) -> usize {
        self.num_vars
    }

    pub fn num_constraints(&self) -> usize {
        self.num_con
    }

    /// Cost numerators, one per variable (slacks first).
    pub fn cost_mut(&mut self) -> &mut [i64] {
        let w = COL_VAR0 + self.num_vars;
        &mut self.tab.row_mut(ROW_COST)[COL_VAR0..w]
    }

    /// The current basic solution is feasible and no artificial variable
    /// remains in the basis.
    pub fn is_feasible(&self) -> bool {
        for r in 0..self.num_con {
            let row = 2 + r;
            if self.tab[(row, COL_DENOM)] <= 0 || self.tab[(row, COL_RHS)] < 0 {
                return false;
            }
            if self.tab[(row, COL_BASIC)] as usize >= self.num_vars {
                return false;
            }
        }
        true
    }

    /// Value of variable `j` in the current basic solution.
    pub fn value(&self, j: usize) -> Rational {
        debug_assert!(j < self.num_vars);
        let marker = self.tab[(0, COL_VAR0 + j)];
        if marker == 0 {
            return Rational::integer(0);
        }
        let row = 1 + marker as usize;
        Rational::new(self.tab[(row, COL_RHS)], self.tab[(row, COL_DENOM)])
    }

    /// Minimize the configured cost row. Returns the optimum of
    /// `-cost·x` as a rational (the tableau's objective cell), or `None`
    /// when the problem is unbounded or left the integer range.
    pub fn run(&mut self) -> Option<Rational> {
        self.price_out()?;
        self.optimize(self.num_vars)?;
        Some(Rational::new(
            self.tab[(ROW_COST, COL_RHS)],
            self.tab[(ROW_COST, COL_DENOM)],
        ))
    }

    // -- internals --

    fn set_basic(&mut self, r: usize, j: usize) {
        let old = self.tab[(2 + r, COL_BASIC)] as usize;
        if self.tab[(0, COL_VAR0 + old)] == 1 + r as i64 {
            self.tab[(0, COL_VAR0 + old)] = 0;
        }
        self.tab[(2 + r, COL_BASIC)] = j as i64;
        self.tab[(0, COL_VAR0 + j)] = 1 + r as i64;
    }

    /// Eliminate every basic column from the cost row.
    fn price_out(&mut self) -> Option<()> {
        for r in 0..self.num_con {
            let j = self.tab[(2 + r, COL_BASIC)] as usize;
            let e = self.tab[(ROW_COST, COL_VAR0 + j)];
            if e != 0 {
                self.combine_rows(ROW_COST, 2 + r, COL_VAR0 + j)?;
            }
        }
        Some(())
    }

    /// `target -= (target[c] / pivot[c]) * pivot`, in scaled integers.
    fn combine_rows(&mut self, target: usize, pivot: usize, c: usize) -> Option<()> {
        let p = self.tab[(pivot, c)];
        let e = self.tab[(target, c)];
        debug_assert!(p != 0);
        let w = self.tab.num_cols();
        for col in COL_RHS..w {
            let v = p as i128 * self.tab[(target, col)] as i128
                - e as i128 * self.tab[(pivot, col)] as i128;
            self.tab[(target, col)] = to_i64(v)?;
        }
        let d = self.tab[(target, COL_DENOM)] as i128 * p as i128;
        self.tab[(target, COL_DENOM)] = to_i64(d.abs())?;
        if d < 0 {
            for col in COL_RHS..w {
                self.tab[(target, col)] = -self.tab[(target, col)];
            }
        }
        self.reduce_row(target);
        Some(())
    }

    fn reduce_row(&mut self, row: usize) {
        let w = self.tab.num_cols();
        let mut g = self.tab[(row, COL_DENOM)];
        for col in COL_RHS..w {
            g = gcd(g, self.tab[(row, col)]);
            if g == 1 {
                return;
            }
        }
        if g > 1 {
            self.tab[(row, COL_DENOM)] /= g;
            for col in COL_RHS..w {
                self.tab[(row, col)] /= g;
            }
        }
    }

    /// Most-negative reduced cost among the first `limit` variables,
    /// lowest index on ties; `None` at optimality.
    fn entering_column(&self, limit: usize) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for j in 0..limit {
            if self.tab[(0, COL_VAR0 + j)] != 0 {
                continue;
            }
            let c = self.tab[(ROW_COST, COL_VAR0 + j)];
            if c < 0 {
                match best {
                    Some((_, b)) if b <= c => {}
                    _ => best = Some((j, c)),
                }
            }
        }
        best.map(|(j, _)| j)
    }

    /// Smallest-ratio leaving row for entering column `c`; ties break to
    /// the lowest basic-variable index. `None` when unbounded.
    fn leaving_row(&self, c: usize) -> Option<usize> {
        let mut best: Option<usize> = None;
        for r in 0..self.num_con {
            let row = 2 + r;
            let coef = self.tab[(row, c)];
            if coef <= 0 {
                continue;
            }
            match best {
                None => best = Some(r),
                Some(b) => {
                    let brow = 2 + b;
                    let lhs = self.tab[(row, COL_RHS)] as i128 * self.tab[(brow, c)] as i128;
                    let rhs = self.tab[(brow, COL_RHS)] as i128 * coef as i128;
                    if lhs < rhs
                        || (lhs == rhs
                            && self.tab[(row, COL_BASIC)] < self.tab[(brow, COL_BASIC)])
                    {
                        best = Some(r);
                    }
                }
            }
        }
        best
    }

    fn pivot(&mut self, r: usize, c: usize) -> Option<()> {
        let prow = 2 + r;
        let p = self.tab[(prow, c)];
        debug_assert!(p != 0);
        trace!(row = r, col = c - COL_VAR0, pivot = p, "pivot");
        for k in 0..self.num_con + 1 {
            let target = 1 + k;
            if target == prow {
                continue;
            }
            if self.tab[(target, c)] != 0 {
                self.combine_rows(target, prow, c)?;
            }
        }
        // rescale the pivot row so its denominator is the pivot entry
        if p < 0 {
            let w = self.tab.num_cols();
            for col in COL_RHS..w {
                self.tab[(prow, col)] = -self.tab[(prow, col)];
            }
            self.tab[(prow, COL_DENOM)] = -p;
        } else {
            self.tab[(prow, COL_DENOM)] = p;
        }
        self.reduce_row(prow);
        self.set_basic(r, c - COL_VAR0);
        Some(())
    }

    /// Pivot until no reduced cost among the first `limit` variables is
    /// negative.
    fn optimize(&mut self, limit: usize) -> Option<()> {
        let cap = 64 + 16 * (self.num_con + 1) * (self.tab.num_cols() + 1);
        for _ in 0..cap {
            let c = match self.entering_column(limit) {
                None => return Some(()),
                Some(j) => COL_VAR0 + j,
            };
            let r = self.leaving_row(c)?;
            self.pivot(r, c)?;
        }
        // iteration cap reached; report as not established
        None
    }

    /// Drive remaining zero-valued artificials out of the basis, or drop
    /// their rows when redundant.
    fn evict_artificials(&mut self) -> Option<()> {
        let mut r = 0;
        while r < self.num_con {
            let j = self.tab[(2 + r, COL_BASIC)] as usize;
            if j < self.num_vars {
                r += 1;
                continue;
            }
            debug_assert_eq!(self.tab[(2 + r, COL_RHS)], 0);
            let mut entered = false;
            for v in 0..self.num_vars {
                let c = COL_VAR0 + v;
                if self.tab[(0, c)] == 0 && self.tab[(2 + r, c)] != 0 {
                    // a degenerate pivot: the row's value is zero, so a
                    // negative pivot entry is fine after renormalizing
                    self.pivot(r, c)?;
                    entered = true;
                    break;
                }
            }
            if !entered {
                self.remove_constraint_row(r);
            } else {
                r += 1;
            }
        }
        Some(())
    }

    fn remove_constraint_row(&mut self, r: usize) {
        let j = self.tab[(2 + r, COL_BASIC)] as usize;
        self.tab[(0, COL_VAR0 + j)] = 0;
        self.tab.remove_row(2 + r);
        self.num_con -= 1;
        // markers after the removed row shift down by one
        for k in r..self.num_con {
            let v = self.tab[(2 + k, COL_BASIC)] as usize;
            self.tab[(0, COL_VAR0 + v)] = 1 + k as i64;
        }
    }
}

fn to_i64(v: i128) -> Option<i64> {
    if v >= i64::MIN as i128 && v <= i64::MAX as i128 {
        Some(v as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivially_feasible() {
        let a: Matrix<i64> = "[5 1 0; 7 0 1]".parse().unwrap();
        let e: Matrix<i64> = Matrix::zeroed(0, 3);
        let s = Simplex::positive_variables(&a, &e).unwrap();
        assert!(s.is_feasible());
        assert_eq!(s.num_variables(), 4);
    }

    #[test]
    fn contradictory_equalities() {
        // x == 1 and x == 2
        let a: Matrix<i64> = Matrix::zeroed(0, 2);
        let e: Matrix<i64> = "[1 1; 2 1]".parse().unwrap();
        assert!(Simplex::positive_variables(&a, &e).is_none());
    }

    #[test]
    fn negative_bound_infeasible() {
        // x <= -1 with x >= 0
        let a: Matrix<i64> = "[-1 1]".parse().unwrap();
        let e: Matrix<i64> = Matrix::zeroed(0, 2);
        assert!(Simplex::positive_variables(&a, &e).is_none());
    }

    #[test]
    fn equality_pins_value() {
        // x + y == 4, x <= 1
        let a: Matrix<i64> = "[1 1 0]".parse().unwrap();
        let e: Matrix<i64> = "[4 1 1]".parse().unwrap();
        let mut s = Simplex::positive_variables(&a, &e).unwrap();
        // maximize x: cost = -x
        let nv = s.num_variables();
        {
            let cost = s.cost_mut();
            for c in cost.iter_mut() {
                *c = 0;
            }
            cost[nv - 2] = -1;
        }
        let opt = s.run().unwrap();
        assert_eq!(opt, Rational::integer(1));
    }
}
