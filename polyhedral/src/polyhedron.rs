//! Polyhedra `A·x <= b ∧ E·x == q` with symbolic right-hand sides.
//!
//! Rows of `a`/`e` are integer constraint coefficients over the loop
//! variables; the right-hand sides are multivariate polynomials in the
//! program symbols. Destructive reduction walks the state machine
//! `Dirty -> Simplified -> Pruned`; operations that read bounds
//! re-achieve `Pruned` lazily.

use crate::comparator::SymbolicComparator;
use crate::poset::PartiallyOrderedSet;
use crate::symbolics::{fnmadd, MPoly};
use intlin::gcd::{gcd, gcd_slice};
use intlin::Matrix;
use itertools::Itertools;
use tracing::debug;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ReductionState {
    Dirty,
    Simplified,
    Pruned,
}

#[derive(Clone)]
pub struct Polyhedron {
    a: Matrix<i64>,
    b: Vec<MPoly>,
    e: Matrix<i64>,
    q: Vec<MPoly>,
    poset: PartiallyOrderedSet,
    state: ReductionState,
}

// -- row-level helpers -------------------------------------------------------

/// Swap-remove constraint `i` from a system.
fn erase_constraint(a: &mut Matrix<i64>, b: &mut Vec<MPoly>, i: usize) {
    let last = a.num_rows() - 1;
    if i != last {
        a.swap_rows(i, last);
        b.swap(i, last);
    }
    a.truncate_rows(last);
    b.truncate(last);
}

fn drop_empty_constraints(a: &mut Matrix<i64>, b: &mut Vec<MPoly>) {
    let mut c = b.len();
    while c != 0 {
        c -= 1;
        if a.row_is_zero(c) {
            erase_constraint(a, b, c);
        }
    }
}

/// Divide every row by the gcd of its coefficients and its right-hand
/// side's content; rows that vanish entirely are erased.
fn div_by_gcd_drop_zeros(a: &mut Matrix<i64>, b: &mut Vec<MPoly>) {
    let mut c = b.len();
    while c != 0 {
        c -= 1;
        let mut g = b[c].content();
        if g == 1 {
            continue;
        }
        for v in 0..a.num_cols() {
            let acv = a[(c, v)];
            if acv != 0 {
                if acv.abs() == 1 {
                    g = 1;
                    break;
                }
                g = gcd(g, acv);
            }
        }
        if g == 0 {
            erase_constraint(a, b, c);
        } else if g > 1 {
            b[c].divide_content(g);
            for v in 0..a.num_cols() {
                a[(c, v)] /= g;
            }
        }
    }
}

fn count_signs(a: &Matrix<i64>, i: usize) -> (usize, usize) {
    let mut neg = 0;
    let mut pos = 0;
    for j in 0..a.num_rows() {
        let v = a[(j, i)];
        neg += (v < 0) as usize;
        pos += (v > 0) as usize;
    }
    (neg, pos)
}

/// Does this row constrain only variable `i`?
fn independent_of_inner(row: &[i64], i: usize) -> bool {
    row.iter()
        .enumerate()
        .all(|(j, &v)| v == 0 || j == i)
}

/// The two rows touch at most one auxiliary column in total; such pairs
/// only compare auxiliaries with each other and carry no information.
fn different_auxiliaries(lo: &[i64], up: &[i64], start: usize) -> bool {
    let mut count = 0;
    for k in start..lo.len() {
        count += (lo[k] != 0 || up[k] != 0) as usize;
    }
    count <= 1
}

/// Combine a lower row (`cl < 0` at `i`) and an upper row (`cu > 0`) so
/// variable `i` cancels; returns `None` when the combination is zero.
fn set_bounds(
    lo: &[i64],
    lb: &MPoly,
    up: &[i64],
    ub: &MPoly,
    i: usize,
) -> Option<(Vec<i64>, MPoly)> {
    let cu = up[i];
    let cl = lo[i];
    let mut bb = lb * cu;
    fnmadd(&mut bb, ub, cl);
    let mut row: Vec<i64> = Vec::with_capacity(lo.len());
    for n in 0..lo.len() {
        row.push(cu * lo[n] - cl * up[n]);
    }
    row[i] = 0;
    if row.iter().any(|&v| v != 0) {
        Some((row, bb))
    } else {
        None
    }
}

/// Fourier-Motzkin elimination of variable `i`. Columns at and past
/// `num_base` are auxiliary bound-difference variables; pairs that only
/// relate different auxiliaries are dropped.
fn eliminate_variable_impl(
    a_old: &Matrix<i64>,
    b_old: &[MPoly],
    i: usize,
    num_base: usize,
) -> (Matrix<i64>, Vec<MPoly>) {
    let (ncon, nvar) = (a_old.num_rows(), a_old.num_cols());
    let mut a = Matrix::zeroed(0, nvar);
    let mut b: Vec<MPoly> = Vec::new();
    for j in 0..ncon {
        if a_old[(j, i)] == 0 {
            a.push_row(a_old.row(j));
            b.push(b_old[j].clone());
        }
    }
    for u in 0..ncon {
        if a_old[(u, i)] <= 0 {
            continue;
        }
        let up = a_old.row(u);
        let up_independent = independent_of_inner(up, i);
        for l in 0..ncon {
            if a_old[(l, i)] >= 0 {
                continue;
            }
            let lo = a_old.row(l);
            if (up_independent && independent_of_inner(lo, i))
                || (num_base < nvar && different_auxiliaries(lo, up, num_base))
            {
                continue;
            }
            if let Some((row, bb)) = set_bounds(lo, &b_old[l], up, &b_old[u], i) {
                a.push_row(&row);
                b.push(bb);
            }
        }
    }
    (a, b)
}

impl Polyhedron {
    pub fn new(a: Matrix<i64>, b: Vec<MPoly>) -> Polyhedron {
        debug_assert_eq!(a.num_rows(), b.len());
        let cols = a.num_cols();
        Polyhedron {
            a,
            b,
            e: Matrix::zeroed(0, cols),
            q: Vec::new(),
            poset: PartiallyOrderedSet::new(),
            state: ReductionState::Dirty,
        }
    }

    pub fn with_equalities(
        a: Matrix<i64>,
        b: Vec<MPoly>,
        e: Matrix<i64>,
        q: Vec<MPoly>,
    ) -> Polyhedron {
        debug_assert_eq!(a.num_rows(), b.len());
        debug_assert_eq!(e.num_rows(), q.len());
        debug_assert!(e.num_rows() == 0 || e.num_cols() == a.num_cols());
        Polyhedron {
            a,
            b,
            e,
            q,
            poset: PartiallyOrderedSet::new(),
            state: ReductionState::Dirty,
        }
    }

    pub fn with_poset(mut self, poset: PartiallyOrderedSet) -> Polyhedron {
        self.poset = poset;
        self
    }

    pub fn num_loops(&self) -> usize {
        self.a.num_cols()
    }

    pub fn num_inequalities(&self) -> usize {
        self.a.num_rows()
    }

    pub fn num_equalities(&self) -> usize {
        self.e.num_rows()
    }

    pub fn inequalities(&self) -> (&Matrix<i64>, &[MPoly]) {
        (&self.a, &self.b)
    }

    pub fn equalities(&self) -> (&Matrix<i64>, &[MPoly]) {
        (&self.e, &self.q)
    }

    pub fn poset(&self) -> &PartiallyOrderedSet {
        &self.poset
    }

    pub fn poset_mut(&mut self) -> &mut PartiallyOrderedSet {
        &mut self.poset
    }

    pub fn state(&self) -> ReductionState {
        self.state
    }

    pub fn known_greater_equal_zero(&self, p: &MPoly) -> bool {
        self.poset.known_greater_equal_zero(p)
    }

    pub fn known_less_equal_zero(&self, p: &MPoly) -> bool {
        self.poset.known_less_equal_zero(p)
    }

    /// Fourier-Motzkin eliminate variable `i` from the inequalities.
    pub fn eliminate_variable(&mut self, i: usize) {
        let (a, b) = eliminate_variable_impl(&self.a, &self.b, i, self.a.num_cols());
        debug!(
            var = i,
            before = self.b.len(),
            after = b.len(),
            "fourier-motzkin elimination"
        );
        self.a = a;
        self.b = b;
        div_by_gcd_drop_zeros(&mut self.a, &mut self.b);
        self.state = ReductionState::Dirty;
    }

    /// Remove variable `i` entirely: substitute it away through an
    /// equality when one involves it, otherwise project by
    /// Fourier-Motzkin; the column is dropped afterwards.
    pub fn remove_variable(&mut self, i: usize) {
        if !self.substitute_equality(i) {
            self.eliminate_variable(i);
        }
        self.a.remove_col(i);
        if i < self.e.num_cols() {
            self.e.remove_col(i);
        }
        self.state = ReductionState::Dirty;
    }

    /// Substitute away variable `i` using the equality row with the
    /// fewest non-zero entries. Returns `false` when no equality
    /// involves `i`.
    pub fn substitute_equality(&mut self, i: usize) -> bool {
        let nrows = self.e.num_rows();
        let ncols = self.e.num_cols();
        let mut pivot = nrows;
        let mut min_nonzero = ncols + 1;
        for j in 0..nrows {
            if self.e[(j, i)] != 0 {
                let nz = (0..ncols).filter(|&v| self.e[(j, v)] != 0).count();
                if nz < min_nonzero {
                    min_nonzero = nz;
                    pivot = j;
                }
            }
        }
        if pivot == nrows {
            return false;
        }
        let eis = self.e[(pivot, i)];
        let s = if eis > 0 { 1 } else { -1 };
        // inequalities scale by the sign of the pivot so direction holds
        for j in 0..self.a.num_rows() {
            let aij = self.a[(j, i)];
            if aij != 0 {
                let g = gcd(aij, eis);
                let ag = (s * aij) / g;
                let eg = (s * eis) / g;
                for v in 0..ncols {
                    self.a[(j, v)] = eg * self.a[(j, v)] - ag * self.e[(pivot, v)];
                }
                self.b[j] *= eg;
                fnmadd(&mut self.b[j], &self.q[pivot], ag);
            }
        }
        for j in 0..nrows {
            if j == pivot {
                continue;
            }
            let eij = self.e[(j, i)];
            if eij != 0 {
                let g = gcd(eij, eis);
                let ag = eij / g;
                let eg = eis / g;
                for v in 0..ncols {
                    self.e[(j, v)] = eg * self.e[(j, v)] - ag * self.e[(pivot, v)];
                }
                self.q[j] *= eg;
                let qpivot = self.q[pivot].clone();
                fnmadd(&mut self.q[j], &qpivot, ag);
            }
        }
        erase_constraint(&mut self.e, &mut self.q, pivot);
        self.state = ReductionState::Dirty;
        true
    }

    /// Split the inequalities into lower and upper bounds on variable
    /// `i`; requires the `Pruned` state, re-achieved lazily.
    pub fn bounds(&mut self, i: usize) -> (Matrix<i64>, Vec<MPoly>, Matrix<i64>, Vec<MPoly>) {
        self.ensure_pruned();
        fill_bounds(&self.a, &self.b, i)
    }

    /// Emit the convex combinations of the given lower/upper bounds back
    /// into the system.
    pub fn append_bounds(
        &mut self,
        la: &Matrix<i64>,
        lb: &[MPoly],
        ua: &Matrix<i64>,
        ub: &[MPoly],
        i: usize,
    ) {
        for l in 0..la.num_rows() {
            for u in 0..ua.num_rows() {
                if let Some((row, bb)) = set_bounds(la.row(l), &lb[l], ua.row(u), &ub[u], i) {
                    self.a.push_row(&row);
                    self.b.push(bb);
                }
            }
        }
        self.state = ReductionState::Dirty;
    }

    /// Normalize rows, drop trivial and duplicate constraints, and move
    /// negation pairs of inequalities into the equality system.
    pub fn simplify(&mut self) {
        drop_empty_constraints(&mut self.a, &mut self.b);
        div_by_gcd_drop_zeros(&mut self.a, &mut self.b);
        self.dedup_inequalities();
        self.move_equalities();
        // equality rows are kept non-zero and gcd-normalized
        let mut c = self.q.len();
        while c != 0 {
            c -= 1;
            if self.e.row_is_zero(c) && self.q[c].is_zero() {
                erase_constraint(&mut self.e, &mut self.q, c);
                continue;
            }
            let g = {
                let mut g = self.q[c].content();
                for v in 0..self.e.num_cols() {
                    g = gcd(g, self.e[(c, v)]);
                }
                g
            };
            if g > 1 {
                self.q[c].divide_content(g);
                for v in 0..self.e.num_cols() {
                    self.e[(c, v)] /= g;
                }
            }
        }
        if self.state == ReductionState::Dirty {
            self.state = ReductionState::Simplified;
        }
    }

    fn dedup_inequalities(&mut self) {
        let mut j = 0;
        while j < self.a.num_rows() {
            let mut k = j + 1;
            while k < self.a.num_rows() {
                if self.a.row(j) == self.a.row(k) && self.b[j] == self.b[k] {
                    erase_constraint(&mut self.a, &mut self.b, k);
                } else {
                    k += 1;
                }
            }
            j += 1;
        }
    }

    /// Inequality pairs `a·x <= b` and `-a·x <= -b` are an equality.
    fn move_equalities(&mut self) {
        let nvar = self.a.num_cols();
        let mut i = 0;
        'outer: while i < self.a.num_rows() {
            for j in i + 1..self.a.num_rows() {
                let negated = (0..nvar).all(|v| self.a[(i, v)] == -self.a[(j, v)]);
                if negated {
                    let mut sum = self.b[i].clone();
                    sum += &self.b[j];
                    if sum.is_zero() {
                        let row: Vec<i64> = self.a.row(j).to_vec();
                        self.e.push_row(&row);
                        self.q.push(self.b[j].clone());
                        erase_constraint(&mut self.a, &mut self.b, j);
                        erase_constraint(&mut self.a, &mut self.b, i);
                        continue 'outer;
                    }
                }
            }
            i += 1;
        }
    }

    /// Discard dominated bounds on every variable.
    pub fn prune_bounds(&mut self) {
        if self.state == ReductionState::Dirty {
            self.simplify();
        }
        for i in 0..self.a.num_cols() {
            self.prune_bounds_var(i);
        }
        self.state = ReductionState::Pruned;
    }

    fn ensure_pruned(&mut self) {
        if self.state != ReductionState::Pruned {
            self.prune_bounds();
        }
    }

    fn prune_bounds_var(&mut self, i: usize) {
        let (num_neg, num_pos) = count_signs(&self.a, i);
        if num_neg <= 1 && num_pos <= 1 {
            return;
        }
        let num_var_base = self.a.num_cols();
        // does any bound on `i` couple in another variable?
        let mut dep: Option<usize> = None;
        for j in 0..self.a.num_rows() {
            if self.a[(j, i)] != 0 {
                for k in 0..num_var_base {
                    if k != i && self.a[(j, k)] != 0 {
                        dep = Some(k);
                    }
                }
                if dep.is_some() {
                    break;
                }
            }
        }
        let mut rows_to_erase: Vec<usize> = Vec::new();
        if let Some(first_dep) = dep {
            self.prune_coupled_bounds(i, num_neg, num_pos, first_dep, &mut rows_to_erase);
        } else {
            let ncon = self.a.num_rows();
            for (j, k) in (0..ncon).tuple_combinations() {
                let aij = self.a[(j, i)];
                let aik = self.a[(k, i)];
                if aij != 0 && aik != 0 && (aik > 0) == (aij > 0) {
                    // delta = |a_ji| b_k - |a_ki| b_j; its sign says
                    // which of the two parallel bounds dominates
                    let mut delta = &self.b[k] * aij.abs();
                    fnmadd(&mut delta, &self.b[j], aik.abs());
                    if self.poset.known_greater_equal_zero(&delta) {
                        rows_to_erase.push(k);
                    } else if self.poset.known_less_equal_zero(&delta) {
                        rows_to_erase.push(j);
                    }
                }
            }
        }
        self.erase_unique(&mut rows_to_erase);
    }

    /// Bounds on `i` involve other variables: introduce one
    /// bound-difference variable per same-sign pair, eliminate the
    /// coupled variables, and read the surviving single-auxiliary rows
    /// for proven dominations.
    fn prune_coupled_bounds(
        &mut self,
        i: usize,
        num_neg: usize,
        num_pos: usize,
        first_dep: usize,
        rows_to_erase: &mut Vec<usize>,
    ) {
        let bin2 = |n: usize| n * n.saturating_sub(1) / 2;
        let num_var_base = self.a.num_cols();
        let num_aux = bin2(num_neg) + bin2(num_pos);
        let num_vars = num_var_base + num_aux;
        let ncon = self.a.num_rows();
        let mut a_ext: Matrix<i64> = Matrix::zeroed(ncon, num_vars);
        let mut b_ext: Vec<MPoly> = self.b.clone();
        for j in 0..ncon {
            for v in 0..num_var_base {
                a_ext[(j, v)] = self.a[(j, v)];
            }
        }
        let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(num_aux);
        for j in 0..ncon {
            let aij = self.a[(j, i)];
            if aij == 0 {
                continue;
            }
            for d in j + 1..ncon {
                let aid = self.a[(d, i)];
                if aid != 0 && (aid > 0) == (aij > 0) {
                    let abs_aij = aij.abs();
                    let abs_aid = aid.abs();
                    // the difference of the two scaled bounds becomes a
                    // fresh variable, constrained from both sides
                    let new_var = num_var_base + pairs.len();
                    let mut row0: Vec<i64> = vec![0; num_vars];
                    let mut row1: Vec<i64> = vec![0; num_vars];
                    for l in 0..num_var_base {
                        let alc = abs_aid * self.a[(j, l)] - abs_aij * self.a[(d, l)];
                        row0[l] = alc;
                        row1[l] = -alc;
                    }
                    row0[new_var] = 1;
                    row1[new_var] = -1;
                    let mut delta = &self.b[d] * abs_aij;
                    fnmadd(&mut delta, &self.b[j], abs_aid);
                    a_ext.push_row(&row0);
                    b_ext.push(-delta.clone());
                    a_ext.push_row(&row1);
                    b_ext.push(delta);
                    pairs.push((j, d));
                }
            }
        }
        let mut proven: Vec<i8> = vec![0; num_aux];
        let mut dep = Some(first_dep);
        while let Some(k) = dep {
            let (a_new, b_new) = eliminate_variable_impl(&a_ext, &b_ext, k, num_var_base);
            a_ext = a_new;
            b_ext = b_new;
            dep = None;
            let mut local_erase: Vec<usize> = Vec::new();
            'rows: for j in 0..a_ext.num_rows() {
                for aux in num_var_base..num_vars {
                    let akj = a_ext[(j, aux)];
                    if akj == 0 {
                        continue;
                    }
                    for l in 0..num_var_base {
                        if a_ext[(j, l)] != 0 {
                            dep = Some(l);
                            continue 'rows;
                        }
                    }
                    // the row involves only this auxiliary
                    if self.poset.known_less_equal_zero(&b_ext[j]) {
                        proven[aux - num_var_base] = if akj > 0 { -1 } else { 1 };
                    }
                    if local_erase.last() != Some(&j) {
                        local_erase.push(j);
                    }
                }
            }
            for &row in local_erase.iter().rev() {
                a_ext.remove_row(row);
                b_ext.remove(row);
            }
        }
        for (l, &flag) in proven.iter().enumerate() {
            if flag != 0 {
                let (j, d) = pairs[l];
                rows_to_erase.push(if flag == 1 { j } else { d });
            }
        }
        debug!(var = i, erased = rows_to_erase.len(), "pruned coupled bounds");
    }

    fn erase_unique(&mut self, rows: &mut Vec<usize>) {
        rows.sort_unstable();
        rows.dedup();
        for &r in rows.iter().rev() {
            self.a.remove_row(r);
            self.b.remove(r);
        }
    }

    /// Project onto the first `keep` variables through a slack-variable
    /// equality system: `C = [I A; 0 E]` with `C·[s; x] = [b; q]`, then
    /// substitute away the dropped variables and read the surviving
    /// constraints back off.
    pub fn remove_extra_variables(&mut self, keep: usize) {
        let m = self.a.num_rows();
        let n = self.a.num_cols();
        let k = self.e.num_rows();
        debug_assert!(keep <= n);
        let mut c_mat: Matrix<i64> = Matrix::zeroed(m + k, m + n);
        let mut d: Vec<MPoly> = Vec::with_capacity(m + k);
        for i in 0..m {
            c_mat[(i, i)] = 1;
            for j in 0..n {
                c_mat[(i, m + j)] = self.a[(i, j)];
            }
            d.push(self.b[i].clone());
        }
        for i in 0..k {
            for j in 0..n {
                c_mat[(m + i, m + j)] = self.e[(i, j)];
            }
            d.push(self.q[i].clone());
        }
        let mut o = m + n;
        while o > keep + m {
            o -= 1;
            substitute_equality_system(&mut c_mat, &mut d, o);
            if c_mat.num_rows() > 1 {
                simplify_equalities(&mut c_mat, &mut d);
            }
        }
        // constraints with a slack pivot become inequalities again; any
        // surviving pure-variable rows are equalities
        let mut new_a: Matrix<i64> = Matrix::zeroed(0, keep);
        let mut new_b: Vec<MPoly> = Vec::new();
        let mut i = 0;
        let mut nc = 0;
        while i < m && nc < c_mat.num_rows() && new_b.len() < m {
            let ci = c_mat[(nc, i)];
            i += 1;
            if ci == 0 {
                continue;
            }
            let mut other_negative = false;
            for j in i..m {
                other_negative |= c_mat[(nc, j)] < 0;
            }
            if other_negative {
                nc += 1;
                continue;
            }
            let row: Vec<i64> = (0..keep).map(|v| c_mat[(nc, m + v)]).collect();
            let duplicate = (0..new_a.num_rows()).any(|r| new_a.row(r) == &row[..]);
            if duplicate {
                nc += 1;
                continue;
            }
            new_a.push_row(&row);
            new_b.push(d[nc].clone());
            nc += 1;
        }
        let mut new_e: Matrix<i64> = Matrix::zeroed(0, keep);
        let mut new_q: Vec<MPoly> = Vec::new();
        for r in nc..c_mat.num_rows() {
            let row: Vec<i64> = (0..keep).map(|v| c_mat[(r, m + v)]).collect();
            if row.iter().any(|&v| v != 0) {
                new_e.push_row(&row);
                new_q.push(d[r].clone());
            }
        }
        self.a = new_a;
        self.b = new_b;
        self.e = new_e;
        self.q = new_q;
        drop_empty_constraints(&mut self.a, &mut self.b);
        div_by_gcd_drop_zeros(&mut self.a, &mut self.b);
        self.state = ReductionState::Dirty;
    }

    /// Integer layout `[1 | symbols | variables]` of the system, when
    /// all right-hand sides are affine in the symbols.
    fn integerize(&self) -> Option<(Matrix<i64>, Matrix<i64>, usize)> {
        let mut nsym = self.poset.num_symbols().saturating_sub(1);
        for p in self.b.iter().chain(self.q.iter()) {
            for t in p.terms() {
                if t.mono.degree() > 1 {
                    return None;
                }
                if let Some(v) = t.mono.first_id() {
                    nsym = nsym.max(v as usize);
                }
            }
        }
        let nvar = self.a.num_cols();
        let width = 1 + nsym + nvar;
        let sym_row = |p: &MPoly, coeffs: &[i64], flip: i64| -> Vec<i64> {
            let mut row = vec![0i64; width];
            row[0] = p.constant_term();
            for t in p.terms() {
                if let Some(v) = t.mono.first_id() {
                    row[v as usize] = t.coef;
                }
            }
            for (j, &c) in coeffs.iter().enumerate() {
                row[1 + nsym + j] = flip * c;
            }
            row
        };
        // b - a·x >= 0 per inequality row
        let mut ai: Matrix<i64> = Matrix::zeroed(0, width);
        for j in 0..self.a.num_rows() {
            ai.push_row(&sym_row(&self.b[j], self.a.row(j), -1));
        }
        // symbol ranges known to the poset become inequality rows too
        for s in 1..=nsym {
            let itv = self.poset.range(s);
            if itv.lo != i64::MIN && itv.lo.abs() < i64::MAX >> 2 {
                let mut row = vec![0i64; width];
                row[0] = -itv.lo;
                row[s] = 1;
                ai.push_row(&row);
            }
            if itv.hi != i64::MAX && itv.hi.abs() < i64::MAX >> 2 {
                let mut row = vec![0i64; width];
                row[0] = itv.hi;
                row[s] = -1;
                ai.push_row(&row);
            }
        }
        let mut ei: Matrix<i64> = Matrix::zeroed(0, width);
        for j in 0..self.e.num_rows() {
            ei.push_row(&sym_row(&self.q[j], self.e.row(j), -1));
        }
        Some((ai, ei, nsym))
    }

    /// Infeasibility, decided through the comparator; `false` also
    /// covers "not known empty" (for instance non-affine bounds).
    pub fn is_empty(&self) -> bool {
        match self.integerize() {
            None => false,
            Some((ai, ei, nsym)) => {
                let cmp = SymbolicComparator::with_equalities(&ai, &ei, true)
                    .with_poset(self.poset.clone(), nsym);
                cmp.is_empty()
            }
        }
    }
}

/// Partition the rows into lower bounds (negative coefficient at `i`)
/// and upper bounds (positive coefficient).
pub fn fill_bounds(
    a: &Matrix<i64>,
    b: &[MPoly],
    i: usize,
) -> (Matrix<i64>, Vec<MPoly>, Matrix<i64>, Vec<MPoly>) {
    let n = a.num_cols();
    let mut la: Matrix<i64> = Matrix::zeroed(0, n);
    let mut lb: Vec<MPoly> = Vec::new();
    let mut ua: Matrix<i64> = Matrix::zeroed(0, n);
    let mut ub: Vec<MPoly> = Vec::new();
    for j in 0..a.num_rows() {
        let aij = a[(j, i)];
        if aij > 0 {
            ua.push_row(a.row(j));
            ub.push(b[j].clone());
        } else if aij < 0 {
            la.push_row(a.row(j));
            lb.push(b[j].clone());
        }
    }
    (la, lb, ua, ub)
}

/// Substitute variable-column `col` away using the row of the equality
/// system `C·y = d` with the fewest nonzeros there.
fn substitute_equality_system(c: &mut Matrix<i64>, d: &mut Vec<MPoly>, col: usize) {
    let nrows = c.num_rows();
    let ncols = c.num_cols();
    let mut pivot = nrows;
    let mut min_nonzero = ncols + 1;
    for j in 0..nrows {
        if c[(j, col)] != 0 {
            let nz = (0..ncols).filter(|&v| c[(j, v)] != 0).count();
            if nz < min_nonzero {
                min_nonzero = nz;
                pivot = j;
            }
        }
    }
    if pivot == nrows {
        return;
    }
    let eis = c[(pivot, col)];
    for j in 0..nrows {
        if j == pivot {
            continue;
        }
        let eij = c[(j, col)];
        if eij != 0 {
            let g = gcd(eij, eis);
            let ag = eij / g;
            let eg = eis / g;
            for v in 0..ncols {
                c[(j, v)] = eg * c[(j, v)] - ag * c[(pivot, v)];
            }
            d[j] *= eg;
            let dpivot = d[pivot].clone();
            fnmadd(&mut d[j], &dpivot, ag);
        }
    }
    let last = nrows - 1;
    if pivot != last {
        c.swap_rows(pivot, last);
        d.swap(pivot, last);
    }
    c.truncate_rows(last);
    d.truncate(last);
}

/// Row echelon on an integer equality system with polynomial right-hand
/// sides; rows that vanish on both sides are dropped.
fn simplify_equalities(c: &mut Matrix<i64>, d: &mut Vec<MPoly>) {
    let ncols = c.num_cols();
    let mut r = 0;
    for col in 0..ncols {
        if r >= c.num_rows() {
            break;
        }
        let mut piv = r;
        while piv < c.num_rows() && c[(piv, col)] == 0 {
            piv += 1;
        }
        if piv == c.num_rows() {
            continue;
        }
        if piv != r {
            c.swap_rows(piv, r);
            d.swap(piv, r);
        }
        for j in 0..c.num_rows() {
            if j == r {
                continue;
            }
            let cjc = c[(j, col)];
            if cjc != 0 {
                let crc = c[(r, col)];
                let g = gcd(crc, cjc);
                let cr = crc / g;
                let cj = cjc / g;
                for v in 0..ncols {
                    c[(j, v)] = cr * c[(j, v)] - cj * c[(r, v)];
                }
                d[j] *= cr;
                let dr = d[r].clone();
                fnmadd(&mut d[j], &dr, cj);
                let mut g2 = d[j].content();
                g2 = gcd(g2, gcd_slice(c.row(j)));
                if g2 > 1 {
                    d[j].divide_content(g2);
                    for v in 0..ncols {
                        c[(j, v)] /= g2;
                    }
                }
            }
        }
        r += 1;
    }
    let mut row = c.num_rows();
    while row != 0 {
        row -= 1;
        if c.row_is_zero(row) && d[row].is_zero() {
            let last = c.num_rows() - 1;
            if row != last {
                c.swap_rows(row, last);
                d.swap(row, last);
            }
            c.truncate_rows(last);
            d.truncate(last);
        }
    }
}
