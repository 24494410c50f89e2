//! Dependence polyhedra for pairs of affine array accesses.
//!
//! Two references into the same array depend on each other when some
//! pair of iteration vectors `(i, i')` lies in both loop nests, touches
//! the same element, and is ordered by the schedule. [`Dependence::check`]
//! assembles that system per candidate split depth and direction and
//! decides feasibility with the simplex; [`farkas_schedule_gap`]
//! dualizes a dependence polyhedron into the space of schedule
//! coefficients.

use crate::loop_nest::{LoopNestArena, LoopNestId};
use crate::polyhedron::Polyhedron;
use crate::simplex::Simplex;
use crate::symbolics::MPoly;
use intlin::Matrix;
use tracing::debug;

/// One affine subscript `coeffs·i + offset` of an array reference.
#[derive(Clone, Debug)]
pub struct Subscript {
    pub coeffs: Vec<i64>,
    pub offset: MPoly,
}

impl Subscript {
    pub fn new(coeffs: Vec<i64>, offset: MPoly) -> Subscript {
        Subscript { coeffs, offset }
    }
}

/// A reference into `array` from within a loop nest, one subscript per
/// array dimension.
#[derive(Clone)]
pub struct ArrayReference {
    pub array: usize,
    pub nest: LoopNestId,
    pub subscripts: Vec<Subscript>,
}

impl ArrayReference {
    pub fn new(array: usize, nest: LoopNestId, subscripts: Vec<Subscript>) -> ArrayReference {
        ArrayReference {
            array,
            nest,
            subscripts,
        }
    }

    /// One past the deepest loop any subscript reads.
    fn subscript_depth(&self) -> usize {
        let mut depth = 0;
        for s in &self.subscripts {
            for (k, &c) in s.coeffs.iter().enumerate() {
                if c != 0 {
                    depth = depth.max(k + 1);
                }
            }
        }
        depth
    }
}

/// Where an access sits in its nest: a per-loop coefficient matrix and
/// the interleaving offsets (`2n + 1` of them, one around each level).
#[derive(Clone)]
pub struct Schedule {
    phi: Matrix<i64>,
    omega: Vec<i64>,
}

impl Schedule {
    /// All-zero schedule for a nest of `num_loops` levels.
    pub fn new(num_loops: usize) -> Schedule {
        Schedule {
            phi: Matrix::zeroed(num_loops, num_loops),
            omega: vec![0; 2 * num_loops + 1],
        }
    }

    /// The textual-order schedule: identity loop coefficients.
    pub fn identity(num_loops: usize) -> Schedule {
        Schedule {
            phi: Matrix::identity(num_loops),
            omega: vec![0; 2 * num_loops + 1],
        }
    }

    pub fn num_loops(&self) -> usize {
        self.phi.num_rows()
    }

    pub fn phi(&self) -> &Matrix<i64> {
        &self.phi
    }

    pub fn phi_mut(&mut self) -> &mut Matrix<i64> {
        &mut self.phi
    }

    pub fn omega(&self) -> &[i64] {
        &self.omega
    }

    pub fn omega_mut(&mut self) -> &mut [i64] {
        &mut self.omega
    }
}

/// An access participating in dependence analysis.
#[derive(Clone)]
pub struct MemoryAccess {
    pub array_ref: ArrayReference,
    pub schedule: Schedule,
    pub is_load: bool,
}

impl MemoryAccess {
    pub fn new(array_ref: ArrayReference, schedule: Schedule, is_load: bool) -> MemoryAccess {
        MemoryAccess {
            array_ref,
            schedule,
            is_load,
        }
    }
}

/// A discovered dependence relation between two accesses.
pub struct Dependence {
    /// Polyhedron over `(i, i')` (source iterations first).
    pub poly: Polyhedron,
    pub src_schedule: Schedule,
    pub tgt_schedule: Schedule,
    /// Source before target in the split direction.
    pub forward: bool,
    /// Loops below this depth iterate in lockstep.
    pub depth: usize,
}

impl Dependence {
    /// Discover the dependence relations between `src` and `tgt`,
    /// appending them to `sink`; returns how many were found. At most
    /// one forward and one backward relation are recorded, each at its
    /// shallowest feasible depth.
    pub fn check(
        sink: &mut Vec<Dependence>,
        arena: &LoopNestArena,
        src: &MemoryAccess,
        tgt: &MemoryAccess,
    ) -> usize {
        if src.array_ref.array != tgt.array_ref.array
            || src.array_ref.subscripts.len() != tgt.array_ref.subscripts.len()
        {
            return 0;
        }
        let nest_s = arena.get(src.array_ref.nest);
        let nest_t = arena.get(tgt.array_ref.nest);
        let n1 = nest_s.num_loops();
        let n2 = nest_t.num_loops();
        let common = n1.min(n2);
        // a split below the deepest subscript-relevant loop varies only
        // loops the address ignores; such splits are uninformative
        let sub_depth = src
            .array_ref
            .subscript_depth()
            .max(tgt.array_ref.subscript_depth());
        let mut found = 0;
        let mut found_forward = false;
        let mut found_backward = false;
        for d in 0..common.min(sub_depth) {
            if !found_forward && Self::direction_feasible(arena, src, tgt, d, true) {
                sink.push(Self::assemble(arena, src, tgt, d, true));
                found_forward = true;
                found += 1;
            }
            if !found_backward && Self::direction_feasible(arena, src, tgt, d, false) {
                sink.push(Self::assemble(arena, src, tgt, d, false));
                found_backward = true;
                found += 1;
            }
            if found_forward && found_backward {
                break;
            }
        }
        // equal iteration vectors: only program order can separate them
        if !found_forward && n1 == n2 && omega_precedes(&src.schedule, &tgt.schedule) {
            if Self::direction_feasible(arena, src, tgt, common, true) {
                sink.push(Self::assemble(arena, src, tgt, common, true));
                found += 1;
            }
        }
        debug!(
            array = src.array_ref.array,
            found, "dependence check finished"
        );
        found
    }

    /// Feasibility of the dependence system at a given split.
    fn direction_feasible(
        arena: &LoopNestArena,
        src: &MemoryAccess,
        tgt: &MemoryAccess,
        depth: usize,
        forward: bool,
    ) -> bool {
        let nest_s = arena.get(src.array_ref.nest);
        let nest_t = arena.get(tgt.array_ref.nest);
        let n1 = nest_s.num_loops();
        let n2 = nest_t.num_loops();
        let nsym = symbol_count(arena, src, tgt);
        let width = 1 + nsym + n1 + n2;
        let mut ai: Matrix<i64> = Matrix::zeroed(0, width);
        let mut ei: Matrix<i64> = Matrix::zeroed(0, width);

        // both loop nests, over disjoint variable blocks
        let mut push_nest = |m: &mut Matrix<i64>, nest: &Polyhedron, offset: usize| {
            let (a, b) = nest.inequalities();
            for r in 0..a.num_rows() {
                if let Some(mut row) = affine_row(&b[r], nsym, width) {
                    for (j, &c) in a.row(r).iter().enumerate() {
                        row[1 + nsym + offset + j] = c;
                    }
                    m.push_row(&row);
                }
            }
        };
        push_nest(&mut ai, nest_s.polyhedron(), 0);
        push_nest(&mut ai, nest_t.polyhedron(), n1);

        // equal subscripts, dimension by dimension
        for (ss, st) in src
            .array_ref
            .subscripts
            .iter()
            .zip(tgt.array_ref.subscripts.iter())
        {
            let mut diff = st.offset.clone();
            diff -= &ss.offset;
            let mut row = match affine_row(&diff, nsym, width) {
                Some(r) => r,
                None => return true, // cannot disprove the dependence
            };
            for (j, &c) in ss.coeffs.iter().enumerate() {
                row[1 + nsym + j] = c;
            }
            for (j, &c) in st.coeffs.iter().enumerate() {
                row[1 + nsym + n1 + j] -= c;
            }
            ei.push_row(&row);
        }

        // lexicographic split: lockstep above, strict at the split level
        for k in 0..depth.min(n1.min(n2)) {
            let mut row = vec![0i64; width];
            row[1 + nsym + k] = 1;
            row[1 + nsym + n1 + k] = -1;
            ei.push_row(&row);
        }
        if depth < n1.min(n2) {
            let mut row = vec![0i64; width];
            row[0] = -1;
            if forward {
                row[1 + nsym + depth] = 1;
                row[1 + nsym + n1 + depth] = -1;
            } else {
                row[1 + nsym + depth] = -1;
                row[1 + nsym + n1 + depth] = 1;
            }
            ai.push_row(&row);
        }
        Simplex::positive_variables(&ai, &ei).is_some()
    }

    /// Materialize the record for a feasible split.
    fn assemble(
        arena: &LoopNestArena,
        src: &MemoryAccess,
        tgt: &MemoryAccess,
        depth: usize,
        forward: bool,
    ) -> Dependence {
        let nest_s = arena.get(src.array_ref.nest);
        let nest_t = arena.get(tgt.array_ref.nest);
        let n1 = nest_s.num_loops();
        let n2 = nest_t.num_loops();
        let width = n1 + n2;
        let mut a: Matrix<i64> = Matrix::zeroed(0, width);
        let mut b: Vec<MPoly> = Vec::new();
        let (a_s, b_s) = nest_s.polyhedron().inequalities();
        for r in 0..a_s.num_rows() {
            let mut row = vec![0i64; width];
            row[..n1].copy_from_slice(a_s.row(r));
            a.push_row(&row);
            b.push(b_s[r].clone());
        }
        let (a_t, b_t) = nest_t.polyhedron().inequalities();
        for r in 0..a_t.num_rows() {
            let mut row = vec![0i64; width];
            row[n1..].copy_from_slice(a_t.row(r));
            a.push_row(&row);
            b.push(b_t[r].clone());
        }
        let mut e: Matrix<i64> = Matrix::zeroed(0, width);
        let mut q: Vec<MPoly> = Vec::new();
        for (ss, st) in src
            .array_ref
            .subscripts
            .iter()
            .zip(tgt.array_ref.subscripts.iter())
        {
            let mut row = vec![0i64; width];
            for (j, &c) in ss.coeffs.iter().enumerate() {
                row[j] = c;
            }
            for (j, &c) in st.coeffs.iter().enumerate() {
                row[n1 + j] -= c;
            }
            let mut diff = st.offset.clone();
            diff -= &ss.offset;
            e.push_row(&row);
            q.push(diff);
        }
        for k in 0..depth.min(n1.min(n2)) {
            let mut row = vec![0i64; width];
            row[k] = 1;
            row[n1 + k] = -1;
            e.push_row(&row);
            q.push(MPoly::zero());
        }
        if depth < n1.min(n2) {
            let mut row = vec![0i64; width];
            if forward {
                row[depth] = 1;
                row[n1 + depth] = -1;
            } else {
                row[depth] = -1;
                row[n1 + depth] = 1;
            }
            a.push_row(&row);
            b.push(MPoly::constant(-1));
        }
        let mut poset = nest_s.polyhedron().poset().clone();
        poset.merge(nest_t.polyhedron().poset());
        Dependence {
            poly: Polyhedron::with_equalities(a, b, e, q).with_poset(poset),
            src_schedule: src.schedule.clone(),
            tgt_schedule: tgt.schedule.clone(),
            forward,
            depth,
        }
    }
}

/// Lexicographic comparison of interleaving offsets: does `a` come
/// first in program order at identical iteration vectors?
fn omega_precedes(a: &Schedule, b: &Schedule) -> bool {
    for (x, y) in a.omega().iter().zip(b.omega().iter()) {
        if x != y {
            return x < y;
        }
    }
    false
}

fn symbol_count(arena: &LoopNestArena, src: &MemoryAccess, tgt: &MemoryAccess) -> usize {
    let mut nsym = 0usize;
    let mut scan = |p: &MPoly| {
        for t in p.terms() {
            for &v in t.mono.vars() {
                nsym = nsym.max(v as usize);
            }
        }
    };
    for id in &[src.array_ref.nest, tgt.array_ref.nest] {
        let nest = arena.get(*id);
        let (_, b) = nest.polyhedron().inequalities();
        for p in b {
            scan(p);
        }
    }
    for s in src
        .array_ref
        .subscripts
        .iter()
        .chain(tgt.array_ref.subscripts.iter())
    {
        scan(&s.offset);
    }
    nsym
}

/// Move an affine right-hand side across the relation: the constant
/// stays in the rhs slot (index 0), the symbol terms land negated on the
/// coefficient side. `None` when a term is non-affine.
fn affine_row(p: &MPoly, nsym: usize, width: usize) -> Option<Vec<i64>> {
    let mut row = vec![0i64; width];
    for t in p.terms() {
        if t.mono.is_one() {
            row[0] = t.coef;
        } else if t.mono.degree() == 1 {
            let v = t.mono.vars()[0] as usize;
            debug_assert!(v <= nsym);
            row[v] = -t.coef;
        } else {
            return None;
        }
    }
    Some(row)
}

/// Farkas dualization of a dependence polyhedron: a polyhedron over
/// `[phi_src | phi_tgt | w | u | lambda | mu | lambda0]` that is
/// feasible iff schedule coefficients exist making
/// `schedule(i') - schedule(i) >= strict` everywhere on the dependence.
/// `lambda`, `lambda0`, and the symbol-bounding `u` are constrained
/// non-negative; the equality multipliers `mu` stay free.
pub fn farkas_schedule_gap(dep: &Dependence, num_sym: usize, strict: bool) -> Polyhedron {
    let (a, b) = dep.poly.inequalities();
    let (e, q) = dep.poly.equalities();
    let ny = a.num_cols();
    let ma = a.num_rows();
    let me = e.num_rows();
    // variable layout of the dual space
    let phi = 0;
    let w = phi + ny;
    let u = w + 1;
    let lam = u + num_sym;
    let mu = lam + ma;
    let lam0 = mu + me;
    let width = lam0 + 1;

    let n1 = dep.src_schedule.num_loops();
    let mut eq: Matrix<i64> = Matrix::zeroed(0, width);
    let mut qv: Vec<MPoly> = Vec::new();
    // coefficient of each iteration variable must cancel exactly
    for j in 0..ny {
        let mut row = vec![0i64; width];
        // f(y) = phi_tgt·i' - phi_src·i, so source coefficients enter
        // negated
        row[phi + j] = if j < n1 { -1 } else { 1 };
        for r in 0..ma {
            row[lam + r] = a[(r, j)];
        }
        for k in 0..me {
            row[mu + k] = e[(k, j)];
        }
        eq.push_row(&row);
        qv.push(MPoly::zero());
    }
    // one equation per symbol: u_t balances the symbolic parts
    for t in 1..=num_sym {
        let mut row = vec![0i64; width];
        row[u + t - 1] = 1;
        for r in 0..ma {
            row[lam + r] = -b[r].coefficient(&crate::symbolics::Monomial::var(t as u32));
        }
        for k in 0..me {
            row[mu + k] = -q[k].coefficient(&crate::symbolics::Monomial::var(t as u32));
        }
        eq.push_row(&row);
        qv.push(MPoly::zero());
    }
    // the constant part, with the non-negative surplus lambda0
    {
        let mut row = vec![0i64; width];
        row[w] = 1;
        row[lam0] = -1;
        for r in 0..ma {
            row[lam + r] = -b[r].constant_term();
        }
        for k in 0..me {
            row[mu + k] = -q[k].constant_term();
        }
        eq.push_row(&row);
        qv.push(MPoly::constant(if strict { 1 } else { 0 }));
    }
    // lambda >= 0, u >= 0, lambda0 >= 0
    let mut ineq: Matrix<i64> = Matrix::zeroed(0, width);
    let mut bv: Vec<MPoly> = Vec::new();
    for col in (u..u + num_sym).chain(lam..lam + ma).chain(lam0..lam0 + 1) {
        let mut row = vec![0i64; width];
        row[col] = -1;
        ineq.push_row(&row);
        bv.push(MPoly::zero());
    }
    Polyhedron::with_equalities(ineq, bv, eq, qv)
}

/// Decide [`farkas_schedule_gap`] feasibility by splitting the free
/// variables into differences of non-negative ones for the simplex.
pub fn farkas_gap_feasible(dep: &Dependence, num_sym: usize, strict: bool) -> bool {
    let gap = farkas_schedule_gap(dep, num_sym, strict);
    let (a, b) = gap.inequalities();
    let (e, q) = gap.equalities();
    let ny = dep.poly.num_loops();
    let ma = dep.poly.num_inequalities();
    let me = dep.poly.num_equalities();
    // free variables: phi (ny), w (1), mu (me); non-negative already:
    // u, lambda, lambda0
    let n_free = ny + 1;
    let free_base2 = ny + 1 + num_sym + ma; // mu block start
    let total = gap.num_loops();
    let is_free = |j: usize| j < n_free || (j >= free_base2 && j < free_base2 + me);
    let split_width = 1 + total + n_free + me;
    let build = |m: &Matrix<i64>, rhs: &[MPoly], out: &mut Matrix<i64>| {
        for r in 0..m.num_rows() {
            let mut row = vec![0i64; split_width];
            row[0] = rhs[r].constant_term();
            let mut neg = 1 + total;
            for j in 0..total {
                row[1 + j] = m[(r, j)];
                if is_free(j) {
                    row[neg] = -m[(r, j)];
                    neg += 1;
                }
            }
            out.push_row(&row);
        }
    };
    let mut ai: Matrix<i64> = Matrix::zeroed(0, split_width);
    let mut ei: Matrix<i64> = Matrix::zeroed(0, split_width);
    build(a, b, &mut ai);
    build(e, q, &mut ei);
    Simplex::positive_variables(&ai, &ei).is_some()
}
