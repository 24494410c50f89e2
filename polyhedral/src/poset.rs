//! Saturating intervals and the partially ordered symbol set.
//!
//! The POSet stores, for every unordered pair of symbol ids `(i, j)` with
//! `i < j`, an interval bounding `sym_j - sym_i`, linearly indexed at
//! `i + j*(j-1)/2`. Symbol 0 is the literal zero, so the pair `(0, i)`
//! bounds the value of `sym_i` itself. Insertions keep the transitive
//! closure: every triangle touching the edited pair is restricted, and
//! pairs whose interval changed significantly propagate recursively.

use crate::bipartite::max_bipartite_match;
use crate::symbolics::{MPoly, Monomial, Term};
use intlin::Matrix;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Saturating interval arithmetic over `i64`; bounds clamp, never wrap.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Interval {
    pub lo: i64,
    pub hi: i64,
}

impl Interval {
    pub fn point(x: i64) -> Interval {
        Interval { lo: x, hi: x }
    }

    pub fn new(lo: i64, hi: i64) -> Interval {
        Interval { lo, hi }
    }

    pub fn unconstrained() -> Interval {
        Interval {
            lo: i64::MIN,
            hi: i64::MAX,
        }
    }

    pub fn non_negative() -> Interval {
        Interval {
            lo: 0,
            hi: i64::MAX,
        }
    }

    pub fn non_positive() -> Interval {
        Interval {
            lo: i64::MIN,
            hi: 0,
        }
    }

    pub fn positive() -> Interval {
        Interval { lo: 1, hi: i64::MAX }
    }

    pub fn negative() -> Interval {
        Interval {
            lo: i64::MIN,
            hi: -1,
        }
    }

    pub fn zero() -> Interval {
        Interval::point(0)
    }

    pub fn lower_bound(x: i64) -> Interval {
        Interval { lo: x, hi: i64::MAX }
    }

    pub fn upper_bound(x: i64) -> Interval {
        Interval { lo: i64::MIN, hi: x }
    }

    pub fn intersect(self, b: Interval) -> Interval {
        Interval {
            lo: self.lo.max(b.lo),
            hi: self.hi.min(b.hi),
        }
    }

    pub fn is_empty(self) -> bool {
        self.lo > self.hi
    }

    pub fn is_constant(self) -> bool {
        self.lo == self.hi
    }

    pub fn sign_unknown(self) -> bool {
        self.lo < 0 && self.hi > 0
    }

    pub fn known_less(self, a: Interval) -> bool {
        self.hi < a.lo
    }

    pub fn known_less_equal(self, a: Interval) -> bool {
        self.hi <= a.lo
    }

    pub fn known_greater(self, a: Interval) -> bool {
        self.lo > a.hi
    }

    pub fn known_greater_equal(self, a: Interval) -> bool {
        self.lo >= a.hi
    }

    pub fn equivalent_range(self, a: Interval) -> bool {
        self.lo == a.lo && self.hi == a.hi
    }

    /// A change counts as significant only while both the old and new
    /// bound sit below half the integer range; saturated values stop
    /// propagating.
    pub fn significantly_different(self, b: Interval) -> bool {
        let half = i64::MAX >> 1;
        (self.lo != b.lo && saturating_abs(self.lo).min(saturating_abs(b.lo)) < half)
            || (self.hi != b.hi && saturating_abs(self.hi).min(saturating_abs(b.hi)) < half)
    }

    /// `self` holds `a + b`; tighten all three, returning new `(a, b)`.
    pub fn restrict_add(&mut self, a: Interval, b: Interval) -> (Interval, Interval) {
        let c_new = self.intersect(a + b);
        let a_new = a.intersect(*self - b);
        let b_new = b.intersect(*self - a);
        debug_assert!(!c_new.is_empty());
        debug_assert!(!a_new.is_empty());
        debug_assert!(!b_new.is_empty());
        *self = c_new;
        (a_new, b_new)
    }

    /// `self` holds `a - b`; tighten all three, returning new `(a, b)`.
    pub fn restrict_sub(&mut self, a: Interval, b: Interval) -> (Interval, Interval) {
        let c_new = self.intersect(a - b);
        let a_new = a.intersect(*self + b);
        let b_new = b.intersect(a - *self);
        debug_assert!(!c_new.is_empty());
        debug_assert!(!a_new.is_empty());
        debug_assert!(!b_new.is_empty());
        *self = c_new;
        (a_new, b_new)
    }
}

fn saturating_abs(a: i64) -> i64 {
    if a == i64::MIN {
        i64::MAX
    } else {
        a.abs()
    }
}

impl Add for Interval {
    type Output = Interval;
    fn add(self, b: Interval) -> Interval {
        Interval {
            lo: self.lo.saturating_add(b.lo),
            hi: self.hi.saturating_add(b.hi),
        }
    }
}

impl Sub for Interval {
    type Output = Interval;
    fn sub(self, b: Interval) -> Interval {
        Interval {
            lo: self.lo.saturating_sub(b.hi),
            hi: self.hi.saturating_sub(b.lo),
        }
    }
}

impl Mul for Interval {
    type Output = Interval;
    fn mul(self, b: Interval) -> Interval {
        let ll = self.lo.saturating_mul(b.lo);
        let lu = self.lo.saturating_mul(b.hi);
        let ul = self.hi.saturating_mul(b.lo);
        let uu = self.hi.saturating_mul(b.hi);
        Interval {
            lo: ll.min(lu).min(ul.min(uu)),
            hi: ll.max(lu).max(ul.max(uu)),
        }
    }
}

impl Mul<i64> for Interval {
    type Output = Interval;
    fn mul(self, c: i64) -> Interval {
        self * Interval::point(c)
    }
}

impl Neg for Interval {
    type Output = Interval;
    fn neg(self) -> Interval {
        Interval {
            lo: if self.hi == i64::MIN { i64::MAX } else { -self.hi },
            hi: if self.lo == i64::MIN { i64::MAX } else { -self.lo },
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} : {}", self.lo, self.hi)
    }
}

fn bin2(i: usize) -> usize {
    (i * i.saturating_sub(1)) >> 1
}

/// Pairwise-bounded differences between program symbols, closed under
/// transitivity.
#[derive(Clone, Default)]
pub struct PartiallyOrderedSet {
    delta: Vec<Interval>,
    nvar: usize,
}

impl PartiallyOrderedSet {
    pub fn new() -> PartiallyOrderedSet {
        PartiallyOrderedSet::default()
    }

    pub fn num_symbols(&self) -> usize {
        self.nvar
    }

    pub fn is_trivial(&self) -> bool {
        self.delta.is_empty()
    }

    /// Interval for `sym_j - sym_i`.
    pub fn rel(&self, i: usize, j: usize) -> Interval {
        if i == j {
            return Interval::zero();
        }
        let (a, b, flip) = if i < j { (i, j, false) } else { (j, i, true) };
        let l = a + bin2(b);
        if l >= self.delta.len() {
            return Interval::unconstrained();
        }
        let d = self.delta[l];
        if flip {
            -d
        } else {
            d
        }
    }

    /// Interval for the value of `sym_i` (its difference from symbol 0).
    pub fn range(&self, i: usize) -> Interval {
        if i < self.nvar {
            self.rel(0, i)
        } else {
            Interval::unconstrained()
        }
    }

    /// Record `sym_j - sym_i ∈ itv`, then close transitively.
    pub fn push(&mut self, i: usize, j: usize, itv: Interval) {
        if i > j {
            return self.push(j, i, -itv);
        }
        debug_assert!(j > i);
        let l = i + bin2(j);
        if j >= self.nvar {
            self.nvar = j + 1;
            self.delta
                .resize((j * self.nvar) >> 1, Interval::unconstrained());
        } else {
            let merged = itv.intersect(self.delta[l]);
            if merged.equivalent_range(self.delta[l]) {
                return;
            }
            let closed = self.update(i, j, merged);
            self.delta[l] = closed;
            return;
        }
        let closed = self.update(i, j, itv);
        self.delta[l] = closed;
    }

    /// Restrict every triangle touching `(i, j)`; returns the possibly
    /// tightened interval for the pair itself.
    fn update(&mut self, i: usize, j: usize, mut ji: Interval) -> Interval {
        let i_off = bin2(i);
        let j_off = bin2(j);
        for k in 0..i {
            let ik = self.delta[k + i_off];
            let jk = self.delta[k + j_off];
            // j - i == (j - k) - (i - k)
            let (jkt, ikt) = ji.restrict_sub(jk, ik);
            self.delta[k + i_off] = ikt;
            self.delta[k + j_off] = jkt;
            if ikt.significantly_different(ik) {
                self.delta[i + j_off] = ji;
                let t = self.update(k, i, ikt);
                self.delta[k + i_off] = t;
                ji = self.delta[i + j_off];
            }
            if jkt.significantly_different(jk) {
                self.delta[i + j_off] = ji;
                let t = self.update(k, j, jkt);
                self.delta[k + j_off] = t;
                ji = self.delta[i + j_off];
            }
        }
        for k in i + 1..j {
            let k_off = bin2(k);
            let ki = self.delta[i + k_off];
            let jk = self.delta[k + j_off];
            // j - i == (k - i) + (j - k)
            let (kit, jkt) = ji.restrict_add(ki, jk);
            self.delta[i + k_off] = kit;
            self.delta[k + j_off] = jkt;
            if kit.significantly_different(ki) {
                self.delta[i + j_off] = ji;
                let t = self.update(i, k, kit);
                self.delta[i + k_off] = t;
                ji = self.delta[i + j_off];
            }
            if jkt.significantly_different(jk) {
                self.delta[i + j_off] = ji;
                let t = self.update(k, j, jkt);
                self.delta[k + j_off] = t;
                ji = self.delta[i + j_off];
            }
        }
        for k in j + 1..self.nvar {
            let k_off = bin2(k);
            let ki = self.delta[i + k_off];
            let kj = self.delta[j + k_off];
            // j - i == (k - i) - (k - j)
            let (kit, kjt) = ji.restrict_sub(ki, kj);
            self.delta[i + k_off] = kit;
            self.delta[j + k_off] = kjt;
            if kit.significantly_different(ki) {
                self.delta[i + j_off] = ji;
                let t = self.update(i, k, kit);
                self.delta[i + k_off] = t;
                ji = self.delta[i + j_off];
            }
            if kjt.significantly_different(kj) {
                self.delta[i + j_off] = ji;
                let t = self.update(j, k, kjt);
                self.delta[j + k_off] = t;
                ji = self.delta[i + j_off];
            }
        }
        ji
    }

    // -- polynomial sign queries --

    pub fn monomial_interval(&self, m: &Monomial) -> Interval {
        if m.is_one() {
            return Interval::point(1);
        }
        let mut itv = self.range(m.vars()[0] as usize);
        for &v in m.vars().iter().skip(1) {
            itv = itv * self.range(v as usize);
        }
        itv
    }

    pub fn term_interval(&self, t: &Term) -> Interval {
        self.monomial_interval(&t.mono) * t.coef
    }

    fn sign_flip(&self, m: &Monomial, mut pos: bool) -> Option<bool> {
        for &v in m.vars() {
            let itv = self.range(v as usize);
            if itv.hi < 0 {
                pos = !pos;
            } else if itv.lo < 0 && itv.hi > 0 {
                return None;
            }
        }
        Some(pos)
    }

    pub fn known_positive(&self, m: &Monomial) -> bool {
        self.sign_flip(m, true) == Some(true)
    }

    pub fn known_negative(&self, m: &Monomial) -> bool {
        self.sign_flip(m, false) == Some(true)
    }

    pub fn sign_unknown(&self, m: &Monomial) -> bool {
        m.vars()
            .iter()
            .any(|&v| self.range(v as usize).sign_unknown())
    }

    /// Match the variables of `x` against those of `y` so that each
    /// matched pair proves `x_var` covers `y_var`; used to cancel factors
    /// when comparing monomials.
    fn match_monomials(
        &self,
        x: &Monomial,
        y: &Monomial,
        cx: i64,
        cy: i64,
    ) -> (usize, Vec<Option<usize>>) {
        let n = x.degree();
        let m = y.degree();
        let acx = cx.abs();
        let acy = cy.abs();
        let rows = n + usize::from(acx > 0);
        let cols = m + usize::from(acy > 0);
        let mut g = Matrix::filled(rows, cols, false);
        for (ni, &xv) in x.vars().iter().enumerate() {
            let xb = self.range(xv as usize);
            if xb.lo < 0 && xb.hi > 0 {
                // variables of unknown sign never match
                continue;
            }
            for (mi, &yv) in y.vars().iter().enumerate() {
                let xyb = self.rel(yv as usize, xv as usize);
                g[(ni, mi)] = if xb.lo >= 0 {
                    xyb.lo >= 0
                } else {
                    xyb.hi <= 0
                };
            }
            if acy > 0 {
                g[(ni, m)] = if xb.lo >= 0 { xb.lo >= cy } else { xb.hi <= cy };
            }
        }
        if acx > 0 {
            for (mi, &yv) in y.vars().iter().enumerate() {
                let yb = self.range(yv as usize);
                g[(n, mi)] = if cx >= 0 { cx >= yb.hi } else { cx <= yb.lo };
            }
            if acy > 0 {
                g[(n, m)] = acx >= acy;
            }
        }
        max_bipartite_match(&g)
    }

    fn unmatched_intervals(&self, x: &Monomial, y: &Monomial, cx: i64, cy: i64) -> (Interval, Interval) {
        let n = x.degree();
        let m = y.degree();
        let (_, match_row) = self.match_monomials(x, y, cx, cy);
        let mut itvx = Interval::point(cx);
        let mut itvy = Interval::point(cy);
        let mut matched = vec![false; m];
        for r in 0..n {
            if let Some(Some(c)) = match_row.get(r) {
                if *c < m {
                    matched[*c] = true;
                }
            }
        }
        for (mi, &yv) in y.vars().iter().enumerate() {
            if !matched[mi] {
                itvy = itvy * self.range(yv as usize);
            }
        }
        for (ni, &xv) in x.vars().iter().enumerate() {
            let unmatched = match match_row.get(ni) {
                Some(Some(c)) => *c >= m,
                _ => true,
            };
            if unmatched {
                itvx = itvx * self.range(xv as usize);
            }
        }
        (itvx, itvy)
    }

    /// Is `cx * x >= cy * y` provable?
    pub fn known_monomial_ge(&self, x: &Monomial, y: &Monomial, cx: i64, cy: i64) -> bool {
        let n = x.degree();
        let m = y.degree();
        if n == 0 {
            if m == 0 {
                return cx >= cy;
            }
            if m == 1 {
                return Interval::point(cx)
                    .known_greater_equal(self.range(y.vars()[0] as usize) * cy);
            }
        } else if n == 1 {
            if m == 0 {
                return (self.range(x.vars()[0] as usize) * cx)
                    .known_greater_equal(Interval::point(cy));
            }
            if m == 1 {
                if cx == 1 && cy == 1 {
                    // x >= y  <=>  (x - y) >= 0
                    return self.rel(y.vars()[0] as usize, x.vars()[0] as usize).lo >= 0;
                }
                if cx == -1 && cy == -1 {
                    return self.rel(x.vars()[0] as usize, y.vars()[0] as usize).lo >= 0;
                }
            }
        }
        if cx < 0 {
            if cy < 0 {
                return self.known_monomial_ge(y, x, -cy, -cx);
            }
            return false;
        } else if cy < 0 {
            return true;
        }
        let (itvx, itvy) = self.unmatched_intervals(x, y, cx, cy);
        itvx.known_greater_equal(itvy)
    }

    /// Conservative proof of `p >= 0`: `false` means "not known", never
    /// "known false". Terms are folded in adjacent pairs to exploit
    /// cancellation between a positive and a negative term.
    pub fn known_greater_equal_zero(&self, p: &MPoly) -> bool {
        if p.is_zero() {
            return true;
        }
        let terms = p.terms();
        let n = terms.len();
        let mut i = 0;
        while i + 1 < n {
            let tm = &terms[i];
            let tn = &terms[i + 1];
            i += 2;
            let term_sum = self.term_interval(tm) + self.term_interval(tn);
            if term_sum.lo >= 0 {
                continue;
            }
            let (m_pos, m_neg) = match self.sign_flip(&tm.mono, true) {
                Some(true) => (tm.coef > 0, tm.coef < 0),
                Some(false) => (tm.coef < 0, tm.coef > 0),
                None => return false,
            };
            let (n_pos, n_neg) = match self.sign_flip(&tn.mono, true) {
                Some(true) => (tn.coef > 0, tn.coef < 0),
                Some(false) => (tn.coef < 0, tn.coef > 0),
                None => return false,
            };
            if m_pos {
                if n_pos {
                    continue;
                }
                if n_neg && tn.coef < 0 {
                    if self.known_monomial_ge(&tm.mono, &tn.mono, tm.coef, -tn.coef) {
                        continue;
                    }
                }
                return false;
            } else if n_pos {
                if m_neg && tm.coef < 0 {
                    if self.known_monomial_ge(&tn.mono, &tm.mono, tn.coef, -tm.coef) {
                        continue;
                    }
                }
                return false;
            } else {
                return false;
            }
        }
        if n & 1 == 1 {
            return self.term_interval(&terms[n - 1]).lo >= 0;
        }
        true
    }

    /// Fold another set's constraints into this one.
    pub fn merge(&mut self, other: &PartiallyOrderedSet) {
        for j in 1..other.nvar {
            for i in 0..j {
                let itv = other.delta[i + bin2(j)];
                if !itv.equivalent_range(Interval::unconstrained()) {
                    self.push(i, j, itv);
                }
            }
        }
    }

    pub fn known_less_equal_zero(&self, p: &MPoly) -> bool {
        self.known_greater_equal_zero(&(-p.clone()))
    }

    pub fn known_less_than_zero(&self, p: &MPoly) -> bool {
        let mut q = -p.clone();
        q -= 1;
        self.known_greater_equal_zero(&q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_saturation() {
        let big = Interval::new(i64::MAX - 1, i64::MAX);
        let sum = big + Interval::point(10);
        assert_eq!(sum.hi, i64::MAX);
        let prod = big * Interval::point(-2);
        assert_eq!(prod.lo, i64::MIN);
        assert_eq!((-Interval::new(i64::MIN, 3)).hi, i64::MAX);
    }

    #[test]
    fn restrict_propagates_both_ways() {
        // c = a + b with c in [0, 10], a in [4, 100], b in [2, 50]
        let mut c = Interval::new(0, 10);
        let (a, b) = c.restrict_add(Interval::new(4, 100), Interval::new(2, 50));
        assert_eq!(c, Interval::new(6, 10));
        assert_eq!(a, Interval::new(4, 8));
        assert_eq!(b, Interval::new(2, 6));
    }
}
