//! Multivariate polynomials over program symbols.
//!
//! A [`Monomial`] is a sorted multiset of symbol ids (`x1²·x3` is stored
//! as `[1, 1, 3]`); two equal monomials compare equal structurally and
//! the distinguished [`Monomial::one`] has degree zero. An [`MPoly`]
//! keeps its terms in graded-lex descending order with no zero
//! coefficients and no duplicate monomials.
//!
//! Division is exact-integer: `div_rem` performs Euclidean-style long
//! division and `div_exact` asserts the remainder away. Polynomial gcd
//! runs a primitive pseudo-remainder sequence on a univariate view in the
//! least symbol id.

use intlin::gcd::gcd;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

pub type VarId = u32;

/// Sorted multiset of symbol ids; the product of its variables.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Monomial {
    ids: SmallVec<[VarId; 4]>,
}

impl Monomial {
    pub fn one() -> Monomial {
        Monomial::default()
    }

    pub fn var(id: VarId) -> Monomial {
        let mut ids = SmallVec::new();
        ids.push(id);
        Monomial { ids }
    }

    pub fn from_ids(mut ids: Vec<VarId>) -> Monomial {
        ids.sort_unstable();
        Monomial {
            ids: SmallVec::from_slice(&ids),
        }
    }

    pub fn is_one(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn degree(&self) -> usize {
        self.ids.len()
    }

    pub fn degree_of(&self, id: VarId) -> usize {
        self.ids.iter().filter(|&&v| v == id).count()
    }

    pub fn vars(&self) -> &[VarId] {
        &self.ids
    }

    pub fn first_id(&self) -> Option<VarId> {
        self.ids.first().copied()
    }

    /// Sorted merge of the two multisets.
    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut out = SmallVec::with_capacity(self.ids.len() + other.ids.len());
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < other.ids.len() {
            if self.ids[i] <= other.ids[j] {
                out.push(self.ids[i]);
                i += 1;
            } else {
                out.push(other.ids[j]);
                j += 1;
            }
        }
        out.extend_from_slice(&self.ids[i..]);
        out.extend_from_slice(&other.ids[j..]);
        Monomial { ids: out }
    }

    /// Multiset difference; `None` when `other` is not contained.
    pub fn try_div(&self, other: &Monomial) -> Option<Monomial> {
        let mut out = SmallVec::new();
        let mut j = 0;
        for &v in self.ids.iter() {
            if j < other.ids.len() && other.ids[j] == v {
                j += 1;
            } else if j < other.ids.len() && other.ids[j] < v {
                return None;
            } else {
                out.push(v);
            }
        }
        if j < other.ids.len() {
            return None;
        }
        Some(Monomial { ids: out })
    }

    /// Multiset intersection (pointwise minimum of exponents).
    pub fn gcd(&self, other: &Monomial) -> Monomial {
        let mut out = SmallVec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < other.ids.len() {
            match self.ids[i].cmp(&other.ids[j]) {
                Ordering::Equal => {
                    out.push(self.ids[i]);
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        Monomial { ids: out }
    }

    /// `v^k`
    pub fn var_pow(id: VarId, k: usize) -> Monomial {
        Monomial {
            ids: SmallVec::from_elem(id, k),
        }
    }

    /// Graded lex: higher degree first, then smaller leading ids first.
    pub fn lex_greater(&self, other: &Monomial) -> bool {
        let d = self.degree();
        if d != other.degree() {
            return d > other.degree();
        }
        for i in 0..d {
            let a = self.ids[i];
            let b = other.ids[i];
            if a != b {
                return a < b;
            }
        }
        false
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Monomial) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Monomial {
    fn cmp(&self, other: &Monomial) -> Ordering {
        if self == other {
            Ordering::Equal
        } else if self.lex_greater(other) {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }
}

impl fmt::Debug for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_one() {
            return write!(f, "1");
        }
        let mut i = 0;
        while i < self.ids.len() {
            let v = self.ids[i];
            let mut count = 0;
            while i < self.ids.len() && self.ids[i] == v {
                count += 1;
                i += 1;
            }
            if count == 1 {
                write!(f, "v{}", v)?;
            } else {
                write!(f, "v{}^{}", v, count)?;
            }
        }
        Ok(())
    }
}

/// One term of an [`MPoly`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Term {
    pub coef: i64,
    pub mono: Monomial,
}

impl Term {
    pub fn new(coef: i64, mono: Monomial) -> Term {
        Term { coef, mono }
    }

    pub fn constant(coef: i64) -> Term {
        Term {
            coef,
            mono: Monomial::one(),
        }
    }

    pub fn mul(&self, other: &Term) -> Term {
        Term {
            coef: self.coef * other.coef,
            mono: self.mono.mul(&other.mono),
        }
    }
}

/// Multivariate polynomial with integer coefficients.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct MPoly {
    terms: Vec<Term>,
}

impl MPoly {
    pub fn zero() -> MPoly {
        MPoly::default()
    }

    pub fn constant(c: i64) -> MPoly {
        let mut p = MPoly::zero();
        p.add_term(c, Monomial::one());
        p
    }

    pub fn var(id: VarId) -> MPoly {
        let mut p = MPoly::zero();
        p.add_term(1, Monomial::var(id));
        p
    }

    pub fn from_term(t: Term) -> MPoly {
        let mut p = MPoly::zero();
        p.add_term(t.coef, t.mono);
        p
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn leading(&self) -> Option<&Term> {
        self.terms.first()
    }

    /// Coefficient of the constant monomial.
    pub fn constant_term(&self) -> i64 {
        match self.terms.last() {
            Some(t) if t.mono.is_one() => t.coef,
            _ => 0,
        }
    }

    /// Coefficient of a given monomial, 0 when absent.
    pub fn coefficient(&self, mono: &Monomial) -> i64 {
        for t in &self.terms {
            if &t.mono == mono {
                return t.coef;
            }
        }
        0
    }

    /// `Some(c)` iff the polynomial is the constant `c`.
    pub fn as_constant(&self) -> Option<i64> {
        match self.terms.len() {
            0 => Some(0),
            1 if self.terms[0].mono.is_one() => Some(self.terms[0].coef),
            _ => None,
        }
    }

    /// Highest degree over all terms.
    pub fn degree(&self) -> usize {
        self.terms.first().map_or(0, |t| t.mono.degree())
    }

    /// Insert a term, keeping order and canceling zeros.
    pub fn add_term(&mut self, coef: i64, mono: Monomial) {
        if coef == 0 {
            return;
        }
        for i in 0..self.terms.len() {
            if self.terms[i].mono == mono {
                self.terms[i].coef += coef;
                if self.terms[i].coef == 0 {
                    self.terms.remove(i);
                }
                return;
            }
            if !self.terms[i].mono.lex_greater(&mono) {
                self.terms.insert(i, Term::new(coef, mono));
                return;
            }
        }
        self.terms.push(Term::new(coef, mono));
    }

    /// Gcd of the coefficients, 0 for the zero polynomial.
    pub fn content(&self) -> i64 {
        let mut g = 0;
        for t in &self.terms {
            g = gcd(g, t.coef);
            if g == 1 {
                break;
            }
        }
        g
    }

    pub fn divide_content(&mut self, g: i64) {
        debug_assert!(g != 0);
        for t in self.terms.iter_mut() {
            debug_assert_eq!(t.coef % g, 0);
            t.coef /= g;
        }
    }

    /// Long division: `self == q * d + r` where no term of `r` is
    /// divisible by the leading term of `d`.
    pub fn div_rem(&self, d: &MPoly) -> (MPoly, MPoly) {
        let dl = d.leading().expect("division by the zero polynomial");
        let mut p = self.clone();
        let mut q = MPoly::zero();
        let mut r = MPoly::zero();
        while let Some(pl) = p.leading().cloned() {
            let divisible = pl.coef % dl.coef == 0;
            match pl.mono.try_div(&dl.mono) {
                Some(m) if divisible => {
                    let t = Term::new(pl.coef / dl.coef, m);
                    fnmadd_term(&mut p, d, &t);
                    q.add_term(t.coef, t.mono);
                }
                _ => {
                    r.add_term(pl.coef, pl.mono.clone());
                    p.add_term(-pl.coef, pl.mono);
                }
            }
        }
        (q, r)
    }

    /// Exact division; the remainder must be zero.
    pub fn div_exact(&self, d: &MPoly) -> MPoly {
        let (q, r) = self.div_rem(d);
        debug_assert!(r.is_zero(), "div_exact with nonzero remainder");
        q
    }

    // -- univariate view helpers (for the gcd pseudo-remainder loop) --

    fn degree_in(&self, v: VarId) -> usize {
        self.terms
            .iter()
            .map(|t| t.mono.degree_of(v))
            .max()
            .unwrap_or(0)
    }

    /// Leading coefficient w.r.t. `v`: the sum of all terms of maximal
    /// `v`-degree, with `v^deg` divided out.
    fn leading_coef_in(&self, v: VarId) -> MPoly {
        let d = self.degree_in(v);
        let vd = Monomial::var_pow(v, d);
        let mut out = MPoly::zero();
        for t in &self.terms {
            if t.mono.degree_of(v) == d {
                let m = t.mono.try_div(&vd).expect("degree accounting is exact");
                out.add_term(t.coef, m);
            }
        }
        out
    }

    /// Content w.r.t. `v`: gcd of the coefficient polynomials of `v^k`.
    fn content_in(&self, v: VarId) -> MPoly {
        let d = self.degree_in(v);
        let mut g = MPoly::zero();
        for k in 0..=d {
            let vk = Monomial::var_pow(v, k);
            let mut ck = MPoly::zero();
            for t in &self.terms {
                if t.mono.degree_of(v) == k {
                    let m = t.mono.try_div(&vk).expect("degree accounting is exact");
                    ck.add_term(t.coef, m);
                }
            }
            if !ck.is_zero() {
                g = poly_gcd(&g, &ck);
            }
        }
        g
    }

    fn smallest_var(&self) -> Option<VarId> {
        self.terms
            .iter()
            .filter_map(|t| t.mono.first_id())
            .min()
    }
}

/// `x -= c * y`
pub fn fnmadd(x: &mut MPoly, y: &MPoly, c: i64) {
    if c == 0 {
        return;
    }
    for t in y.terms.iter() {
        x.add_term(-c * t.coef, t.mono.clone());
    }
}

/// `x -= t * y`
pub fn fnmadd_term(x: &mut MPoly, y: &MPoly, t: &Term) {
    for yt in y.terms.iter() {
        x.add_term(-t.coef * yt.coef, t.mono.mul(&yt.mono));
    }
}

/// Pseudo-remainder of `p` by `d` w.r.t. variable `v`.
fn pseudo_rem(p: &MPoly, d: &MPoly, v: VarId) -> MPoly {
    let dd = d.degree_in(v);
    debug_assert!(dd > 0);
    let lead_d = d.leading_coef_in(v);
    let mut r = p.clone();
    while !r.is_zero() && r.degree_in(v) >= dd {
        let dr = r.degree_in(v);
        let lead_r = r.leading_coef_in(v);
        // r = lead_d * r - lead_r * v^(dr - dd) * d
        let shift = MPoly::from_term(Term::new(1, Monomial::var_pow(v, dr - dd)));
        let mut next = &lead_d * &r;
        let sub = &(&lead_r * &shift) * d;
        next -= &sub;
        debug_assert!(next.is_zero() || next.degree_in(v) < dr);
        r = next;
    }
    r
}

/// Polynomial gcd via content extraction and a primitive
/// pseudo-remainder sequence. The result's sign follows the inputs'
/// contents; `poly_gcd(0, y) == y`.
pub fn poly_gcd(x: &MPoly, y: &MPoly) -> MPoly {
    if x.is_zero() {
        return y.clone();
    }
    if y.is_zero() {
        return x.clone();
    }
    if let (Some(a), Some(b)) = (x.as_constant(), y.as_constant()) {
        return MPoly::constant(gcd(a, b));
    }
    // single-term inputs reduce to monomial gcd with integer content
    let single = |p: &MPoly| p.terms().len() == 1;
    if single(x) || single(y) {
        let g = gcd(x.content(), y.content());
        let mut mono = x.terms[0].mono.clone();
        for t in x.terms.iter().skip(1) {
            mono = mono.gcd(&t.mono);
        }
        for t in y.terms.iter() {
            mono = mono.gcd(&t.mono);
        }
        return MPoly::from_term(Term::new(g, mono));
    }
    let v = match (x.smallest_var(), y.smallest_var()) {
        (Some(a), Some(b)) => a.min(b),
        _ => unreachable!("non-constant polynomials name a variable"),
    };
    if x.degree_in(v) == 0 {
        return poly_gcd(x, &y.content_in(v));
    }
    if y.degree_in(v) == 0 {
        return poly_gcd(&x.content_in(v), y);
    }
    let cont = poly_gcd(&x.content_in(v), &y.content_in(v));
    let mut a = x.div_exact(&x.content_in(v));
    let mut b = y.div_exact(&y.content_in(v));
    if a.degree_in(v) < b.degree_in(v) {
        std::mem::swap(&mut a, &mut b);
    }
    loop {
        let r = pseudo_rem(&a, &b, v);
        if r.is_zero() {
            break;
        }
        let rc = if r.degree_in(v) == 0 {
            // the primitive parts are coprime in `v`
            return cont;
        } else {
            r.content_in(v)
        };
        a = b;
        b = r.div_exact(&rc);
    }
    let mut g = &cont * &b;
    // normalize the sign so the leading coefficient is positive
    if g.leading().map_or(false, |t| t.coef < 0) {
        g = -g;
    }
    g
}

// ---- operator impls -------------------------------------------------------

impl<'a> AddAssign<&'a MPoly> for MPoly {
    fn add_assign(&mut self, rhs: &'a MPoly) {
        for t in rhs.terms.iter() {
            self.add_term(t.coef, t.mono.clone());
        }
    }
}

impl<'a> SubAssign<&'a MPoly> for MPoly {
    fn sub_assign(&mut self, rhs: &'a MPoly) {
        for t in rhs.terms.iter() {
            self.add_term(-t.coef, t.mono.clone());
        }
    }
}

impl AddAssign<i64> for MPoly {
    fn add_assign(&mut self, rhs: i64) {
        self.add_term(rhs, Monomial::one());
    }
}

impl SubAssign<i64> for MPoly {
    fn sub_assign(&mut self, rhs: i64) {
        self.add_term(-rhs, Monomial::one());
    }
}

impl MulAssign<i64> for MPoly {
    fn mul_assign(&mut self, rhs: i64) {
        if rhs == 0 {
            self.terms.clear();
            return;
        }
        for t in self.terms.iter_mut() {
            t.coef *= rhs;
        }
    }
}

impl<'a> Add for &'a MPoly {
    type Output = MPoly;
    fn add(self, rhs: &'a MPoly) -> MPoly {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl<'a> Sub for &'a MPoly {
    type Output = MPoly;
    fn sub(self, rhs: &'a MPoly) -> MPoly {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl<'a> Mul for &'a MPoly {
    type Output = MPoly;
    fn mul(self, rhs: &'a MPoly) -> MPoly {
        let mut out = MPoly::zero();
        for a in self.terms.iter() {
            for b in rhs.terms.iter() {
                out.add_term(a.coef * b.coef, a.mono.mul(&b.mono));
            }
        }
        out
    }
}

impl<'a> Mul<i64> for &'a MPoly {
    type Output = MPoly;
    fn mul(self, rhs: i64) -> MPoly {
        let mut out = self.clone();
        out *= rhs;
        out
    }
}

impl Neg for MPoly {
    type Output = MPoly;
    fn neg(mut self) -> MPoly {
        for t in self.terms.iter_mut() {
            t.coef = -t.coef;
        }
        self
    }
}

impl From<i64> for MPoly {
    fn from(c: i64) -> MPoly {
        MPoly::constant(c)
    }
}

impl fmt::Debug for MPoly {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, t) in self.terms.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", if t.coef < 0 { " - " } else { " + " })?;
            } else if t.coef < 0 {
                write!(f, "-")?;
            }
            let c = t.coef.abs();
            if t.mono.is_one() {
                write!(f, "{}", c)?;
            } else if c == 1 {
                write!(f, "{:?}", t.mono)?;
            } else {
                write!(f, "{}*{:?}", c, t.mono)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> MPoly {
        MPoly::var(1)
    }

    fn y() -> MPoly {
        MPoly::var(2)
    }

    #[test]
    fn monomial_ordering() {
        let m = Monomial::var(1);
        let n = Monomial::var(2);
        let mn = m.mul(&n);
        assert!(mn.lex_greater(&m));
        assert!(m.lex_greater(&n));
        assert!(!n.lex_greater(&m));
        assert_eq!(m.mul(&m).degree_of(1), 2);
    }

    #[test]
    fn monomial_division() {
        let m = Monomial::from_ids(vec![1, 1, 2]);
        let n = Monomial::from_ids(vec![1, 2]);
        assert_eq!(m.try_div(&n).unwrap(), Monomial::var(1));
        assert!(n.try_div(&m).is_none());
        assert_eq!(m.gcd(&n), n);
    }

    #[test]
    fn arithmetic_and_cancellation() {
        let p = &(&x() + &y()) * &(&x() - &y());
        let mut x2 = &x() * &x();
        x2 -= &(&y() * &y());
        assert_eq!(p, x2);
        let mut q = p.clone();
        q -= &p;
        assert!(q.is_zero());
    }

    #[test]
    fn division_roundtrip() {
        let d = &x() + &MPoly::constant(1);
        let q0 = &(&x() * &x()) + &y();
        let n = &(&d * &q0) + &MPoly::constant(0);
        let (q, r) = n.div_rem(&d);
        assert!(r.is_zero());
        assert_eq!(q, q0);
        assert_eq!(n.div_exact(&d), q0);
    }

    #[test]
    fn division_with_remainder() {
        let n = &(&x() * &x()) + &MPoly::constant(3);
        let d = &x() + &MPoly::constant(1);
        let (q, r) = n.div_rem(&d);
        let mut back = &q * &d;
        back += &r;
        assert_eq!(back, n);
    }

    #[test]
    fn gcd_common_factor() {
        let common = &x() + &MPoly::constant(1);
        let a = &common * &(&x() + &y());
        let b = &common * &y();
        let g = poly_gcd(&a, &b);
        assert_eq!(g, common);
    }

    #[test]
    fn gcd_monomial_content() {
        let a = &(&x() * &y()) * &MPoly::constant(4);
        let b = &(&x() * &x()) * &MPoly::constant(6);
        let g = poly_gcd(&a, &b);
        assert_eq!(g, &x() * &MPoly::constant(2));
    }

    #[test]
    fn fnmadd_is_sub_mul() {
        let mut acc = &x() * &MPoly::constant(5);
        fnmadd(&mut acc, &y(), 3);
        let expect = &(&x() * &MPoly::constant(5)) - &(&y() * &MPoly::constant(3));
        assert_eq!(acc, expect);
    }
}
