use intlin::Matrix;
use polyhedral::poset::{Interval, PartiallyOrderedSet};
use polyhedral::symbolics::MPoly;
use polyhedral::Polyhedron;

/// `0 <= m <= M-1, 0 <= n <= N-1` with `M >= 1`, `N >= 1`.
fn rectangle() -> Polyhedron {
    let a: Matrix<i64> = "[1 0; -1 0; 0 1; 0 -1]".parse().unwrap();
    let m_sym = MPoly::var(1);
    let n_sym = MPoly::var(2);
    let b = vec![
        &m_sym - &MPoly::constant(1),
        MPoly::zero(),
        &n_sym - &MPoly::constant(1),
        MPoly::zero(),
    ];
    let mut poset = PartiallyOrderedSet::new();
    poset.push(0, 1, Interval::lower_bound(1));
    poset.push(0, 2, Interval::lower_bound(1));
    Polyhedron::new(a, b).with_poset(poset)
}

#[test]
fn rectangle_shape() {
    let p = rectangle();
    assert_eq!(p.num_loops(), 2);
    assert!(!p.is_empty());
}

#[test]
fn projection_onto_outer_variable() {
    let mut p = rectangle();
    p.remove_extra_variables(1);
    // the projection is exactly 0 <= m <= M-1
    let (a, b) = p.inequalities();
    assert_eq!(a.num_rows(), 2);
    assert_eq!(a.row(0), &[1]);
    assert_eq!(b[0], &MPoly::var(1) - &MPoly::constant(1));
    assert_eq!(a.row(1), &[-1]);
    assert!(b[1].is_zero());
}

#[test]
fn eliminate_variable_pairs_bounds() {
    // m <= n - 1 and n <= M - 1: eliminating n leaves m <= M - 2
    let a: Matrix<i64> = "[1 -1; 0 1]".parse().unwrap();
    let b = vec![
        MPoly::constant(-1),
        &MPoly::var(1) - &MPoly::constant(1),
    ];
    let mut p = Polyhedron::new(a, b);
    p.eliminate_variable(1);
    let (a, b) = p.inequalities();
    assert_eq!(a.num_rows(), 1);
    assert_eq!(a.row(0), &[1, 0]);
    assert_eq!(b[0], &MPoly::var(1) - &MPoly::constant(2));
}

#[test]
fn substitute_equality_eliminates_everywhere() {
    // m + n == 10, m <= 7, n <= 9
    let a: Matrix<i64> = "[1 0; 0 1]".parse().unwrap();
    let b = vec![MPoly::constant(7), MPoly::constant(9)];
    let e: Matrix<i64> = "[1 1]".parse().unwrap();
    let q = vec![MPoly::constant(10)];
    let mut p = Polyhedron::with_equalities(a, b, e, q);
    assert!(p.substitute_equality(1));
    assert_eq!(p.num_equalities(), 0);
    let (a, b) = p.inequalities();
    // the n <= 9 row became -m <= -1 (that is, m >= 1)
    let mut seen_lower = false;
    for r in 0..a.num_rows() {
        if a.row(r) == &[-1, 0] {
            seen_lower = true;
            assert_eq!(b[r], MPoly::constant(-1));
        }
    }
    assert!(seen_lower);
}

#[test]
fn prune_drops_dominated_parallel_bounds() {
    // m <= M - 1 dominates m <= M + 3
    let a: Matrix<i64> = "[1; 1; -1]".parse().unwrap();
    let m_sym = MPoly::var(1);
    let b = vec![
        &m_sym - &MPoly::constant(1),
        &m_sym + &MPoly::constant(3),
        MPoly::zero(),
    ];
    let mut poset = PartiallyOrderedSet::new();
    poset.push(0, 1, Interval::lower_bound(1));
    let mut p = Polyhedron::new(a, b).with_poset(poset);
    p.prune_bounds();
    let (a, b) = p.inequalities();
    assert_eq!(a.num_rows(), 2);
    for r in 0..a.num_rows() {
        if a.row(r) == &[1] {
            assert_eq!(b[r], &MPoly::var(1) - &MPoly::constant(1));
        }
    }
}

#[test]
fn prune_handles_coupled_bounds() {
    // m <= n and m <= n + 2 couple through n; the first dominates
    let a: Matrix<i64> = "[1 -1; 1 -1; -1 0; 0 1; 0 -1]".parse().unwrap();
    let b = vec![
        MPoly::constant(0),
        MPoly::constant(2),
        MPoly::zero(),
        &MPoly::var(1) - &MPoly::constant(1),
        MPoly::zero(),
    ];
    let mut poset = PartiallyOrderedSet::new();
    poset.push(0, 1, Interval::lower_bound(1));
    let mut p = Polyhedron::new(a, b).with_poset(poset);
    p.prune_bounds();
    let (a, b) = p.inequalities();
    for r in 0..a.num_rows() {
        if a.row(r) == &[1, -1] {
            assert_eq!(b[r], MPoly::constant(0));
        }
    }
    assert_eq!(
        (0..a.num_rows()).filter(|&r| a.row(r) == &[1, -1]).count(),
        1
    );
}

#[test]
fn move_equalities_collects_negation_pairs() {
    // m <= 4 and -m <= -4 collapse into m == 4
    let a: Matrix<i64> = "[1; -1]".parse().unwrap();
    let b = vec![MPoly::constant(4), MPoly::constant(-4)];
    let mut p = Polyhedron::new(a, b);
    p.simplify();
    assert_eq!(p.num_inequalities(), 0);
    assert_eq!(p.num_equalities(), 1);
    let (e, q) = p.equalities();
    assert!(e.row(0) == &[1] || e.row(0) == &[-1]);
    let expect = if e.row(0) == &[1] { 4 } else { -4 };
    assert_eq!(q[0], MPoly::constant(expect));
}

#[test]
fn empty_rectangle_is_detected() {
    // m >= 3 and m <= 1 cannot hold together
    let a: Matrix<i64> = "[1; -1]".parse().unwrap();
    let b = vec![MPoly::constant(1), MPoly::constant(-3)];
    let p = Polyhedron::new(a, b);
    assert!(p.is_empty());
}
