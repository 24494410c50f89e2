use intlin::Matrix;
use polyhedral::poset::{Interval, PartiallyOrderedSet};
use polyhedral::{Compare, SymbolicComparator};

#[test]
fn basic_compare() {
    // over the layout [1, v1, v2, v3, v4]: v2 >= 1, v2 >= v1, v3 >= v2,
    // and v4 >= v2; the query asks whether v3 >= 1 is implied (it is,
    // through v3 >= v2 >= 1).
    let a: Matrix<i64> = "[-1 0 1 0 0; 0 -1 1 0 0; 0 0 -1 1 0; 0 0 -1 0 1]"
        .parse()
        .unwrap();
    let cmp = SymbolicComparator::from_inequalities(&a, true);
    assert!(cmp.greater_equal_zero(&[-1, 0, 0, 1, 0]));
}

#[test]
fn not_implied_is_false() {
    let a: Matrix<i64> = "[-1 0 1 0 0; 0 -1 1 0 0; 0 0 -1 1 0; 0 0 -1 0 1]"
        .parse()
        .unwrap();
    let cmp = SymbolicComparator::from_inequalities(&a, true);
    // nothing pins v1 from above
    assert!(!cmp.greater_equal_zero(&[5, 0, -1, 0, 0]));
    // v4 chains above v2 just like v3 does
    assert!(cmp.greater_equal_zero(&[-1, 0, 0, 0, 1]));
}

#[test]
fn derived_orderings() {
    // x0 >= 0 and x1 >= 0
    let a: Matrix<i64> = "[1 0; 0 1]".parse().unwrap();
    let cmp = SymbolicComparator::from_inequalities(&a, true);
    let x = [3i64, 1];
    let y = [1i64, 1];
    assert!(cmp.greater_equal(&x, &y));
    assert!(cmp.greater(&x, &y));
    assert!(cmp.less_equal(&y, &x));
    assert!(!cmp.greater(&x, &x));
    assert!(cmp.equal(&x, &x));
    let neg = [-3i64, -1];
    assert!(cmp.equal_negative(&x, &neg));
}

#[test]
fn equalities_participate() {
    // x0 - x1 == 0 implies x0 - x1 >= 0
    let a: Matrix<i64> = "[1 0 0]".parse().unwrap();
    let e: Matrix<i64> = "[0 1 -1]".parse().unwrap();
    let cmp = SymbolicComparator::with_equalities(&a, &e, true);
    assert!(cmp.greater_equal_zero(&[0, 1, -1]));
    assert!(cmp.greater_equal_zero(&[0, -1, 1]));
}

#[test]
fn feasible_system_is_not_empty() {
    let a: Matrix<i64> = "[1 0; 0 1]".parse().unwrap();
    let cmp = SymbolicComparator::from_inequalities(&a, true);
    assert!(!cmp.is_empty());
}

#[test]
fn symbolic_fallback_uses_poset() {
    // no useful linear constraints over [1, M], but the poset knows
    // M >= 1, so M - 1 >= 0 resolves symbolically
    let a: Matrix<i64> = "[0 0]".parse().unwrap();
    let mut poset = PartiallyOrderedSet::new();
    poset.push(0, 1, Interval::lower_bound(1));
    let cmp = SymbolicComparator::from_inequalities(&a, true).with_poset(poset, 1);
    assert!(cmp.greater_equal_zero(&[-1, 1]));
    assert!(!cmp.greater_equal_zero(&[-2, 1]));
}
