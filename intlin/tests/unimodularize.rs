use intlin::unimodularize::unimodularize;
use intlin::Matrix;

#[test]
fn completes_paired_unit_columns() {
    let ve: Matrix<i64> = "[0 1; 1 0; 0 1; 1 0]".parse().unwrap();
    let u = unimodularize(ve.clone()).expect("columns extend to a basis");
    // U * A must be the identity stacked on zeros
    let ua = u.matmul(&ve);
    for j in 0..2 {
        for i in 0..4 {
            let expect = if i == j { 1 } else { 0 };
            assert_eq!(ua[(i, j)], expect);
        }
    }
}

#[test]
fn completes_3x2() {
    let a: Matrix<i64> = "[9 5; -5 -2; 1 0]".parse().unwrap();
    assert!(unimodularize(a).is_some());
}

#[test]
fn completes_column_vectors() {
    let a: Matrix<i64> = "[6; -5; 15]".parse().unwrap();
    assert!(unimodularize(a).is_some());

    let b: Matrix<i64> = "[102; 190; 345]".parse().unwrap();
    assert!(unimodularize(b).is_some());
}

#[test]
fn rejects_non_primitive_column() {
    // gcd of the single column is 2, so no unimodular completion exists
    let a: Matrix<i64> = "[2; 4; 6]".parse().unwrap();
    assert!(unimodularize(a).is_none());
}
