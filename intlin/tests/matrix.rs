use intlin::{Matrix, Rational};

#[test]
fn identity_and_diagonal() {
    let i: Matrix<i64> = Matrix::identity(3);
    assert!(i.is_diagonal());
    assert_eq!(&i.diag()[..], &[1, 1, 1]);
}

#[test]
fn row_and_column_edits() {
    let mut a: Matrix<i64> = "[1 2; 3 4; 5 6]".parse().unwrap();
    a.swap_rows(0, 2);
    assert_eq!(a.row(0), &[5, 6]);
    a.remove_row(1);
    assert_eq!(a.num_rows(), 2);
    assert_eq!(a.row(1), &[1, 2]);
    a.swap_cols(0, 1);
    assert_eq!(a.row(0), &[6, 5]);
    a.remove_col(0);
    assert_eq!(a.row(0), &[5]);
}

#[test]
fn swap_remove_keeps_last() {
    let mut a: Matrix<i64> = "[1 2; 3 4; 5 6]".parse().unwrap();
    a.swap_remove_row(0);
    assert_eq!(a.num_rows(), 2);
    assert_eq!(a.row(0), &[5, 6]);
    assert_eq!(a.row(1), &[3, 4]);
}

#[test]
fn matvec_matches_matmul() {
    let a: Matrix<i64> = "[1 2 3; 4 5 6]".parse().unwrap();
    let x = [7i64, 8, 9];
    let y = a.matvec(&x);
    assert_eq!(&y[..], &[50, 122]);
}

#[test]
fn blocks_and_views() {
    let a: Matrix<i64> = "[1 2 3; 4 5 6; 7 8 9]".parse().unwrap();
    let b = a.block(1, 3, 0, 2);
    assert_eq!(b, "[4 5; 7 8]".parse().unwrap());
    let v = a.subview(0, 2, 1, 3);
    assert_eq!(v.get(1, 1), 6);
    assert_eq!(v.to_owned(), "[2 3; 5 6]".parse().unwrap());
}

#[test]
fn rational_matrices() {
    let mut m: Matrix<Rational> = Matrix::identity(2);
    m[(0, 1)] = Rational::new(1, 2);
    let sum = &m + &m;
    assert_eq!(sum[(0, 1)], Rational::integer(1));
    assert_eq!(sum[(0, 0)], Rational::integer(2));
}
