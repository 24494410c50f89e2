use intlin::normal_form;
use intlin::Matrix;
use rand::Rng;

fn is_hnf(a: &Matrix<i64>) -> bool {
    let (m, n) = (a.num_rows(), a.num_cols());
    let mut l = 0usize;
    for i in 0..m {
        for j in 0..l {
            if a[(i, j)] != 0 {
                return false;
            }
        }
        while l < n && a[(i, l)] == 0 {
            l += 1;
        }
        if l == n {
            continue;
        }
        let pivot = a[(i, l)];
        if pivot < 0 {
            return false;
        }
        for r in 0..i {
            let above = a[(r, l)];
            if above >= pivot || above < 0 {
                return false;
            }
        }
    }
    true
}

#[test]
fn hermite_4x3() {
    let a: Matrix<i64> = "[2 5 8; 3 6 3; 6 1 1; 2 6 1]".parse().unwrap();
    let (h, u) = normal_form::hermite(a.clone());
    assert!(is_hnf(&h));
    assert_eq!(u.matmul(&a), h);

    // make row 2 a combination of rows 0 and 1
    let mut b = a.clone();
    for j in 0..3 {
        b[(2, j)] = b[(0, j)] + b[(1, j)];
    }
    let (h2, u2) = normal_form::hermite(b.clone());
    assert!(is_hnf(&h2));
    assert_eq!(u2.matmul(&b), h2);
}

#[test]
fn hermite_square() {
    let a: Matrix<i64> = "[3 7 -5 -5; -6 -8 8 -6; 7 10 7 8; 7 6 3 -1]"
        .parse()
        .unwrap();
    let (h, u) = normal_form::hermite(a.clone());
    assert!(is_hnf(&h));
    assert_eq!(u.matmul(&a), h);
}

#[test]
fn hermite_wide() {
    let a: Matrix<i64> = "[-3 -1 1; 0 0 -2]".parse().unwrap();
    let (h, u) = normal_form::hermite(a.clone());
    assert!(is_hnf(&h));
    assert_eq!(u.matmul(&a), h);

    let b: Matrix<i64> =
        "[3 3 -3 1 0 -1 -2 1 1 2 -1; 3 3 -3 1 1 -3 2 0 3 0 -3; 2 -3 -2 -1 1 -2 3 3 3 3 -3]"
            .parse()
            .unwrap();
    let (h2, u2) = normal_form::hermite(b.clone());
    assert!(is_hnf(&h2));
    assert_eq!(u2.matmul(&b), h2);
}

#[test]
fn hermite_randomized() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let rows = rng.gen_range(1..6);
        let cols = rng.gen_range(1..6);
        let mut a = Matrix::zeroed(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                a[(i, j)] = rng.gen_range(-10..=10);
            }
        }
        let (h, u) = normal_form::hermite(a.clone());
        assert!(is_hnf(&h), "not HNF: {:?} from {:?}", h, a);
        assert_eq!(u.matmul(&a), h);
    }
}

#[test]
fn bareiss_literals() {
    let mut a: Matrix<i64> = "[-4 3 -2 2 -5; -5 1 -1 2 -5; -1 0 5 -3 2; -4 5 -4 -2 -4]"
        .parse()
        .unwrap();
    let piv = normal_form::bareiss(&mut a);
    let b: Matrix<i64> = "[-4 3 -2 2 -5; 0 11 -6 2 -5; 0 0 56 -37 32; 0 0 0 -278 136]"
        .parse()
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(&piv[..], &[0, 1, 2, 3]);

    let mut c: Matrix<i64> = "[-2 -2 -1 -2 -1; 1 1 2 2 -2; -2 2 2 -1 -1; 0 0 -2 1 -1; -1 -2 2 1 -1]"
        .parse()
        .unwrap();
    let d: Matrix<i64> = "[-2 -2 -1 -2 -1; 0 -8 -6 -2 0; 0 0 -12 -8 20; 0 0 0 -28 52; 0 0 0 0 -142]"
        .parse()
        .unwrap();
    let pivots = normal_form::bareiss(&mut c);
    assert_eq!(c, d);
    assert_eq!(&pivots[..], &[0, 2, 2, 3, 4]);
}

#[test]
fn solve_system_literals() {
    let mut a: Matrix<i64> = "[2 4 5 5 -5; -4 3 -4 -3 -1; 1 0 -2 1 -4; -4 -2 3 -2 -1]"
        .parse()
        .unwrap();
    let mut b: Matrix<i64> = "[-6 86 -27 46 0 -15; -90 -81 91 44 -2 78; 4 -54 -98 80 -10 82; -98 -15 -28 98 82 87]"
        .parse()
        .unwrap();
    normal_form::solve_system_pair(&mut a, &mut b);
    let sa: Matrix<i64> = "[-3975 0 0 0 -11370; 0 -1325 0 0 -1305; 0 0 -265 0 -347; 0 0 0 265 -1124]"
        .parse()
        .unwrap();
    let true_b: Matrix<i64> = "[-154140 -128775 -205035 317580 83820 299760; -4910 -21400 -60890 44820 14480 43390; -1334 -6865 -7666 8098 -538 9191; -6548 -9165 -24307 26176 4014 23332]"
        .parse()
        .unwrap();
    assert_eq!(a, sa);
    assert_eq!(b, true_b);
}

#[test]
fn simplify_system_literals() {
    let mut c: Matrix<i64> = "[1 1 0; 0 1 1; 1 2 1]".parse().unwrap();
    let mut d: Matrix<i64> = "[1 0 0; 0 1 0; 0 0 1]".parse().unwrap();
    normal_form::simplify_system_pair(&mut c, &mut d);
    let true_c: Matrix<i64> = "[1 0 -1; 0 1 1]".parse().unwrap();
    let true_d: Matrix<i64> = "[1 -1 0; 0 1 0]".parse().unwrap();
    assert_eq!(c, true_c);
    assert_eq!(d, true_d);
}

#[test]
fn null_space_literal() {
    let a: Matrix<i64> = "[0 1; 1 0; 0 1; 1 0]".parse().unwrap();
    let ns = normal_form::null_space(a.clone());
    assert_eq!(ns.num_rows(), 2);
    assert_eq!(ns.num_cols(), 4);
    let z = ns.matmul(&a);
    for i in 0..z.num_rows() {
        assert!(z.row_is_zero(i));
    }
    assert_eq!(normal_form::rank(ns), 2);
}

#[test]
fn null_space_randomized() {
    let mut rng = rand::thread_rng();
    for cols in &[2usize, 4, 6] {
        for _ in 0..50 {
            let mut b = Matrix::zeroed(8, *cols);
            for i in 0..8 {
                for j in 0..*cols {
                    // bias toward zeros so the null space is often nontrivial
                    let v: i64 = rng.gen_range(-10..=100);
                    b[(i, j)] = if v > 10 { 0 } else { v };
                }
            }
            let ns = normal_form::null_space(b.clone());
            let z = ns.matmul(&b);
            for i in 0..z.num_rows() {
                assert!(z.row_is_zero(i));
            }
            // the null space of a maximal-rank basis is trivial
            assert_eq!(normal_form::null_space(ns.clone()).num_rows(), 0);
        }
    }
}

#[test]
fn inverse_randomized() {
    let mut rng = rand::thread_rng();
    for dim in 1..5usize {
        for _ in 0..100 {
            let mut b = Matrix::zeroed(dim, dim);
            loop {
                for i in 0..dim {
                    for j in 0..dim {
                        b[(i, j)] = rng.gen_range(-10..=10);
                    }
                }
                if normal_form::rank(b.clone()) == dim {
                    break;
                }
            }
            // D0 * B^{-1} = Binv0, so D0 = Binv0 * B
            let (d0, binv0) = normal_form::inv(b.clone());
            assert!(d0.is_diagonal());
            assert_eq!(binv0.matmul(&b), d0);

            let (binv1, s) = normal_form::scaled_inv(b.clone()).unwrap();
            let mut d1: Matrix<i64> = Matrix::identity(dim);
            d1 *= s;
            assert_eq!(b.matmul(&binv1), d1);
        }
    }
}

#[test]
fn scaled_inv_rejects_singular() {
    let a: Matrix<i64> = "[1 2; 2 4]".parse().unwrap();
    assert!(normal_form::scaled_inv(a).is_err());
}

#[test]
fn orthogonalize_motivating_example() {
    let b: Matrix<i64> = "[1 0 1 0 0 0; 0 1 0 1 0 0; 1 0 0 0 1 0; 0 1 0 0 0 1]"
        .parse()
        .unwrap();
    let (k, included) = normal_form::orthogonalize(b.clone());
    assert_eq!(&included[..], &[0, 1, 2, 3]);
    let mut a = Matrix::zeroed(4, 4);
    for n in 0..4 {
        for (m, &col) in included.iter().enumerate() {
            a[(n, m)] = b[(n, col)];
        }
    }
    let identity: Matrix<i64> = Matrix::identity(4);
    assert_eq!(k.matmul(&a), identity);
}

#[test]
fn orthogonalize_randomized() {
    let mut rng = rand::thread_rng();
    let identity: Matrix<i64> = Matrix::identity(4);
    for _ in 0..200 {
        let mut b = Matrix::zeroed(4, 8);
        for i in 0..4 {
            for j in 0..8 {
                b[(i, j)] = rng.gen_range(-10..=10);
            }
        }
        let (k, included) = normal_form::orthogonalize(b.clone());
        if included.len() == 4 {
            let mut a = Matrix::zeroed(4, 4);
            for n in 0..4 {
                for (m, &col) in included.iter().enumerate() {
                    a[(n, m)] = b[(n, col)];
                }
            }
            assert_eq!(k.matmul(&a), identity);
        }
    }
}
