//! Exact integer linear algebra without external BLAS or LAPACK.
//!
//! Dense matrices and views
//! -------------------------
//!
//! [`Matrix`] is an owning row-major dense matrix with a row stride and a
//! small-buffer optimized backing store; [`MatrixRef`] and [`MatrixMut`]
//! are shared and exclusive borrowed windows, and strided column views
//! come from [`Matrix::col`]. A matrix literal parser is provided for
//! tests:
//!
//! ```
//! use intlin::Matrix;
//!
//! let a: Matrix<i64> = "[1 2; 3 4]".parse().unwrap();
//! assert_eq!(a[(1, 0)], 3);
//! ```
//!
//! Normal forms
//! ------------
//!
//! The [`normal_form`] module keeps every intermediate an integer:
//!
//! - [`normal_form::hermite`] — Hermite normal form with its unimodular
//!   transform,
//! - [`normal_form::bareiss`] — fraction-free echelon reduction,
//! - [`normal_form::solve_system_pair`] — diagonalizing solves where the
//!   diagonal carries the denominators,
//! - [`normal_form::null_space`] — integer left-null-space bases,
//! - [`normal_form::scaled_inv`] — `B * A == s * I` inverses,
//! - [`unimodularize::unimodularize`] — unimodular completion.
//!
//! Scalars
//! -------
//!
//! [`Rational`] is a reduced `i64` fraction whose `safe_*` operations
//! report overflow as `None`; the plain operators are the checked
//! variants. Comparisons cross-multiply in 128 bits and never overflow.

pub mod error;
pub mod gcd;
pub mod matrix;
pub mod normal_form;
pub mod parse;
pub mod rational;
pub mod unimodularize;
pub mod vector;

pub use self::error::{Error, Result};
pub use self::matrix::{ColRef, Matrix, MatrixMut, MatrixRef, SquareMatrix};
pub use self::rational::Rational;
pub use self::vector::Vector;
