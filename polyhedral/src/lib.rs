//! Polyhedral loop analysis over exact integer arithmetic.
//!
//! The crate layers on [`intlin`]'s dense integer matrices and normal
//! forms:
//!
//! - [`symbolics`] — multivariate polynomials over program symbols, the
//!   currency of symbolic loop bounds;
//! - [`poset`] — saturating intervals and a partially ordered symbol
//!   set, closed under transitivity, answering conservative sign
//!   queries;
//! - [`comparator`] — Farkas-lemma implication tests for affine
//!   inequalities, with a symbolic fallback through the POSet;
//! - [`polyhedron`] — `A·x <= b ∧ E·x == q` with Fourier-Motzkin
//!   elimination, equality substitution, and redundancy pruning;
//! - [`simplex`] — a feasibility-checked integer-tableau simplex;
//! - [`dependence`] — dependence polyhedra between affine array
//!   accesses and their Farkas schedule-gap dualization.
//!
//! Everything is deterministic and single-threaded; queries answer
//! `true` only on proof, and arithmetic overflow degrades an answer to
//! "not known" rather than aborting.

pub mod bipartite;
pub mod comparator;
pub mod dependence;
pub mod loop_nest;
pub mod polyhedron;
pub mod poset;
pub mod simplex;
pub mod symbolics;

pub use self::comparator::{Compare, SymbolicComparator};
pub use self::dependence::{ArrayReference, Dependence, MemoryAccess, Schedule, Subscript};
pub use self::loop_nest::{AffineLoopNest, LoopNestArena, LoopNestId};
pub use self::polyhedron::{Polyhedron, ReductionState};
pub use self::poset::{Interval, PartiallyOrderedSet};
pub use self::simplex::Simplex;
pub use self::symbolics::{MPoly, Monomial, Term};
