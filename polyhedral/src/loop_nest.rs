//! Affine loop nests and the arena that owns them.
//!
//! Dependence records refer to loop nests by [`LoopNestId`]; the arena
//! keeps every nest alive for the duration of an analysis, so records
//! carry plain indices instead of shared ownership.

use crate::polyhedron::Polyhedron;
use crate::poset::PartiallyOrderedSet;
use crate::symbolics::MPoly;
use intlin::Matrix;

/// A loop nest `A·i <= b` over its induction variables, with the symbol
/// order context for the bounds.
#[derive(Clone)]
pub struct AffineLoopNest {
    poly: Polyhedron,
}

impl AffineLoopNest {
    pub fn new(a: Matrix<i64>, b: Vec<MPoly>, poset: PartiallyOrderedSet) -> AffineLoopNest {
        AffineLoopNest {
            poly: Polyhedron::new(a, b).with_poset(poset),
        }
    }

    pub fn num_loops(&self) -> usize {
        self.poly.num_loops()
    }

    pub fn polyhedron(&self) -> &Polyhedron {
        &self.poly
    }

    pub fn polyhedron_mut(&mut self) -> &mut Polyhedron {
        &mut self.poly
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LoopNestId(pub usize);

/// Owns every loop nest of an analysis.
#[derive(Default)]
pub struct LoopNestArena {
    nests: Vec<AffineLoopNest>,
}

impl LoopNestArena {
    pub fn new() -> LoopNestArena {
        LoopNestArena::default()
    }

    pub fn push(&mut self, nest: AffineLoopNest) -> LoopNestId {
        self.nests.push(nest);
        LoopNestId(self.nests.len() - 1)
    }

    pub fn get(&self, id: LoopNestId) -> &AffineLoopNest {
        &self.nests[id.0]
    }

    pub fn len(&self) -> usize {
        self.nests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nests.is_empty()
    }
}
