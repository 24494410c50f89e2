use intlin::Matrix;
use polyhedral::dependence::{farkas_gap_feasible, Subscript};
use polyhedral::poset::{Interval, PartiallyOrderedSet};
use polyhedral::symbolics::MPoly;
use polyhedral::{
    AffineLoopNest, ArrayReference, Dependence, LoopNestArena, MemoryAccess, Schedule,
};

/// `(i, j, k) in [0, I-1] x [0, J-1] x [0, K-1]`.
fn triple_nest(arena: &mut LoopNestArena) -> polyhedral::LoopNestId {
    let a: Matrix<i64> = "[1 0 0; -1 0 0; 0 1 0; 0 -1 0; 0 0 1; 0 0 -1]"
        .parse()
        .unwrap();
    let bounds = |s: u32| &MPoly::var(s) - &MPoly::constant(1);
    let b = vec![
        bounds(1),
        MPoly::zero(),
        bounds(2),
        MPoly::zero(),
        bounds(3),
        MPoly::zero(),
    ];
    let mut poset = PartiallyOrderedSet::new();
    poset.push(0, 1, Interval::lower_bound(1));
    poset.push(0, 2, Interval::lower_bound(1));
    poset.push(0, 3, Interval::lower_bound(1));
    arena.push(AffineLoopNest::new(a, b, poset))
}

/// `i in [0, I-1]`.
fn single_nest(arena: &mut LoopNestArena) -> polyhedral::LoopNestId {
    let a: Matrix<i64> = "[1; -1]".parse().unwrap();
    let b = vec![&MPoly::var(1) - &MPoly::constant(1), MPoly::zero()];
    let mut poset = PartiallyOrderedSet::new();
    poset.push(0, 1, Interval::lower_bound(2));
    arena.push(AffineLoopNest::new(a, b, poset))
}

#[test]
fn no_cross_iteration_dependence_on_inner_loops() {
    // x[i] = f(x[i]) inside the (i, j, k) nest: the store and load sit
    // at the same loop position, and j, k never reach the subscript
    let mut arena = LoopNestArena::new();
    let nest = triple_nest(&mut arena);
    let xref = ArrayReference::new(
        0,
        nest,
        vec![Subscript::new(vec![1, 0, 0], MPoly::zero())],
    );
    let sch_load = Schedule::identity(3);
    let mut sch_store = Schedule::identity(3);
    sch_store.omega_mut()[6] = 1; // the store follows the load in the body
    let store = MemoryAccess::new(xref.clone(), sch_store, false);
    let load = MemoryAccess::new(xref, sch_load, true);
    let mut sink = Vec::new();
    assert_eq!(Dependence::check(&mut sink, &arena, &store, &load), 0);
    assert!(sink.is_empty());
}

#[test]
fn same_iteration_program_order_is_respected() {
    // the load happens first, so load -> store is a same-iteration
    // dependence while store -> load is not
    let mut arena = LoopNestArena::new();
    let nest = triple_nest(&mut arena);
    let xref = ArrayReference::new(
        0,
        nest,
        vec![Subscript::new(vec![1, 0, 0], MPoly::zero())],
    );
    let sch_load = Schedule::identity(3);
    let mut sch_store = Schedule::identity(3);
    sch_store.omega_mut()[6] = 1;
    let store = MemoryAccess::new(xref.clone(), sch_store, false);
    let load = MemoryAccess::new(xref, sch_load, true);
    let mut sink = Vec::new();
    assert_eq!(Dependence::check(&mut sink, &arena, &load, &store), 1);
    assert_eq!(sink.len(), 1);
    assert!(sink[0].forward);
    assert_eq!(sink[0].depth, 3);
}

#[test]
fn loop_carried_flow_dependence() {
    // x[i] = g(x[i-1]): the store at iteration i feeds the load at i+1
    let mut arena = LoopNestArena::new();
    let nest = single_nest(&mut arena);
    let store_ref = ArrayReference::new(0, nest, vec![Subscript::new(vec![1], MPoly::zero())]);
    let load_ref = ArrayReference::new(
        0,
        nest,
        vec![Subscript::new(vec![1], MPoly::constant(-1))],
    );
    let store = MemoryAccess::new(store_ref, Schedule::identity(1), false);
    let load = MemoryAccess::new(load_ref, Schedule::identity(1), true);
    let mut sink = Vec::new();
    assert_eq!(Dependence::check(&mut sink, &arena, &store, &load), 1);
    let dep = &sink[0];
    assert!(dep.forward);
    assert_eq!(dep.depth, 0);
    assert_eq!(dep.poly.num_loops(), 2);
    assert!(!dep.poly.is_empty());
}

#[test]
fn different_arrays_never_depend() {
    let mut arena = LoopNestArena::new();
    let nest = single_nest(&mut arena);
    let a_ref = ArrayReference::new(0, nest, vec![Subscript::new(vec![1], MPoly::zero())]);
    let b_ref = ArrayReference::new(1, nest, vec![Subscript::new(vec![1], MPoly::zero())]);
    let w = MemoryAccess::new(a_ref, Schedule::identity(1), false);
    let r = MemoryAccess::new(b_ref, Schedule::identity(1), true);
    let mut sink = Vec::new();
    assert_eq!(Dependence::check(&mut sink, &arena, &w, &r), 0);
}

#[test]
fn strided_subscripts_alias_when_solvable() {
    let mut arena = LoopNestArena::new();
    let nest = single_nest(&mut arena);
    let w_ref = ArrayReference::new(0, nest, vec![Subscript::new(vec![1], MPoly::zero())]);
    let r_ref = ArrayReference::new(0, nest, vec![Subscript::new(vec![2], MPoly::zero())]);
    let w = MemoryAccess::new(w_ref, Schedule::identity(1), false);
    let r = MemoryAccess::new(r_ref, Schedule::identity(1), true);
    // i == 2 i' has solutions (for instance i = 2, i' = 1), so a
    // forward dependence at depth 0 must be reported
    let mut sink = Vec::new();
    assert!(Dependence::check(&mut sink, &arena, &r, &w) >= 1);
}

#[test]
fn farkas_gap_admits_legal_schedule() {
    let mut arena = LoopNestArena::new();
    let nest = single_nest(&mut arena);
    let store_ref = ArrayReference::new(0, nest, vec![Subscript::new(vec![1], MPoly::zero())]);
    let load_ref = ArrayReference::new(
        0,
        nest,
        vec![Subscript::new(vec![1], MPoly::constant(-1))],
    );
    let store = MemoryAccess::new(store_ref, Schedule::identity(1), false);
    let load = MemoryAccess::new(load_ref, Schedule::identity(1), true);
    let mut sink = Vec::new();
    Dependence::check(&mut sink, &arena, &store, &load);
    let dep = &sink[0];
    // the textual schedule separates the accesses by a full iteration,
    // so coefficients exist with gap >= 1, and a fortiori gap >= 0
    assert!(farkas_gap_feasible(dep, 1, false));
    assert!(farkas_gap_feasible(dep, 1, true));
}
