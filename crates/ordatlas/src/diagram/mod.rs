//! Ordering-constraint decision diagrams
//!
//! A comparator compiles ordered lists of term-ordering constraints, each
//! with an opaque payload, into one shared decision diagram. Queries bind
//! a substitution and walk the diagram lazily; static decisions are
//! memoized by rewriting edges in place, substitution-dependent decisions
//! only move the cursor. Ground comparators can instead be enumerated
//! exhaustively or compacted, and vars-only comparators feed the variable
//! order extractor.

pub mod extractor;
pub mod node;
pub mod polynomial;
pub mod trace;

#[cfg(test)]
mod proptest_tests;

pub use extractor::VarOrderExtractor;
pub use node::{Arena, Dir, Node, NodeId, NodeKind};
pub use polynomial::{PolyId, PolyInterner, Polynomial, TieBreak, WeightExpansion};
pub use trace::{POStruct, RelMask, TermOrderingConstraint, Trace};

use crate::fol::interner::VariableId;
use crate::fol::ordering::{Ordering, TermOrdering};
use crate::fol::substitution::{AppliedTerm, Substitution};
use crate::fol::term::Term;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Location of an edge in the diagram: either the root edge or an
/// outgoing edge of a node. The cursor always sits on an edge so the
/// edge itself can be rewritten when its target simplifies.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Loc {
    Source,
    Branch(NodeId, Dir),
}

fn branch_for(cmp: Ordering) -> Dir {
    match cmp {
        Ordering::Greater => Dir::Gt,
        Ordering::Equal => Dir::Eq,
        Ordering::Less | Ordering::Incomparable => Dir::Nge,
    }
}

fn mask_for(dir: Dir) -> RelMask {
    match dir {
        Dir::Gt => RelMask::GREATER,
        Dir::Eq => RelMask::EQUAL,
        Dir::Nge => RelMask::NGEQ,
        Dir::Alt => unreachable!("alternative edges carry no ordering fact"),
    }
}

/// A compiled decision diagram over term-ordering comparisons
pub struct OrderingComparator<'o, D> {
    ordering: &'o dyn TermOrdering,
    arena: Arena<D>,
    polys: PolyInterner,
    /// Diagram root
    source: NodeId,
    /// Unready failure terminal where the next insertion is appended
    sink: NodeId,
    /// Terminal standing in for paths proven unreachable, lazily created
    vacuous: Option<NodeId>,
    only_vars: bool,
    ground: bool,
    /// Trace assumed to hold before the root comparison
    head: Trace,
    curr: Loc,
    subst: Option<Substitution>,
}

impl<'o, D: Clone + PartialEq> OrderingComparator<'o, D> {
    /// Create an empty comparator. `only_vars` restricts comparisons to
    /// variables and their immediate subterms (extraction diagrams),
    /// `ground` enables the enumeration operations and disables lazy
    /// queries. `head` is a trace assumed to hold at the root.
    pub fn new(
        ordering: &'o dyn TermOrdering,
        only_vars: bool,
        ground: bool,
        head: Option<Trace>,
    ) -> Self {
        let mut arena = Arena::new();
        // the root starts out as the sink itself; the first insert morphs
        // it into a constraint chain
        let source = arena.alloc_with(|id| Node::data(None, id));
        arena.bump(source); // self edge, on top of the comparator's handle
        OrderingComparator {
            ordering,
            arena,
            polys: PolyInterner::new(),
            source,
            sink: source,
            vacuous: None,
            only_vars,
            ground,
            head: head.unwrap_or_default(),
            curr: Loc::Source,
            subst: None,
        }
    }

    // ==================== construction ====================

    /// Append one conjunctive constraint chain ending in `data`. The
    /// current sink is morphed in place into the chain head, so branches
    /// that deviated from earlier chains fall through into this one; a
    /// fresh failure terminal becomes the new sink.
    pub fn insert(&mut self, constraints: &[TermOrderingConstraint], data: D) {
        {
            let sink = self.arena.get(self.sink);
            assert!(!sink.ready && sink.is_fail(), "sink must be a fresh failure terminal");
        }

        // alloc ref doubles as the self edge
        let fail = self.arena.alloc_with(|id| Node::data(None, id));

        self.arena.bump(fail);
        let head = if let Some((first, rest)) = constraints.split_first() {
            let mut next = self.arena.alloc(Node::data(Some(data), fail));
            for c in rest.iter().rev() {
                self.arena.bump(fail);
                self.arena.bump(fail);
                let (gt, eq, nge) = route(c.rel, next, fail);
                next = self.arena.alloc(Node::term(c.lhs.clone(), c.rhs.clone(), gt, eq, nge));
            }
            self.arena.bump(fail);
            self.arena.bump(fail);
            let (gt, eq, nge) = route(first.rel, next, fail);
            Node::term(first.lhs.clone(), first.rhs.clone(), gt, eq, nge)
        } else {
            // unconditional payload
            Node::data(Some(data), fail)
        };

        let old = self.sink;
        let slot = self.arena.get_mut(old);
        slot.kind = head.kind;
        slot.ready = false;
        slot.trace = None;
        slot.prev_poly = None;
        // the morphed node no longer points at itself
        self.arena.release(old);
        self.sink = fail;
    }

    // ==================== lazy queries ====================

    /// Bind a substitution and reset the cursor to the root. Only legal
    /// when the comparator is in neither ground nor vars-only mode.
    pub fn init(&mut self, subst: Substitution) {
        assert!(!self.ground && !self.only_vars, "lazy queries need a plain comparator");
        self.subst = Some(subst);
        self.curr = Loc::Source;
    }

    /// Advance to the next payload whose constraint chain is satisfied by
    /// the bound substitution. `None` when the matches are exhausted.
    pub fn next(&mut self) -> Option<D> {
        assert!(self.subst.is_some(), "init must be called before next");
        loop {
            self.process_current_node();
            let id = self.target(self.curr);
            let node = self.arena.get(id);
            match &node.kind {
                NodeKind::Data { data, alt } => {
                    if *alt == id {
                        // sink or vacuous terminal: nothing beyond
                        return None;
                    }
                    let data = data.clone();
                    self.curr = Loc::Branch(id, Dir::Alt);
                    if let Some(d) = data {
                        return Some(d);
                    }
                }
                NodeKind::Term { lhs, rhs, .. } => {
                    let subst = self.subst.as_ref().unwrap();
                    let cmp = self.ordering.compare_applied(
                        AppliedTerm::new(lhs, subst),
                        AppliedTerm::new(rhs, subst),
                        None,
                    );
                    self.curr = Loc::Branch(id, branch_for(cmp));
                }
                NodeKind::Poly { poly, .. } => {
                    let cmp = self.eval_poly(*poly);
                    self.curr = Loc::Branch(id, branch_for(cmp));
                }
            }
        }
    }

    /// Evaluate the sign of a weight polynomial under the bound
    /// substitution. Positive-coefficient entries come first, so the scan
    /// can stop as soon as the running weight or an occurrence-count
    /// delta goes negative with negative coefficients still pending.
    fn eval_poly(&self, pid: PolyId) -> Ordering {
        let poly = self.polys.resolve(pid);
        let subst = self.subst.as_ref().unwrap();
        let mut weight = poly.constant;
        let mut counts: HashMap<VariableId, i64> = HashMap::new();

        for (i, &(var, coeff)) in poly.var_coeffs.iter().enumerate() {
            let var_term = Term::var(var);
            weight += coeff * self.ordering.compute_weight(AppliedTerm::new(&var_term, subst));
            match subst.get(var) {
                Some(bound) => add_var_counts(bound, coeff, &mut counts),
                None => *counts.entry(var).or_insert(0) += coeff,
            }
            let pending = poly.var_coeffs[i + 1..].iter().any(|&(_, c)| c < 0);
            if pending && (weight < 0 || counts.values().any(|&c| c < 0)) {
                return Ordering::Incomparable;
            }
        }

        if counts.values().any(|&c| c < 0) {
            return Ordering::Incomparable;
        }
        if weight > 0 {
            Ordering::Greater
        } else if weight == 0 {
            Ordering::Equal
        } else {
            Ordering::Incomparable
        }
    }

    // ==================== node processing ====================

    /// Resolve unready nodes under the cursor until it rests on a ready
    /// node or the sink. Processing rewrites edges (memoized for every
    /// later visit) but never consults the bound substitution.
    pub(crate) fn process_current_node(&mut self) {
        loop {
            let id = self.target(self.curr);
            let node = self.arena.get(id);
            if node.ready {
                return;
            }
            match &node.kind {
                NodeKind::Data { data, alt } => {
                    // failure terminals stay unready so shared sinks are
                    // never cloned just to be marked
                    if data.is_none() && *alt == id {
                        return;
                    }
                    match self.current_trace() {
                        Some(trace) => {
                            let id = self.cow();
                            self.make_ready(id, trace);
                            return;
                        }
                        None => self.redirect_to_vacuous(),
                    }
                }
                NodeKind::Term { lhs, rhs, .. } => {
                    match self.ordering.compare(lhs, rhs) {
                        Ordering::Incomparable => {
                            let var_case = lhs.is_var() || rhs.is_var();
                            if var_case {
                                self.process_var_node();
                            } else {
                                self.process_term_node();
                            }
                        }
                        cmp => {
                            // decided for every substitution: skip the node
                            self.redirect(branch_for(cmp));
                        }
                    }
                }
                NodeKind::Poly { .. } => self.process_poly_node(),
            }
        }
    }

    /// A comparison that is not statically decided and involves at least
    /// one variable.
    fn process_var_node(&mut self) {
        let id = self.target(self.curr);
        let (lhs, rhs) = match &self.arena.get(id).kind {
            NodeKind::Term { lhs, rhs, .. } => (lhs.clone(), rhs.clone()),
            _ => unreachable!(),
        };

        if self.only_vars {
            assert!(rhs.is_var(), "vars-only comparators compare against variables");
            match &lhs {
                Term::Constant(_) => {
                    // a constant is never greater than or equal to an
                    // unconstrained variable here
                    self.redirect(Dir::Nge);
                    return;
                }
                Term::Function(_, args) => {
                    self.split_compound_vs_var(id, args.clone(), rhs);
                    return;
                }
                Term::Variable(_) => {}
            }
        }

        let Some(trace) = self.current_trace() else {
            self.redirect_to_vacuous();
            return;
        };
        let mask = trace.get(&lhs, &rhs);
        if mask.implies(RelMask::GREATER) {
            self.redirect(Dir::Gt);
        } else if mask.implies(RelMask::EQUAL) {
            self.redirect(Dir::Eq);
        } else if mask.implies(RelMask::NGEQ) {
            self.redirect(Dir::Nge);
        } else {
            // no branch can be chosen without more information; the node
            // becomes ready with its outcome left to the visitor
            let id = self.cow();
            self.make_ready(id, trace);
        }
    }

    /// Rewrite `f(a1..an) ? x` into a cascade comparing each argument
    /// against `x`: any argument greater than or equal to the variable
    /// makes the whole term greater. The original equal branch is
    /// dropped, an approximation inherited from the weight ordering.
    fn split_compound_vs_var(&mut self, orig: NodeId, args: Vec<Term>, var: Term) {
        let (ogt, onge) = match &self.arena.get(orig).kind {
            NodeKind::Term { gt, nge, .. } => (*gt, *nge),
            _ => unreachable!(),
        };
        self.arena.bump(onge);
        let mut next = onge;
        for arg in args.iter().rev() {
            self.arena.bump(ogt);
            self.arena.bump(ogt);
            next = self
                .arena
                .alloc(Node::term(arg.clone(), var.clone(), ogt, ogt, next));
        }
        self.set_target(self.curr, next);
    }

    /// A statically undecided comparison of two non-variable terms: ask
    /// the ordering to refine it into a weight polynomial, an argument
    /// comparison, or a decision. Without a refinement the node is kept
    /// opaque and resolved per query.
    fn process_term_node(&mut self) {
        let id = self.target(self.curr);
        let (lhs, rhs) = match &self.arena.get(id).kind {
            NodeKind::Term { lhs, rhs, .. } => (lhs.clone(), rhs.clone()),
            _ => unreachable!(),
        };

        match self.ordering.refine(&lhs, &rhs, &mut self.polys) {
            None => match self.current_trace() {
                Some(trace) => {
                    let id = self.cow();
                    self.make_ready(id, trace);
                }
                None => self.redirect_to_vacuous(),
            },
            Some(WeightExpansion::Decided(cmp)) => self.redirect(branch_for(cmp)),
            Some(WeightExpansion::Lex(args)) => {
                let head = self.build_lex_chain(id, &args);
                self.set_target(self.curr, head);
            }
            Some(WeightExpansion::Poly { poly, tie }) => {
                let (ogt, oeq, onge) = match &self.arena.get(id).kind {
                    NodeKind::Term { gt, eq, nge, .. } => (*gt, *eq, *nge),
                    _ => unreachable!(),
                };
                // equal weights fall through into the tie break
                let eq_target = match tie {
                    TieBreak::Decided(cmp) => {
                        let t = match branch_for(cmp) {
                            Dir::Gt => ogt,
                            Dir::Eq => oeq,
                            _ => onge,
                        };
                        self.arena.bump(t);
                        t
                    }
                    TieBreak::ArgsLex(args) => self.build_lex_chain(id, &args),
                };
                self.arena.bump(ogt);
                self.arena.bump(onge);
                let pnode = self.arena.alloc(Node::poly(poly, ogt, eq_target, onge));
                self.set_target(self.curr, pnode);
            }
        }
    }

    /// Chain of argument comparisons replacing a node whose sides have
    /// the same top symbol and equal weights: the first non-equal
    /// argument pair decides, all pairs equal means the terms are equal.
    fn build_lex_chain(&mut self, orig: NodeId, args: &[(Term, Term)]) -> NodeId {
        assert!(!args.is_empty(), "equal nullary terms are decided statically");
        let (ogt, oeq, onge) = match &self.arena.get(orig).kind {
            NodeKind::Term { gt, eq, nge, .. } => (*gt, *eq, *nge),
            _ => unreachable!(),
        };
        self.arena.bump(oeq);
        let mut next = oeq;
        for (a, b) in args.iter().rev() {
            self.arena.bump(ogt);
            self.arena.bump(onge);
            next = self
                .arena
                .alloc(Node::term(a.clone(), b.clone(), ogt, next, onge));
        }
        next
    }

    /// Simplify a weight polynomial against the trace valid at this
    /// point, deciding the branch when the sign is forced.
    fn process_poly_node(&mut self) {
        let id = self.target(self.curr);
        let pid = match &self.arena.get(id).kind {
            NodeKind::Poly { poly, .. } => *poly,
            _ => unreachable!(),
        };

        let Some(trace) = self.current_trace() else {
            self.redirect_to_vacuous();
            return;
        };

        // merge variables the trace knows to be equal
        let poly = self.polys.resolve(pid).clone();
        let mut merged: Vec<(VariableId, i64)> = Vec::with_capacity(poly.var_coeffs.len());
        for &(var, coeff) in &poly.var_coeffs {
            let vt = Term::var(var);
            match merged.iter_mut().find(|&&mut (kept, _)| {
                trace.get(&vt, &Term::var(kept)).implies(RelMask::EQUAL)
            }) {
                Some((_, c)) => *c += coeff,
                None => merged.push((var, coeff)),
            }
        }
        merged.retain(|&(_, c)| c != 0);

        let has_pos = merged.iter().any(|&(_, c)| c > 0);
        let has_neg = merged.iter().any(|&(_, c)| c < 0);

        if merged.is_empty() {
            // sign is the sign of the constant
            let dir = if poly.constant > 0 {
                Dir::Gt
            } else if poly.constant == 0 {
                Dir::Eq
            } else {
                Dir::Nge
            };
            self.redirect(dir);
            return;
        }
        // variable weights are at least one, so positive coefficients
        // only push the sum further up
        if poly.constant >= 0 && !has_neg {
            self.redirect(Dir::Gt);
            return;
        }
        if poly.constant <= 0 && !has_pos {
            self.redirect(Dir::Nge);
            return;
        }

        let simplified = self.polys.get(poly.constant, merged);

        // an identical polynomial already resolved on this path forces
        // the same outcome
        let prev = self.current_prev_poly();
        let mut link = prev;
        while let Some((anc, dir)) = link {
            let anc_node = self.arena.get(anc);
            let anc_poly = match &anc_node.kind {
                NodeKind::Poly { poly, .. } => *poly,
                _ => unreachable!("poly chain links only poly nodes"),
            };
            if anc_poly == simplified {
                self.redirect(dir);
                return;
            }
            link = anc_node.prev_poly;
        }

        let id = self.cow();
        {
            let node = self.arena.get_mut(id);
            if let NodeKind::Poly { poly, .. } = &mut node.kind {
                *poly = simplified;
            }
        }
        self.make_ready(id, trace);
    }

    // ==================== cursor and edge plumbing ====================

    pub(crate) fn target(&self, loc: Loc) -> NodeId {
        match loc {
            Loc::Source => self.source,
            Loc::Branch(p, d) => self.arena.get(p).kind.branch(d),
        }
    }

    pub(crate) fn set_cursor(&mut self, loc: Loc) {
        self.curr = loc;
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<D> {
        self.arena.get(id)
    }

    pub(crate) fn is_vacuous(&self, id: NodeId) -> bool {
        self.vacuous == Some(id)
    }

    /// Rewrite the edge at `loc` to point at `new`, transferring the
    /// caller's reference on `new` and dropping the edge's old one.
    fn set_target(&mut self, loc: Loc, new: NodeId) {
        let old = match loc {
            Loc::Source => {
                let old = self.source;
                self.source = new;
                old
            }
            Loc::Branch(p, d) => {
                let slot = self.arena.get_mut(p).kind.branch_mut(d);
                let old = *slot;
                *slot = new;
                old
            }
        };
        self.arena.release(old);
    }

    /// Rewrite the cursor edge to skip the current node, jumping to one
    /// of its children.
    fn redirect(&mut self, dir: Dir) {
        let id = self.target(self.curr);
        let child = self.arena.get(id).kind.branch(dir);
        self.arena.bump(child);
        self.set_target(self.curr, child);
    }

    /// Rewrite the cursor edge to the vacuous terminal: the path cannot
    /// be taken by any substitution, so whatever stood here is moot.
    fn redirect_to_vacuous(&mut self) {
        let v = match self.vacuous {
            Some(v) => v,
            None => {
                let v = self.arena.alloc_with(|id| Node::data(None, id));
                self.arena.bump(v); // self edge
                let node = self.arena.get_mut(v);
                node.ready = true;
                node.trace = Some(Trace::empty());
                self.vacuous = Some(v);
                v
            }
        };
        self.arena.bump(v);
        self.set_target(self.curr, v);
    }

    /// Clone the node under the cursor if it is shared, so the mutation
    /// about to happen is invisible through aliasing edges.
    fn cow(&mut self) -> NodeId {
        let id = self.target(self.curr);
        if self.arena.refs(id) > 1 {
            let copy = self.arena.clone_node(id);
            self.set_target(self.curr, copy);
            copy
        } else {
            id
        }
    }

    fn make_ready(&mut self, id: NodeId, trace: Trace) {
        let prev_poly = self.current_prev_poly();
        let node = self.arena.get_mut(id);
        node.trace = Some(trace);
        node.prev_poly = prev_poly;
        node.ready = true;
    }

    /// Trace valid for the node under the cursor: the predecessor's trace
    /// extended with the fact recorded by the branch taken out of it.
    /// `None` means the facts contradict and the node is unreachable.
    fn current_trace(&self) -> Option<Trace> {
        match self.curr {
            Loc::Source => Some(self.head.clone()),
            Loc::Branch(p, dir) => {
                let pred = self.arena.get(p);
                let base = pred
                    .trace
                    .clone()
                    .expect("predecessor processed before its successors");
                match &pred.kind {
                    NodeKind::Term { lhs, rhs, .. } if dir != Dir::Alt => {
                        base.set(lhs, rhs, mask_for(dir))
                    }
                    _ => Some(base),
                }
            }
        }
    }

    /// Nearest weight node on the path to the cursor, with the branch
    /// taken out of it.
    fn current_prev_poly(&self) -> Option<(NodeId, Dir)> {
        match self.curr {
            Loc::Source => None,
            Loc::Branch(p, dir) => {
                let pred = self.arena.get(p);
                match pred.kind {
                    NodeKind::Poly { .. } => Some((p, dir)),
                    _ => pred.prev_poly,
                }
            }
        }
    }

    // ==================== ground enumeration ====================

    /// Depth-first traversal of a ground comparator, collecting every
    /// reachable payload with the trace of the path that reaches it.
    /// Branches are visited greater, equal, then not-greater-or-equal.
    pub fn enumerate(&mut self) -> Vec<(D, Trace)> {
        assert!(self.ground, "enumeration needs a ground comparator");
        let mut results = Vec::new();
        let mut stack = vec![Loc::Source];

        while let Some(loc) = stack.pop() {
            self.curr = loc;
            self.process_current_node();
            let id = self.target(loc);
            let node = self.arena.get(id);
            match &node.kind {
                NodeKind::Data { data, .. } => {
                    if let Some(d) = data {
                        let trace = node.trace.clone().unwrap_or_default();
                        results.push((d.clone(), trace));
                    }
                }
                NodeKind::Term { .. } | NodeKind::Poly { .. } => {
                    // ready but unresolved: every outcome is possible
                    stack.push(Loc::Branch(id, Dir::Nge));
                    stack.push(Loc::Branch(id, Dir::Eq));
                    stack.push(Loc::Branch(id, Dir::Gt));
                }
            }
        }
        results
    }

    /// Traverse like `enumerate`, reporting whether every reachable
    /// terminal succeeds, and compact nodes whose three children are
    /// ready terminals carrying the same payload.
    pub fn check_and_compress(&mut self) -> bool {
        assert!(self.ground, "compression needs a ground comparator");
        enum Phase {
            Enter(Loc),
            Exit(Loc),
        }
        let mut ok = true;
        let mut stack = vec![Phase::Enter(Loc::Source)];

        while let Some(phase) = stack.pop() {
            match phase {
                Phase::Enter(loc) => {
                    self.curr = loc;
                    self.process_current_node();
                    let id = self.target(loc);
                    let node = self.arena.get(id);
                    match &node.kind {
                        NodeKind::Data { data, .. } => {
                            // unreachable paths are vacuously covered
                            if data.is_none() && !self.is_vacuous(id) {
                                ok = false;
                            }
                        }
                        NodeKind::Term { .. } | NodeKind::Poly { .. } => {
                            stack.push(Phase::Exit(loc));
                            stack.push(Phase::Enter(Loc::Branch(id, Dir::Nge)));
                            stack.push(Phase::Enter(Loc::Branch(id, Dir::Eq)));
                            stack.push(Phase::Enter(Loc::Branch(id, Dir::Gt)));
                        }
                    }
                }
                Phase::Exit(loc) => self.try_compress(loc),
            }
        }
        ok
    }

    /// Collapse a node whose comparison no longer matters: all three
    /// children are ready terminals with one and the same payload.
    fn try_compress(&mut self, loc: Loc) {
        let id = self.target(loc);
        let (gt, eq, nge) = match &self.arena.get(id).kind {
            NodeKind::Term { gt, eq, nge, .. } | NodeKind::Poly { gt, eq, nge, .. } => {
                (*gt, *eq, *nge)
            }
            NodeKind::Data { .. } => return,
        };

        let payload = {
            let payload_of = |arena: &Arena<D>, child: NodeId| -> Option<Option<D>> {
                let n = arena.get(child);
                match &n.kind {
                    NodeKind::Data { data, .. } if n.ready || n.is_fail() => Some(data.clone()),
                    _ => None,
                }
            };
            let Some(pg) = payload_of(&self.arena, gt) else { return };
            let Some(pe) = payload_of(&self.arena, eq) else { return };
            let Some(pn) = payload_of(&self.arena, nge) else { return };
            if pg != pe || pe != pn {
                return;
            }
            pg
        };

        // the rewrite holds on every path through this node, no clone
        // needed even when shared
        let sink = self.sink;
        self.arena.bump(sink);
        let node = self.arena.get_mut(id);
        let old_kind = std::mem::replace(&mut node.kind, NodeKind::Data { data: payload, alt: sink });
        node.ready = true;
        for child in old_kind.children() {
            self.arena.release(child);
        }
    }

    #[cfg(test)]
    pub(crate) fn sink_node(&self) -> &Node<D> {
        self.arena.get(self.sink)
    }
}

fn route(rel: Ordering, chain: NodeId, fail: NodeId) -> (NodeId, NodeId, NodeId) {
    match rel {
        Ordering::Greater => (chain, fail, fail),
        Ordering::Equal => (fail, chain, fail),
        Ordering::Less | Ordering::Incomparable => (fail, fail, chain),
    }
}

/// Add `multiplier` per occurrence of each variable of `term` to the
/// per-variable deltas.
fn add_var_counts(term: &Term, multiplier: i64, counts: &mut HashMap<VariableId, i64>) {
    match term {
        Term::Variable(v) => *counts.entry(v.id).or_insert(0) += multiplier,
        Term::Constant(_) => {}
        Term::Function(_, args) => {
            for arg in args {
                add_var_counts(arg, multiplier, counts);
            }
        }
    }
}

// ==================== diagnostics ====================

impl<D> fmt::Display for OrderingComparator<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<(NodeId, usize, &'static str)> = vec![(self.source, 0, "")];
        while let Some((id, depth, label)) = stack.pop() {
            write!(f, "{:indent$}{}", "", label, indent = depth * 2)?;
            let node = self.arena.get(id);
            let mark = if node.ready { "*" } else { "" };
            if !visited.insert(id) {
                match &node.kind {
                    NodeKind::Data { .. } => writeln!(f, "d {} (seen)", id)?,
                    NodeKind::Term { .. } => writeln!(f, "t {} (seen)", id)?,
                    NodeKind::Poly { .. } => writeln!(f, "p {} (seen)", id)?,
                }
                continue;
            }
            match &node.kind {
                NodeKind::Data { data, alt } => {
                    let tag = if data.is_some() { "data" } else { "fail" };
                    writeln!(f, "d {}{} {}", id, mark, tag)?;
                    if *alt != id {
                        stack.push((*alt, depth + 1, "alt "));
                    }
                }
                NodeKind::Term { lhs, rhs, gt, eq, nge } => {
                    writeln!(f, "t {}{} {} ? {}", id, mark, lhs, rhs)?;
                    stack.push((*nge, depth + 1, "! "));
                    stack.push((*eq, depth + 1, "= "));
                    stack.push((*gt, depth + 1, "> "));
                }
                NodeKind::Poly { poly, gt, eq, nge } => {
                    writeln!(f, "p {}{} {}", id, mark, self.polys.resolve(*poly))?;
                    stack.push((*nge, depth + 1, "! "));
                    stack.push((*eq, depth + 1, "= "));
                    stack.push((*gt, depth + 1, "> "));
                }
            }
        }
        Ok(())
    }
}
