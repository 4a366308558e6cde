//! Diagram nodes and the refcounted node arena
//!
//! Nodes live in an arena with explicit reference counts and a free list.
//! An edge to a node holds one reference; releasing the last reference
//! frees the slot and cascades into the node's children. Cycles (the fail
//! sink's self edge) keep one reference alive until the arena is dropped
//! wholesale.

use super::polynomial::PolyId;
use super::trace::Trace;
use crate::fol::term::Term;
use std::fmt;

/// Index of a node in the arena
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Outgoing edge selector of a node
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Dir {
    /// The comparison came out greater
    Gt,
    /// The comparison came out equal
    Eq,
    /// Neither greater nor equal
    Nge,
    /// Alternative of a data node (next chain in the disjunction)
    Alt,
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Dir::Gt => ">",
            Dir::Eq => "=",
            Dir::Nge => "!",
            Dir::Alt => "alt",
        };
        write!(f, "{}", tag)
    }
}

/// The discriminating content of a node
#[derive(Debug, Clone)]
pub enum NodeKind<D> {
    /// Branch on the ordering of two terms
    Term {
        lhs: Term,
        rhs: Term,
        gt: NodeId,
        eq: NodeId,
        nge: NodeId,
    },
    /// Branch on the sign of a weight polynomial
    Poly {
        poly: PolyId,
        gt: NodeId,
        eq: NodeId,
        nge: NodeId,
    },
    /// Terminal: a payload (or failure when `None`) plus the alternative
    /// to try when this chain does not apply
    Data { data: Option<D>, alt: NodeId },
}

impl<D> NodeKind<D> {
    /// The target of the given edge
    pub fn branch(&self, dir: Dir) -> NodeId {
        match (self, dir) {
            (NodeKind::Term { gt, .. }, Dir::Gt) => *gt,
            (NodeKind::Term { eq, .. }, Dir::Eq) => *eq,
            (NodeKind::Term { nge, .. }, Dir::Nge) => *nge,
            (NodeKind::Poly { gt, .. }, Dir::Gt) => *gt,
            (NodeKind::Poly { eq, .. }, Dir::Eq) => *eq,
            (NodeKind::Poly { nge, .. }, Dir::Nge) => *nge,
            (NodeKind::Data { alt, .. }, Dir::Alt) => *alt,
            _ => panic!("node has no {} edge", dir),
        }
    }

    /// Mutable access to the target of the given edge
    pub fn branch_mut(&mut self, dir: Dir) -> &mut NodeId {
        match (self, dir) {
            (NodeKind::Term { gt, .. }, Dir::Gt) => gt,
            (NodeKind::Term { eq, .. }, Dir::Eq) => eq,
            (NodeKind::Term { nge, .. }, Dir::Nge) => nge,
            (NodeKind::Poly { gt, .. }, Dir::Gt) => gt,
            (NodeKind::Poly { eq, .. }, Dir::Eq) => eq,
            (NodeKind::Poly { nge, .. }, Dir::Nge) => nge,
            (NodeKind::Data { alt, .. }, Dir::Alt) => alt,
            _ => panic!("node has no {} edge", dir),
        }
    }

    /// All outgoing edges of this node
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Term { gt, eq, nge, .. } | NodeKind::Poly { gt, eq, nge, .. } => {
                vec![*gt, *eq, *nge]
            }
            NodeKind::Data { alt, .. } => vec![*alt],
        }
    }
}

/// A diagram node: discriminating content plus memoized processing state
#[derive(Debug, Clone)]
pub struct Node<D> {
    pub kind: NodeKind<D>,
    /// Whether this node has been processed and its edges compacted
    pub ready: bool,
    /// Partial ordering valid when control reaches this node, filled in
    /// when the node is marked ready
    pub trace: Option<Trace>,
    /// Nearest weight node above this one, with the branch taken out of
    /// it; used to reuse the outcome of an identical polynomial
    pub prev_poly: Option<(NodeId, Dir)>,
}

impl<D> Node<D> {
    pub fn term(lhs: Term, rhs: Term, gt: NodeId, eq: NodeId, nge: NodeId) -> Self {
        Node {
            kind: NodeKind::Term {
                lhs,
                rhs,
                gt,
                eq,
                nge,
            },
            ready: false,
            trace: None,
            prev_poly: None,
        }
    }

    pub fn poly(poly: PolyId, gt: NodeId, eq: NodeId, nge: NodeId) -> Self {
        Node {
            kind: NodeKind::Poly { poly, gt, eq, nge },
            ready: false,
            trace: None,
            prev_poly: None,
        }
    }

    pub fn data(data: Option<D>, alt: NodeId) -> Self {
        Node {
            kind: NodeKind::Data { data, alt },
            ready: false,
            trace: None,
            prev_poly: None,
        }
    }

    /// Whether this is a terminal carrying no payload
    pub fn is_fail(&self) -> bool {
        matches!(self.kind, NodeKind::Data { data: None, .. })
    }
}

struct Slot<D> {
    node: Option<Node<D>>,
    refs: u32,
}

/// Node arena with explicit reference counting and slot reuse
pub struct Arena<D> {
    slots: Vec<Slot<D>>,
    free: Vec<u32>,
}

impl<D> Arena<D> {
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Allocate a node with one reference (the caller's)
    pub fn alloc(&mut self, node: Node<D>) -> NodeId {
        self.alloc_with(|_| node)
    }

    /// Allocate a node that needs to know its own ID (self edges). The
    /// returned node holds one reference; a self edge must be bumped by
    /// the caller.
    pub fn alloc_with(&mut self, f: impl FnOnce(NodeId) -> Node<D>) -> NodeId {
        if let Some(index) = self.free.pop() {
            let id = NodeId(index);
            let node = f(id);
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.node.is_none());
            slot.node = Some(node);
            slot.refs = 1;
            id
        } else {
            let id = NodeId(self.slots.len() as u32);
            let node = f(id);
            self.slots.push(Slot {
                node: Some(node),
                refs: 1,
            });
            id
        }
    }

    pub fn get(&self, id: NodeId) -> &Node<D> {
        self.slots[id.as_usize()]
            .node
            .as_ref()
            .unwrap_or_else(|| panic!("{} is freed", id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<D> {
        self.slots[id.as_usize()]
            .node
            .as_mut()
            .unwrap_or_else(|| panic!("{} is freed", id))
    }

    pub fn refs(&self, id: NodeId) -> u32 {
        self.slots[id.as_usize()].refs
    }

    /// Add a reference to a node
    pub fn bump(&mut self, id: NodeId) {
        self.slots[id.as_usize()].refs += 1;
    }

    /// Drop a reference; freeing a node releases its children in turn
    pub fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let slot = &mut self.slots[id.as_usize()];
            debug_assert!(slot.refs > 0, "released {} too often", id);
            slot.refs -= 1;
            if slot.refs == 0 {
                if let Some(node) = slot.node.take() {
                    stack.extend(node.kind.children());
                }
                self.free.push(id.0);
            }
        }
    }

    /// Copy a node into a fresh slot, bumping its children
    pub fn clone_node(&mut self, id: NodeId) -> NodeId
    where
        D: Clone,
    {
        let node = self.get(id).clone();
        for child in node.kind.children() {
            self.bump(child);
        }
        self.alloc(node)
    }

    /// Number of live nodes
    pub fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl<D> Default for Arena<D> {
    fn default() -> Self {
        Arena::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{Interner, Term};

    fn two_vars() -> (Term, Term) {
        let mut interner = Interner::new();
        let x = interner.intern_variable("X");
        let y = interner.intern_variable("Y");
        (Term::var(x), Term::var(y))
    }

    #[test]
    fn test_release_cascades() {
        let mut arena: Arena<u32> = Arena::new();
        let sink = arena.alloc_with(|id| Node::data(None, id));
        arena.bump(sink); // self edge

        let (x, y) = two_vars();
        let leaf = arena.alloc(Node::data(Some(7), sink));
        arena.bump(sink);
        arena.bump(sink);
        arena.bump(sink);
        let node = arena.alloc(Node::term(x, y, leaf, sink, sink));

        assert_eq!(arena.live(), 3);
        arena.release(node);
        // node and leaf freed, sink kept alive by its self edge and the
        // handle held here
        assert_eq!(arena.live(), 1);
        assert_eq!(arena.refs(sink), 2);
    }

    #[test]
    fn test_slot_reuse() {
        let mut arena: Arena<u32> = Arena::new();
        let sink = arena.alloc_with(|id| Node::data(None, id));
        arena.bump(sink);

        arena.bump(sink);
        let a = arena.alloc(Node::data(Some(1), sink));
        arena.release(a);
        arena.bump(sink);
        let b = arena.alloc(Node::data(Some(2), sink));
        // freed slot is handed out again
        assert_eq!(a, b);
    }

    #[test]
    fn test_clone_node_bumps_children() {
        let mut arena: Arena<u32> = Arena::new();
        let sink = arena.alloc_with(|id| Node::data(None, id));
        arena.bump(sink);

        arena.bump(sink);
        let leaf = arena.alloc(Node::data(Some(3), sink));

        let (x, y) = two_vars();
        arena.bump(sink);
        arena.bump(sink);
        let node = arena.alloc(Node::term(x, y, leaf, sink, sink));
        arena.bump(leaf);

        let refs_before = arena.refs(leaf);
        let copy = arena.clone_node(node);
        assert_eq!(arena.refs(leaf), refs_before + 1);
        assert_ne!(copy, node);
        arena.release(copy);
        assert_eq!(arena.refs(leaf), refs_before);
    }
}
