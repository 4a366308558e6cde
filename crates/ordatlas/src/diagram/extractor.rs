//! Variable order extraction
//!
//! Searches a diagram's unresolved variable comparisons for one total
//! extension of a given partial ordering that reaches a payload terminal.
//! Used to answer "is there a variable ordering under which this
//! constraint set applies" without enumerating substitutions.

use super::node::{Dir, NodeId, NodeKind};
use super::trace::{POStruct, TermOrderingConstraint};
use super::{Loc, OrderingComparator};
use crate::fol::ordering::Ordering;
use crate::fol::term::Term;
use std::collections::HashMap;

type Candidate = (Option<TermOrderingConstraint>, Dir);

/// Backtracking search over the branching points of a diagram
pub struct VarOrderExtractor<'o, D> {
    comp: OrderingComparator<'o, D>,
    /// Candidate constraint sets per node, computed on first visit
    branch_points: HashMap<NodeId, Vec<Candidate>>,
}

struct Frame {
    id: NodeId,
    po: POStruct,
    next: usize,
}

impl<'o, D: Clone + PartialEq> VarOrderExtractor<'o, D> {
    /// Take ownership of the comparator to explore
    pub fn new(comp: OrderingComparator<'o, D>) -> Self {
        VarOrderExtractor {
            comp,
            branch_points: HashMap::new(),
        }
    }

    /// Find one extension of `start` under which a payload terminal is
    /// reachable. Returns the extended partial ordering, or `None` when
    /// every branch either fails or contradicts the ordering built so
    /// far.
    pub fn extract(&mut self, start: &POStruct) -> Option<POStruct> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut pending: Option<(Loc, POStruct)> = Some((Loc::Source, start.clone()));

        loop {
            if let Some((loc, po)) = pending.take() {
                self.comp.set_cursor(loc);
                self.comp.process_current_node();
                let id = self.comp.target(loc);
                match &self.comp.node(id).kind {
                    NodeKind::Data { data, .. } => {
                        if data.is_some() {
                            return Some(po);
                        }
                        // failure terminal, fall through to backtracking
                    }
                    _ => stack.push(Frame { id, po, next: 0 }),
                }
            }

            let frame = stack.last_mut()?;
            let candidates = self.branch_points(frame.id);
            while frame.next < candidates.len() {
                let (constraint, dir) = &candidates[frame.next];
                frame.next += 1;
                let mut po = frame.po.clone();
                if let Some(c) = constraint {
                    if po.try_extend(&c.lhs, &c.rhs, c.rel).is_none() {
                        continue;
                    }
                }
                pending = Some((Loc::Branch(frame.id, *dir), po));
                break;
            }
            if pending.is_none() {
                stack.pop();
            }
        }
    }

    /// The branching points of a node: which constraints would decide its
    /// comparison, and the branch each one selects.
    fn branch_points(&mut self, id: NodeId) -> Vec<Candidate> {
        if let Some(cached) = self.branch_points.get(&id) {
            return cached.clone();
        }
        let out: Vec<Candidate> = match &self.comp.node(id).kind {
            // a weight node's sign is unconstrained by the variable order
            NodeKind::Poly { .. } => {
                vec![(None, Dir::Gt), (None, Dir::Eq), (None, Dir::Nge)]
            }
            NodeKind::Term { lhs, rhs, .. } => match (lhs.as_var(), rhs.as_var()) {
                (Some(_), Some(_)) => vec![
                    (Some(cons(lhs, rhs, Ordering::Greater)), Dir::Gt),
                    (Some(cons(lhs, rhs, Ordering::Equal)), Dir::Eq),
                    (Some(cons(lhs, rhs, Ordering::Less)), Dir::Nge),
                ],
                // x below any variable of t puts x below t
                (Some(_), None) => rhs
                    .variables()
                    .iter()
                    .map(|y| {
                        (
                            Some(cons(lhs, &Term::Variable(*y), Ordering::Less)),
                            Dir::Nge,
                        )
                    })
                    .collect(),
                // any variable of t above x puts t above x
                (None, Some(_)) => lhs
                    .variables()
                    .iter()
                    .map(|y| {
                        (
                            Some(cons(&Term::Variable(*y), rhs, Ordering::Greater)),
                            Dir::Gt,
                        )
                    })
                    .collect(),
                (None, None) => Vec::new(),
            },
            NodeKind::Data { .. } => Vec::new(),
        };
        self.branch_points.insert(id, out.clone());
        out
    }
}

fn cons(lhs: &Term, rhs: &Term, rel: Ordering) -> TermOrderingConstraint {
    TermOrderingConstraint {
        lhs: lhs.clone(),
        rhs: rhs.clone(),
        rel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::trace::RelMask;
    use crate::fol::{Interner, KBOConfig, KBO};

    struct TestCtx {
        interner: Interner,
    }

    impl TestCtx {
        fn new() -> Self {
            TestCtx {
                interner: Interner::new(),
            }
        }

        fn var(&mut self, name: &str) -> Term {
            Term::var(self.interner.intern_variable(name))
        }

        fn func(&mut self, name: &str, args: Vec<Term>) -> Term {
            let id = self.interner.intern_function(name);
            Term::Function(
                crate::fol::FunctionSymbol::new(id, args.len() as u8),
                args,
            )
        }
    }

    fn greater(lhs: &Term, rhs: &Term) -> TermOrderingConstraint {
        cons(lhs, rhs, Ordering::Greater)
    }

    #[test]
    fn test_extracts_required_relation() {
        let mut ctx = TestCtx::new();
        let x = ctx.var("X");
        let y = ctx.var("Y");
        let kbo = KBO::new(KBOConfig::default());

        let mut comp: OrderingComparator<u32> = OrderingComparator::new(&kbo, false, true, None);
        comp.insert(&[greater(&x, &y)], 1);

        let mut extractor = VarOrderExtractor::new(comp);
        let po = extractor.extract(&POStruct::new()).expect("extraction succeeds");
        assert!(po.tpo.get(&x, &y).implies(RelMask::GREATER));
        assert_eq!(po.cons.len(), 1);
        assert_eq!(po.cons[0].rel, Ordering::Greater);
    }

    #[test]
    fn test_respects_starting_order() {
        let mut ctx = TestCtx::new();
        let x = ctx.var("X");
        let y = ctx.var("Y");
        let kbo = KBO::new(KBOConfig::default());

        let mut comp: OrderingComparator<u32> = OrderingComparator::new(&kbo, false, true, None);
        comp.insert(&[greater(&x, &y)], 1);

        // X < Y is already committed, the required X > Y cannot be added
        let mut start = POStruct::new();
        assert!(start.try_extend(&x, &y, Ordering::Less).is_some());
        let mut extractor = VarOrderExtractor::new(comp);
        assert!(extractor.extract(&start).is_none());
    }

    #[test]
    fn test_backtracks_over_candidates() {
        let mut ctx = TestCtx::new();
        let x = ctx.var("X");
        let y = ctx.var("Y");
        let kbo = KBO::new(KBOConfig::default());

        // only the equality chain succeeds; the greater candidate is
        // tried first and leads to a failure terminal
        let mut comp: OrderingComparator<u32> = OrderingComparator::new(&kbo, false, true, None);
        comp.insert(&[cons(&x, &y, Ordering::Equal)], 2);

        let mut extractor = VarOrderExtractor::new(comp);
        let po = extractor.extract(&POStruct::new()).expect("extraction succeeds");
        assert!(po.tpo.get(&x, &y).implies(RelMask::EQUAL));
    }

    #[test]
    fn test_vars_only_split_is_explored() {
        let mut ctx = TestCtx::new();
        let x = ctx.var("X");
        let y = ctx.var("Y");
        let z = ctx.var("Z");
        let f = ctx.func("f", vec![x.clone(), y.clone()]);
        let kbo = KBO::new(KBOConfig::default());

        let mut comp: OrderingComparator<u32> = OrderingComparator::new(&kbo, true, false, None);
        comp.insert(&[greater(&f, &z)], 3);

        // f(X, Y) > Z is reached by putting one argument above Z
        let mut extractor = VarOrderExtractor::new(comp);
        let po = extractor.extract(&POStruct::new()).expect("extraction succeeds");
        assert!(po.tpo.get(&x, &z).implies(RelMask::GREATER));
    }

    #[test]
    fn test_resolved_branch_leaves_siblings_intact() {
        let mut ctx = TestCtx::new();
        let x = ctx.var("X");
        let y = ctx.var("Y");
        let z = ctx.var("Z");
        let f = ctx.func("f", vec![x.clone(), y.clone()]);
        let kbo = KBO::new(KBOConfig::default());

        // the argument cascade aliases one payload terminal between the
        // X and Y branches
        let mut comp: OrderingComparator<u32> = OrderingComparator::new(&kbo, true, false, None);
        comp.insert(&[greater(&f, &z)], 5);

        let mut extractor = VarOrderExtractor::new(comp);

        // commit X < Z up front so the first extraction resolves the
        // shared terminal through the Y branch
        let mut start = POStruct::new();
        assert!(start.try_extend(&x, &z, Ordering::Less).is_some());
        let po = extractor.extract(&start).expect("the Y branch applies");
        assert!(po.tpo.get(&y, &z).implies(RelMask::GREATER));

        // the X branch still reaches the payload afterwards
        let po = extractor
            .extract(&POStruct::new())
            .expect("the X branch applies");
        assert!(po.tpo.get(&x, &z).implies(RelMask::GREATER));
    }

    #[test]
    fn test_weight_nodes_branch_unconstrained() {
        let mut ctx = TestCtx::new();
        let x = ctx.var("X");
        let y = ctx.var("Y");
        let lhs = ctx.func("f", vec![x.clone(), x.clone()]);
        let rhs = ctx.func("g", vec![y]);

        let mut config = KBOConfig::default();
        config
            .function_weights
            .insert(ctx.interner.get_function("f").unwrap(), 4);
        let kbo = KBO::new(config);

        let mut comp: OrderingComparator<u32> = OrderingComparator::new(&kbo, false, true, None);
        comp.insert(&[greater(&lhs, &rhs)], 4);

        // the weight comparison adds no variable-order constraint
        let mut extractor = VarOrderExtractor::new(comp);
        let po = extractor.extract(&POStruct::new()).expect("extraction succeeds");
        assert!(po.cons.is_empty());
    }

    #[test]
    fn test_exhausted_search_reports_failure() {
        let kbo = KBO::new(KBOConfig::default());

        // nothing was inserted, the diagram is a single failure terminal
        let comp: OrderingComparator<u32> = OrderingComparator::new(&kbo, false, true, None);
        let mut extractor = VarOrderExtractor::new(comp);
        assert!(extractor.extract(&POStruct::new()).is_none());
    }
}
