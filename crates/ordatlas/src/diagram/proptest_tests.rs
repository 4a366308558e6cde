//! Property-based tests for the decision diagram and its leaves.

use super::polynomial::PolyInterner;
use super::trace::{RelMask, Trace};
use super::{OrderingComparator, TermOrderingConstraint};
use crate::fol::{Constant, FunctionSymbol, Interner, Ordering, Substitution, Term, TermOrdering, KBO, KBOConfig};
use proptest::prelude::*;

/// Term description before interning
#[derive(Debug, Clone)]
enum TermDesc {
    Const(u8),
    Func(u8, Vec<TermDesc>),
}

fn arb_ground_term_desc(max_depth: u32) -> BoxedStrategy<TermDesc> {
    if max_depth == 0 {
        (0..4u8).prop_map(TermDesc::Const).boxed()
    } else {
        prop_oneof![
            3 => (0..4u8).prop_map(TermDesc::Const),
            2 => (0..2u8, proptest::collection::vec(arb_ground_term_desc(max_depth - 1), 1..=2))
                .prop_map(|(f, args)| TermDesc::Func(f, args)),
        ].boxed()
    }
}

fn build_term(desc: &TermDesc, interner: &mut Interner) -> Term {
    match desc {
        TermDesc::Const(i) => {
            let name = format!("c{}", i);
            let id = interner.intern_constant(&name);
            Term::Constant(Constant::new(id))
        }
        TermDesc::Func(f, args) => {
            let name = format!("f{}", f);
            let id = interner.intern_function(&name);
            let built_args: Vec<Term> = args.iter().map(|a| build_term(a, interner)).collect();
            Term::Function(FunctionSymbol::new(id, built_args.len() as u8), built_args)
        }
    }
}

fn arb_ground_pair(max_depth: u32) -> impl Strategy<Value = (Term, Term, Interner)> {
    (arb_ground_term_desc(max_depth), arb_ground_term_desc(max_depth)).prop_map(|(d1, d2)| {
        let mut interner = Interner::new();
        let t1 = build_term(&d1, &mut interner);
        let t2 = build_term(&d2, &mut interner);
        (t1, t2, interner)
    })
}

/// A raw ordering fact over a small variable pool
fn arb_fact() -> impl Strategy<Value = (u8, u8, RelMask)> {
    (0..4u8, 0..4u8, 0..3u8).prop_map(|(a, b, r)| {
        let rel = match r {
            0 => RelMask::GREATER,
            1 => RelMask::EQUAL,
            _ => RelMask::LESS,
        };
        (a, b, rel)
    })
}

fn var_pool(interner: &mut Interner) -> Vec<Term> {
    (0..4)
        .map(|i| Term::var(interner.intern_variable(&format!("X{}", i))))
        .collect()
}

proptest! {
    /// Structurally equal polynomials intern to the same ID, regardless
    /// of input entry order
    #[test]
    fn polynomial_intern_uniqueness(
        constant in -5i64..=5,
        pairs in proptest::collection::vec((0..4u32, -3i64..=3), 0..6),
        rotate in 0usize..6,
    ) {
        let mut interner = Interner::new();
        let vars: Vec<_> = (0..4)
            .map(|i| interner.intern_variable(&format!("X{}", i)))
            .collect();
        let entries: Vec<_> = pairs.iter().map(|&(v, c)| (vars[v as usize], c)).collect();

        let mut polys = PolyInterner::new();
        let p1 = polys.get(constant, entries.clone());

        let mut rotated = entries.clone();
        if !rotated.is_empty() {
            let mid = rotate % rotated.len();
            rotated.rotate_left(mid);
        }
        let p2 = polys.get(constant, rotated);
        prop_assert_eq!(p1, p2);

        let p3 = polys.get(constant + 1, entries);
        prop_assert_ne!(p1, p3);
    }

    /// Every fact accepted by a trace is implied by it afterwards, in
    /// both orientations
    #[test]
    fn trace_retains_accepted_facts(facts in proptest::collection::vec(arb_fact(), 0..8)) {
        let mut interner = Interner::new();
        let vars = var_pool(&mut interner);

        let mut trace = Trace::empty();
        let mut accepted: Vec<(Term, Term, RelMask)> = Vec::new();
        for (a, b, rel) in facts {
            let lhs = vars[a as usize].clone();
            let rhs = vars[b as usize].clone();
            if let Some(next) = trace.set(&lhs, &rhs, rel) {
                trace = next;
                accepted.push((lhs, rhs, rel));
            }
        }
        for (lhs, rhs, rel) in accepted {
            prop_assert!(trace.get(&lhs, &rhs).implies(rel));
            prop_assert!(trace.get(&rhs, &lhs).implies(rel.reversed()));
        }
    }

    /// Swapping the sides of a comparison reverses its result
    #[test]
    fn kbo_antisymmetry((t1, t2, _interner) in arb_ground_pair(3)) {
        let kbo = KBO::new(KBOConfig::default());
        let cmp = kbo.compare(&t1, &t2);
        prop_assert_eq!(kbo.compare(&t2, &t1), cmp.reversed());
    }

    /// A single ground constraint chain yields its payload exactly when
    /// the required relation actually holds
    #[test]
    fn ground_insert_query_roundtrip(
        (t1, t2, _interner) in arb_ground_pair(2),
        required in 0..2u8,
    ) {
        let kbo = KBO::new(KBOConfig::default());
        let required = if required == 0 { Ordering::Greater } else { Ordering::Equal };

        let mut comp: OrderingComparator<u32> = OrderingComparator::new(&kbo, false, false, None);
        comp.insert(&[TermOrderingConstraint {
            lhs: t1.clone(),
            rhs: t2.clone(),
            rel: required,
        }], 1);

        comp.init(Substitution::new());
        let found = comp.next();
        if kbo.compare(&t1, &t2) == required {
            prop_assert_eq!(found, Some(1));
        } else {
            prop_assert_eq!(found, None);
        }
        prop_assert_eq!(comp.next(), None);
    }
}
