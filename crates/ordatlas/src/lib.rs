//! ordatlas: compiled ordering-constraint decision diagrams for
//! saturation theorem proving.
//!
//! Saturation provers ask the same family of term-ordering questions over
//! and over: "does `t1 > t2` and `t3 = t4` hold under this substitution".
//! This crate compiles such constraint lists into a shared decision
//! diagram that memoizes every comparison it can decide once and for
//! all, and answers the rest lazily per query.
//!
//! - [`fol`] holds the term language: interned symbols, terms,
//!   substitutions, and the Knuth-Bendix ordering.
//! - [`diagram`] holds the decision diagram: the [`diagram::OrderingComparator`],
//!   its node arena, partial-ordering traces, weight polynomials, and the
//!   variable order extractor.
//!
//! ```
//! use ordatlas::fol::{Interner, KBO, KBOConfig, Ordering, Substitution, Term};
//! use ordatlas::diagram::{OrderingComparator, TermOrderingConstraint};
//!
//! let mut interner = Interner::new();
//! let x = interner.intern_variable("X");
//! let a = Term::Constant(ordatlas::fol::Constant::new(interner.intern_constant("a")));
//! let fa = Term::Function(
//!     ordatlas::fol::FunctionSymbol::new(interner.intern_function("f"), 1),
//!     vec![a.clone()],
//! );
//!
//! let kbo = KBO::new(KBOConfig::default());
//! let mut comp: OrderingComparator<&str> = OrderingComparator::new(&kbo, false, false, None);
//! comp.insert(&[TermOrderingConstraint { lhs: Term::var(x), rhs: a, rel: Ordering::Greater }], "redundant");
//!
//! let mut subst = Substitution::new();
//! subst.insert_id(x, fa);
//! comp.init(subst);
//! assert_eq!(comp.next(), Some("redundant"));
//! ```

pub mod diagram;
pub mod fol;

pub use diagram::{OrderingComparator, POStruct, TermOrderingConstraint, Trace, VarOrderExtractor};
pub use fol::{Interner, Ordering, Substitution, Term, TermOrdering, KBO, KBOConfig};
