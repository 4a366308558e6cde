//! First-order term language: interned symbols, terms, substitutions and
//! the term ordering interface.

pub mod interner;
pub mod ordering;
pub mod substitution;
pub mod term;

pub use interner::{ConstantId, FunctionId, Interner, VariableId};
pub use ordering::{Ordering, TermOrdering, KBO, KBOConfig};
pub use substitution::{AppliedTerm, Substitution};
pub use term::{Constant, FunctionSymbol, Term, TermDisplay, Variable};
