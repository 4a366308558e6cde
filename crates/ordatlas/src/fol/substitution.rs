//! Variable substitutions, applied lazily at query time

use super::interner::VariableId;
use super::term::{Term, Variable};
use std::collections::HashMap;

/// A substitution mapping variable IDs to terms
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    pub map: HashMap<VariableId, Term>,
}

impl Substitution {
    /// Create a new empty substitution
    pub fn new() -> Self {
        Substitution {
            map: HashMap::new(),
        }
    }

    /// Add a variable -> term mapping
    pub fn insert(&mut self, var: Variable, term: Term) {
        self.map.insert(var.id, term);
    }

    /// Add a variable ID -> term mapping
    pub fn insert_id(&mut self, var_id: VariableId, term: Term) {
        self.map.insert(var_id, term);
    }

    /// Get the term for a variable ID, if bound
    pub fn get(&self, var_id: VariableId) -> Option<&Term> {
        self.map.get(&var_id)
    }

    /// Check if a variable ID is bound
    pub fn contains(&self, var_id: VariableId) -> bool {
        self.map.contains_key(&var_id)
    }
}

impl Term {
    /// Apply a substitution to this term
    pub fn apply_substitution(&self, subst: &Substitution) -> Term {
        match self {
            Term::Variable(v) => subst.map.get(&v.id).cloned().unwrap_or_else(|| self.clone()),
            Term::Constant(_) => self.clone(),
            Term::Function(f, args) => {
                let new_args = args
                    .iter()
                    .map(|arg| arg.apply_substitution(subst))
                    .collect();
                Term::Function(*f, new_args)
            }
        }
    }
}

/// A term together with the substitution to be applied to it.
///
/// The substitution is applied lazily: consumers that only need weights or
/// per-variable occurrence counts can walk the term without materializing
/// the substituted copy.
#[derive(Clone, Copy)]
pub struct AppliedTerm<'a> {
    pub term: &'a Term,
    pub subst: &'a Substitution,
}

impl<'a> AppliedTerm<'a> {
    pub fn new(term: &'a Term, subst: &'a Substitution) -> Self {
        AppliedTerm { term, subst }
    }

    /// Materialize the substituted term
    pub fn resolved(&self) -> Term {
        self.term.apply_substitution(self.subst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::{Constant, FunctionSymbol, Interner};

    #[test]
    fn test_term_substitution() {
        let mut interner = Interner::new();
        let x = interner.intern_variable("X");
        let a = interner.intern_constant("a");
        let f = interner.intern_function("f");

        let term_a = Term::Constant(Constant::new(a));
        let fx = Term::Function(FunctionSymbol::new(f, 1), vec![Term::var(x)]);

        let mut subst = Substitution::new();
        subst.insert_id(x, term_a.clone());

        assert_eq!(Term::var(x).apply_substitution(&subst), term_a);
        assert_eq!(
            fx.apply_substitution(&subst),
            Term::Function(FunctionSymbol::new(f, 1), vec![term_a.clone()])
        );
    }

    #[test]
    fn test_unbound_variable_stays() {
        let mut interner = Interner::new();
        let x = interner.intern_variable("X");
        let y = interner.intern_variable("Y");
        let a = interner.intern_constant("a");

        let mut subst = Substitution::new();
        subst.insert_id(x, Term::Constant(Constant::new(a)));

        assert!(subst.contains(x));
        assert!(!subst.contains(y));
        assert_eq!(Term::var(y).apply_substitution(&subst), Term::var(y));
    }

    #[test]
    fn test_applied_term_resolves() {
        let mut interner = Interner::new();
        let x = interner.intern_variable("X");
        let a = interner.intern_constant("a");

        let mut subst = Substitution::new();
        subst.insert_id(x, Term::Constant(Constant::new(a)));

        let tx = Term::var(x);
        let applied = AppliedTerm::new(&tx, &subst);
        assert_eq!(applied.resolved(), Term::Constant(Constant::new(a)));
    }
}
