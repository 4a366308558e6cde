//! Terms of the ordering layer
//!
//! Terms are built over interned symbol IDs. `Ord` is derived so term
//! pairs can be canonically oriented when they key a partial-ordering
//! trace.

use super::interner::{ConstantId, FunctionId, Interner, VariableId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
}

impl Variable {
    /// Create a new variable from an ID
    pub fn new(id: VariableId) -> Self {
        Variable { id }
    }
}

/// A constant symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Constant {
    pub id: ConstantId,
}

impl Constant {
    /// Create a new constant from an ID
    pub fn new(id: ConstantId) -> Self {
        Constant { id }
    }
}

/// A function symbol with arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionSymbol {
    pub id: FunctionId,
    pub arity: u8,
}

impl FunctionSymbol {
    /// Create a new function symbol from an ID and arity
    pub fn new(id: FunctionId, arity: u8) -> Self {
        FunctionSymbol { id, arity }
    }
}

/// A first-order term
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Variable(Variable),
    Constant(Constant),
    Function(FunctionSymbol, Vec<Term>),
}

impl Term {
    /// Shorthand for a variable term
    pub fn var(id: VariableId) -> Term {
        Term::Variable(Variable::new(id))
    }

    /// Whether this term is a variable
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// The variable at the top of this term, if any
    pub fn as_var(&self) -> Option<Variable> {
        match self {
            Term::Variable(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether this term contains no variables
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Constant(_) => true,
            Term::Function(_, args) => args.iter().all(|arg| arg.is_ground()),
        }
    }

    /// All variables of this term, in preorder, without duplicates
    pub fn variables(&self) -> Vec<Variable> {
        let mut out = Vec::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut Vec<Variable>) {
        match self {
            Term::Variable(v) => {
                if !out.contains(v) {
                    out.push(*v);
                }
            }
            Term::Constant(_) => {}
            Term::Function(_, args) => {
                for arg in args {
                    arg.collect_variables(out);
                }
            }
        }
    }

    /// Format this term with an interner for name resolution
    pub fn display<'a>(&'a self, interner: &'a Interner) -> TermDisplay<'a> {
        TermDisplay {
            term: self,
            interner,
        }
    }
}

/// Display wrapper for Term that resolves symbol names through an interner
pub struct TermDisplay<'a> {
    term: &'a Term,
    interner: &'a Interner,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.term {
            Term::Variable(v) => write!(f, "{}", self.interner.resolve_variable(v.id)),
            Term::Constant(c) => write!(f, "{}", self.interner.resolve_constant(c.id)),
            Term::Function(func, args) => {
                write!(f, "{}", self.interner.resolve_function(func.id))?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}", arg.display(self.interner))?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

// ID-based Display for debugging without an interner

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(v) => write!(f, "{}", v),
            Term::Constant(c) => write!(f, "{}", c),
            Term::Function(func, args) => {
                write!(f, "{}", func.id)?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Interner {
        Interner::new()
    }

    #[test]
    fn test_variables_deduplicated() {
        let mut interner = ctx();
        let x = interner.intern_variable("X");
        let y = interner.intern_variable("Y");
        let f = interner.intern_function("f");

        // f(X, Y, X)
        let t = Term::Function(
            FunctionSymbol::new(f, 3),
            vec![Term::var(x), Term::var(y), Term::var(x)],
        );
        let vars = t.variables();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].id, x);
        assert_eq!(vars[1].id, y);
    }

    #[test]
    fn test_groundness() {
        let mut interner = ctx();
        let x = interner.intern_variable("X");
        let a = interner.intern_constant("a");
        let f = interner.intern_function("f");

        let ca = Term::Constant(Constant::new(a));
        assert!(ca.is_ground());
        assert!(!Term::var(x).is_ground());

        let fa = Term::Function(FunctionSymbol::new(f, 1), vec![ca.clone()]);
        assert!(fa.is_ground());
        let fx = Term::Function(FunctionSymbol::new(f, 1), vec![Term::var(x)]);
        assert!(!fx.is_ground());
    }

    #[test]
    fn test_display_with_interner() {
        let mut interner = ctx();
        let x = interner.intern_variable("X");
        let a = interner.intern_constant("a");
        let f = interner.intern_function("f");

        let t = Term::Function(
            FunctionSymbol::new(f, 2),
            vec![Term::Constant(Constant::new(a)), Term::var(x)],
        );
        assert_eq!(format!("{}", t.display(&interner)), "f(a,X)");
        assert_eq!(format!("{}", t), "F0(C0,V0)");
    }
}
