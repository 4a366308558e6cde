//! Linear weight-difference polynomials
//!
//! A weight-based comparison of two terms reduces to the sign of
//! `constant + sum(coeff_i * |sigma(x_i)|)` where the coefficients are
//! occurrence-count differences. Polynomials are normalized and interned
//! per comparator so chains of weight nodes can be compared by ID.

use crate::fol::interner::VariableId;
use crate::fol::ordering::Ordering;
use crate::fol::term::Term;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// ID of an interned polynomial
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PolyId(pub(crate) u32);

impl fmt::Display for PolyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A normalized linear polynomial over variable weights
///
/// Invariants: no zero coefficients, at most one entry per variable,
/// positive-coefficient entries precede negative ones, and entries with
/// equal sign are sorted by variable ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polynomial {
    pub constant: i64,
    pub var_coeffs: Vec<(VariableId, i64)>,
}

impl Polynomial {
    /// Build a normalized polynomial from raw (variable, coefficient)
    /// pairs; duplicates are merged and zero coefficients dropped.
    pub fn new(constant: i64, pairs: Vec<(VariableId, i64)>) -> Self {
        let mut merged: Vec<(VariableId, i64)> = Vec::with_capacity(pairs.len());
        for (var, coeff) in pairs {
            match merged.iter_mut().find(|(v, _)| *v == var) {
                Some((_, c)) => *c += coeff,
                None => merged.push((var, coeff)),
            }
        }
        merged.retain(|&(_, c)| c != 0);
        merged.sort_by_key(|&(v, c)| (c < 0, v));
        Polynomial {
            constant,
            var_coeffs: merged,
        }
    }

    /// Whether any coefficient is positive
    pub fn has_positive(&self) -> bool {
        self.var_coeffs.iter().any(|&(_, c)| c > 0)
    }

    /// Whether any coefficient is negative
    pub fn has_negative(&self) -> bool {
        self.var_coeffs.iter().any(|&(_, c)| c < 0)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for &(var, coeff) in &self.var_coeffs {
            if first {
                if coeff < 0 {
                    write!(f, "-")?;
                }
            } else if coeff < 0 {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            write!(f, "{}*{}", coeff.abs(), var)?;
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)
        } else if self.constant < 0 {
            write!(f, " - {}", -self.constant)
        } else if self.constant > 0 {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}

/// Interner mapping normalized polynomials to stable IDs
#[derive(Debug, Default)]
pub struct PolyInterner {
    polys: IndexSet<Polynomial>,
}

impl PolyInterner {
    pub fn new() -> Self {
        PolyInterner::default()
    }

    /// Intern the normalized form of the given polynomial (get-or-create)
    pub fn get(&mut self, constant: i64, pairs: Vec<(VariableId, i64)>) -> PolyId {
        let poly = Polynomial::new(constant, pairs);
        let (index, _) = self.polys.insert_full(poly);
        PolyId(index as u32)
    }

    /// Resolve an ID to its polynomial
    pub fn resolve(&self, id: PolyId) -> &Polynomial {
        &self.polys[id.0 as usize]
    }
}

/// Tie break applied when the weights of two terms come out equal
#[derive(Debug, Clone)]
pub enum TieBreak {
    /// The top symbols differ, precedence decides
    Decided(Ordering),
    /// Same top symbol, compare arguments left to right
    ArgsLex(Vec<(Term, Term)>),
}

/// Result of refining an undecided comparison through term weights
#[derive(Debug, Clone)]
pub enum WeightExpansion {
    /// The weight difference is constant and decides (or ties into a
    /// precedence decision)
    Decided(Ordering),
    /// Weights are identical for every substitution, only the
    /// lexicographic argument comparison remains
    Lex(Vec<(Term, Term)>),
    /// The weight difference depends on variable bindings
    Poly { poly: PolyId, tie: TieBreak },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fol::Interner;

    #[test]
    fn test_normalization_merges_and_sorts() {
        let mut interner = Interner::new();
        let x = interner.intern_variable("X");
        let y = interner.intern_variable("Y");
        let z = interner.intern_variable("Z");

        // X - Y + X + Z - Z  ==>  2X - Y
        let p = Polynomial::new(3, vec![(x, 1), (y, -1), (x, 1), (z, 1), (z, -1)]);
        assert_eq!(p.constant, 3);
        assert_eq!(p.var_coeffs, vec![(x, 2), (y, -1)]);
        assert!(p.has_positive());
        assert!(p.has_negative());
    }

    #[test]
    fn test_positives_precede_negatives() {
        let mut interner = Interner::new();
        let x = interner.intern_variable("X");
        let y = interner.intern_variable("Y");
        let z = interner.intern_variable("Z");

        let p = Polynomial::new(0, vec![(x, -2), (z, 1), (y, 3)]);
        assert_eq!(p.var_coeffs, vec![(y, 3), (z, 1), (x, -2)]);
    }

    #[test]
    fn test_interner_reuses_ids() {
        let mut interner = Interner::new();
        let x = interner.intern_variable("X");
        let y = interner.intern_variable("Y");

        let mut polys = PolyInterner::new();
        let p1 = polys.get(3, vec![(x, 2), (y, -1)]);
        // same polynomial in a different entry order
        let p2 = polys.get(3, vec![(y, -1), (x, 1), (x, 1)]);
        let p3 = polys.get(2, vec![(x, 2), (y, -1)]);

        assert_eq!(p1, p2);
        assert_ne!(p1, p3);
        assert_eq!(polys.resolve(p1).constant, 3);
    }

    #[test]
    fn test_display() {
        let mut interner = Interner::new();
        let x = interner.intern_variable("X");
        let y = interner.intern_variable("Y");

        let p = Polynomial::new(3, vec![(x, 2), (y, -1)]);
        assert_eq!(format!("{}", p), "2*V0 - 1*V1 + 3");

        let constant_only = Polynomial::new(-2, vec![]);
        assert_eq!(format!("{}", constant_only), "-2");
    }
}
