//! Term ordering interface and the Knuth-Bendix Ordering
//!
//! The decision-diagram core only consumes the `TermOrdering` trait:
//! a bidirectional substitution-free comparison, a comparison of applied
//! terms, a weight function, and the `refine` hook through which a
//! weight-based ordering turns a pending comparison into a linear
//! weight-difference polynomial.

use super::interner::{ConstantId, FunctionId, VariableId};
use super::substitution::AppliedTerm;
use super::term::Term;
use crate::diagram::polynomial::{PolyInterner, TieBreak, WeightExpansion};
use crate::diagram::trace::POStruct;
use std::collections::HashMap;

/// Result of comparing two terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ordering {
    Greater,
    Less,
    Equal,
    Incomparable,
}

impl Ordering {
    /// The result of the comparison with its sides swapped
    pub fn reversed(self) -> Ordering {
        match self {
            Ordering::Greater => Ordering::Less,
            Ordering::Less => Ordering::Greater,
            other => other,
        }
    }
}

/// Capability interface of a simplification ordering, as consumed by the
/// ordering comparator.
pub trait TermOrdering {
    /// Bidirectional comparison without a substitution. `Incomparable`
    /// means "not decidable statically" for non-ground terms.
    fn compare(&self, lhs: &Term, rhs: &Term) -> Ordering;

    /// Compare two terms under their substitutions. `po`, when given, may
    /// receive ordering constraints under which the comparison would
    /// resolve; orderings without constraint extraction leave it untouched.
    fn compare_applied(
        &self,
        lhs: AppliedTerm<'_>,
        rhs: AppliedTerm<'_>,
        po: Option<&mut POStruct>,
    ) -> Ordering;

    /// Weight of a term under its substitution (KBO-like orderings).
    fn compute_weight(&self, t: AppliedTerm<'_>) -> i64;

    /// Refine a statically undecided comparison of two non-variable terms
    /// into a weight polynomial plus tie-break, a pure lexicographic
    /// continuation, or a decision. Orderings without a weight component
    /// return `None` and the comparison stays opaque.
    fn refine(
        &self,
        _lhs: &Term,
        _rhs: &Term,
        _polys: &mut PolyInterner,
    ) -> Option<WeightExpansion> {
        None
    }
}

/// Configuration for Knuth-Bendix Ordering
#[derive(Debug, Clone)]
pub struct KBOConfig {
    /// Weight of each function/constant symbol by ID (default weight is 1)
    pub function_weights: HashMap<FunctionId, i64>,
    pub constant_weights: HashMap<ConstantId, i64>,
    /// Precedence of symbols by ID (higher value = higher precedence)
    pub function_precedence: HashMap<FunctionId, usize>,
    pub constant_precedence: HashMap<ConstantId, usize>,
    /// Weight of variables (must be at least 1)
    pub variable_weight: i64,
}

impl Default for KBOConfig {
    fn default() -> Self {
        KBOConfig {
            function_weights: HashMap::new(),
            constant_weights: HashMap::new(),
            function_precedence: HashMap::new(),
            constant_precedence: HashMap::new(),
            variable_weight: 1,
        }
    }
}

/// Knuth-Bendix Ordering implementation
pub struct KBO {
    config: KBOConfig,
}

impl KBO {
    pub fn new(config: KBOConfig) -> Self {
        assert!(config.variable_weight >= 1, "variable weight must be positive");
        KBO { config }
    }

    /// Get weight of a function symbol (default is 1)
    fn function_weight(&self, id: FunctionId) -> i64 {
        self.config.function_weights.get(&id).copied().unwrap_or(1)
    }

    /// Get weight of a constant symbol (default is 1)
    fn constant_weight(&self, id: ConstantId) -> i64 {
        self.config.constant_weights.get(&id).copied().unwrap_or(1)
    }

    /// Get precedence of a function symbol (default is 0)
    fn function_precedence(&self, id: FunctionId) -> usize {
        self.config
            .function_precedence
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    /// Get precedence of a constant symbol (default is 0)
    fn constant_precedence(&self, id: ConstantId) -> usize {
        self.config
            .constant_precedence
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    /// Calculate the weight of a term, unbound variables counting as
    /// `variable_weight`
    pub fn term_weight(&self, term: &Term) -> i64 {
        match term {
            Term::Variable(_) => self.config.variable_weight,
            Term::Constant(c) => self.constant_weight(c.id),
            Term::Function(f, args) => {
                let args_weight: i64 = args.iter().map(|t| self.term_weight(t)).sum();
                self.function_weight(f.id) + args_weight
            }
        }
    }

    fn weight_applied(&self, term: &Term, t: &AppliedTerm<'_>) -> i64 {
        match term {
            // the substitution is applied exactly once
            Term::Variable(v) => match t.subst.get(v.id) {
                Some(bound) => self.term_weight(bound),
                None => self.config.variable_weight,
            },
            Term::Constant(c) => self.constant_weight(c.id),
            Term::Function(f, args) => {
                let args_weight: i64 = args.iter().map(|a| self.weight_applied(a, t)).sum();
                self.function_weight(f.id) + args_weight
            }
        }
    }

    /// Count occurrences of each variable in a term
    fn count_variables(&self, term: &Term) -> HashMap<VariableId, usize> {
        let mut counts = HashMap::new();
        self.count_variables_rec(term, &mut counts);
        counts
    }

    fn count_variables_rec(&self, term: &Term, counts: &mut HashMap<VariableId, usize>) {
        match term {
            Term::Variable(v) => {
                *counts.entry(v.id).or_insert(0) += 1;
            }
            Term::Constant(_) => {}
            Term::Function(_, args) => {
                for arg in args {
                    self.count_variables_rec(arg, counts);
                }
            }
        }
    }

    /// Lexicographic comparison for terms of equal weight
    fn compare_lex(&self, s: &Term, t: &Term) -> Ordering {
        match (s, t) {
            (Term::Variable(v1), Term::Variable(v2)) => {
                if v1 == v2 {
                    Ordering::Equal
                } else if v1.id > v2.id {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            // Variable vs non-variable: variable is always smaller in lex ordering
            (Term::Variable(_), _) => Ordering::Less,
            (_, Term::Variable(_)) => Ordering::Greater,
            (Term::Constant(c1), Term::Constant(c2)) => {
                if c1.id == c2.id {
                    Ordering::Equal
                } else {
                    self.constant_precedence_cmp(c1.id, c2.id)
                }
            }
            (Term::Function(f1, args1), Term::Function(f2, args2)) => {
                if f1.id != f2.id {
                    self.function_precedence_cmp(f1.id, f2.id)
                } else {
                    for (arg1, arg2) in args1.iter().zip(args2.iter()) {
                        match self.compare(arg1, arg2) {
                            Ordering::Equal => continue,
                            other => return other,
                        }
                    }
                    Ordering::Equal
                }
            }
            (Term::Function(_, _), Term::Constant(_)) => Ordering::Greater,
            (Term::Constant(_), Term::Function(_, _)) => Ordering::Less,
        }
    }

    fn function_precedence_cmp(&self, f1: FunctionId, f2: FunctionId) -> Ordering {
        let prec1 = self.function_precedence(f1);
        let prec2 = self.function_precedence(f2);
        if prec1 > prec2 || (prec1 == prec2 && f1 > f2) {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    fn constant_precedence_cmp(&self, c1: ConstantId, c2: ConstantId) -> Ordering {
        let prec1 = self.constant_precedence(c1);
        let prec2 = self.constant_precedence(c2);
        if prec1 > prec2 || (prec1 == prec2 && c1 > c2) {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    /// Weight-equal tie break on the top symbols
    fn tie_break(&self, lhs: &Term, rhs: &Term) -> TieBreak {
        match (lhs, rhs) {
            (Term::Function(f, args1), Term::Function(g, args2)) => {
                if f.id == g.id {
                    TieBreak::ArgsLex(
                        args1
                            .iter()
                            .cloned()
                            .zip(args2.iter().cloned())
                            .collect(),
                    )
                } else {
                    TieBreak::Decided(self.function_precedence_cmp(f.id, g.id))
                }
            }
            (Term::Function(_, _), Term::Constant(_)) => TieBreak::Decided(Ordering::Greater),
            (Term::Constant(_), Term::Function(_, _)) => TieBreak::Decided(Ordering::Less),
            (Term::Constant(c1), Term::Constant(c2)) => {
                if c1.id == c2.id {
                    TieBreak::Decided(Ordering::Equal)
                } else {
                    TieBreak::Decided(self.constant_precedence_cmp(c1.id, c2.id))
                }
            }
            _ => unreachable!("tie break requires non-variable terms"),
        }
    }

    fn accumulate_weight_delta(
        &self,
        term: &Term,
        sign: i64,
        constant: &mut i64,
        coeffs: &mut HashMap<VariableId, i64>,
    ) {
        match term {
            Term::Variable(v) => {
                *coeffs.entry(v.id).or_insert(0) += sign;
            }
            Term::Constant(c) => {
                *constant += sign * self.constant_weight(c.id);
            }
            Term::Function(f, args) => {
                *constant += sign * self.function_weight(f.id);
                for arg in args {
                    self.accumulate_weight_delta(arg, sign, constant, coeffs);
                }
            }
        }
    }
}

impl TermOrdering for KBO {
    /// Compare two terms using KBO
    fn compare(&self, s: &Term, t: &Term) -> Ordering {
        if s == t {
            return Ordering::Equal;
        }

        let vars_s = self.count_variables(s);
        let vars_t = self.count_variables(t);

        // For s > t, need #(x, s) >= #(x, t) for all variables x
        let s_gt_t_var_cond = vars_t.iter().all(|(var_id, count_t)| {
            let count_s = vars_s.get(var_id).copied().unwrap_or(0);
            count_s >= *count_t
        });
        let t_gt_s_var_cond = vars_s.iter().all(|(var_id, count_s)| {
            let count_t = vars_t.get(var_id).copied().unwrap_or(0);
            count_t >= *count_s
        });

        let weight_s = self.term_weight(s);
        let weight_t = self.term_weight(t);

        if weight_s > weight_t && s_gt_t_var_cond {
            Ordering::Greater
        } else if weight_t > weight_s && t_gt_s_var_cond {
            Ordering::Less
        } else if weight_s == weight_t {
            if s_gt_t_var_cond && t_gt_s_var_cond {
                self.compare_lex(s, t)
            } else if s_gt_t_var_cond {
                let lex = self.compare_lex(s, t);
                if lex == Ordering::Greater || lex == Ordering::Equal {
                    lex
                } else {
                    Ordering::Incomparable
                }
            } else if t_gt_s_var_cond {
                let lex = self.compare_lex(s, t);
                if lex == Ordering::Less || lex == Ordering::Equal {
                    lex
                } else {
                    Ordering::Incomparable
                }
            } else {
                Ordering::Incomparable
            }
        } else {
            Ordering::Incomparable
        }
    }

    fn compare_applied(
        &self,
        lhs: AppliedTerm<'_>,
        rhs: AppliedTerm<'_>,
        _po: Option<&mut POStruct>,
    ) -> Ordering {
        self.compare(&lhs.resolved(), &rhs.resolved())
    }

    fn compute_weight(&self, t: AppliedTerm<'_>) -> i64 {
        self.weight_applied(t.term, &t)
    }

    fn refine(
        &self,
        lhs: &Term,
        rhs: &Term,
        polys: &mut PolyInterner,
    ) -> Option<WeightExpansion> {
        if lhs.is_var() || rhs.is_var() {
            return None;
        }

        let mut constant = 0i64;
        let mut coeffs = HashMap::new();
        self.accumulate_weight_delta(lhs, 1, &mut constant, &mut coeffs);
        self.accumulate_weight_delta(rhs, -1, &mut constant, &mut coeffs);
        let pairs: Vec<(VariableId, i64)> =
            coeffs.into_iter().filter(|&(_, c)| c != 0).collect();

        if pairs.is_empty() {
            // equal variable occurrence counts, so the variable condition
            // holds in both directions and the sign decides
            if constant > 0 {
                return Some(WeightExpansion::Decided(Ordering::Greater));
            }
            if constant < 0 {
                return Some(WeightExpansion::Decided(Ordering::Less));
            }
            return Some(match self.tie_break(lhs, rhs) {
                TieBreak::Decided(o) => WeightExpansion::Decided(o),
                TieBreak::ArgsLex(args) => WeightExpansion::Lex(args),
            });
        }

        Some(WeightExpansion::Poly {
            poly: polys.get(constant, pairs),
            tie: self.tie_break(lhs, rhs),
        })
    }
}
