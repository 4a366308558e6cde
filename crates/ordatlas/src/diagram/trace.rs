//! Partial-ordering traces
//!
//! A trace records, per unordered term pair, which ordering relations are
//! still possible on the current diagram path. Relations are kept as a
//! bitmask so the "not greater and not equal" branch can record the
//! disjunction of Less and Incomparable in one fact. Traces are persistent:
//! extension clones the underlying map, so a branch keeps its parent trace
//! untouched.

use crate::fol::ordering::Ordering;
use crate::fol::term::Term;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Bitmask of ordering relations still possible for a term pair
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RelMask(u8);

impl RelMask {
    pub const GREATER: RelMask = RelMask(0b0001);
    pub const EQUAL: RelMask = RelMask(0b0010);
    pub const LESS: RelMask = RelMask(0b0100);
    pub const INCOMPARABLE: RelMask = RelMask(0b1000);
    /// Less or Incomparable, the relation recorded on an `nge` branch
    pub const NGEQ: RelMask = RelMask(0b1100);
    /// No information
    pub const ANY: RelMask = RelMask(0b1111);

    /// The mask with the sides of the relation swapped
    pub fn reversed(self) -> RelMask {
        let mut out = self.0 & (Self::EQUAL.0 | Self::INCOMPARABLE.0);
        if self.0 & Self::GREATER.0 != 0 {
            out |= Self::LESS.0;
        }
        if self.0 & Self::LESS.0 != 0 {
            out |= Self::GREATER.0;
        }
        RelMask(out)
    }

    pub fn intersect(self, other: RelMask) -> RelMask {
        RelMask(self.0 & other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether every relation still possible under `self` is allowed by
    /// `other`. An empty mask implies nothing.
    pub fn implies(self, other: RelMask) -> bool {
        !self.is_empty() && self.0 & !other.0 == 0
    }

    /// The single definite relation, if exactly one bit is set
    pub fn as_ordering(self) -> Option<Ordering> {
        match self {
            RelMask::GREATER => Some(Ordering::Greater),
            RelMask::EQUAL => Some(Ordering::Equal),
            RelMask::LESS => Some(Ordering::Less),
            RelMask::INCOMPARABLE => Some(Ordering::Incomparable),
            _ => None,
        }
    }
}

impl From<Ordering> for RelMask {
    fn from(o: Ordering) -> RelMask {
        match o {
            Ordering::Greater => RelMask::GREATER,
            Ordering::Equal => RelMask::EQUAL,
            Ordering::Less => RelMask::LESS,
            Ordering::Incomparable => RelMask::INCOMPARABLE,
        }
    }
}

impl fmt::Display for RelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut any = false;
        for (bit, tag) in [
            (RelMask::GREATER, ">"),
            (RelMask::EQUAL, "="),
            (RelMask::LESS, "<"),
            (RelMask::INCOMPARABLE, "?"),
        ] {
            if self.0 & bit.0 != 0 {
                if any {
                    write!(f, "|")?;
                }
                write!(f, "{}", tag)?;
                any = true;
            }
        }
        if !any {
            write!(f, "!")?;
        }
        Ok(())
    }
}

/// Compose two definite relations across a shared middle term:
/// `a R1 b` and `b R2 c` yield `a R c` when the table defines one.
fn compose(r1: Ordering, r2: Ordering) -> Option<Ordering> {
    match (r1, r2) {
        (Ordering::Equal, r) => Some(r),
        (r, Ordering::Equal) => Some(r),
        (Ordering::Greater, Ordering::Greater) => Some(Ordering::Greater),
        (Ordering::Less, Ordering::Less) => Some(Ordering::Less),
        _ => None,
    }
}

/// A persistent conjunction of ordering facts over term pairs
///
/// Keys are canonically oriented (lhs below rhs in the structural term
/// order); a lookup with swapped sides reverses the stored mask. Cloning
/// is cheap, the fact map is shared until extended.
#[derive(Debug, Clone)]
pub struct Trace {
    facts: Arc<IndexMap<(Term, Term), RelMask>>,
}

impl Trace {
    /// The trace with no recorded facts
    pub fn empty() -> Self {
        Trace {
            facts: Arc::new(IndexMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// The relations still possible between `lhs` and `rhs`
    pub fn get(&self, lhs: &Term, rhs: &Term) -> RelMask {
        if lhs == rhs {
            return RelMask::EQUAL;
        }
        if lhs <= rhs {
            self.facts
                .get(&(lhs.clone(), rhs.clone()))
                .copied()
                .unwrap_or(RelMask::ANY)
        } else {
            self.facts
                .get(&(rhs.clone(), lhs.clone()))
                .copied()
                .unwrap_or(RelMask::ANY)
                .reversed()
        }
    }

    /// Record that only the relations in `rel` remain possible between
    /// `lhs` and `rhs`. Returns the extended trace, or `None` when the
    /// new fact contradicts the recorded ones. Definite facts are closed
    /// transitively through shared terms.
    pub fn set(&self, lhs: &Term, rhs: &Term, rel: RelMask) -> Option<Trace> {
        let mut facts: IndexMap<(Term, Term), RelMask> = (*self.facts).clone();
        let mut queue: Vec<(Term, Term, RelMask)> = vec![(lhs.clone(), rhs.clone(), rel)];

        while let Some((a, b, m)) = queue.pop() {
            let (a, b, m) = if a <= b { (a, b, m) } else { (b, a, m.reversed()) };
            if a == b {
                if !RelMask::EQUAL.implies(m) {
                    return None;
                }
                continue;
            }
            let key = (a.clone(), b.clone());
            let cur = facts.get(&key).copied().unwrap_or(RelMask::ANY);
            let merged = cur.intersect(m);
            if merged.is_empty() {
                return None;
            }
            if merged == cur {
                continue;
            }
            facts.insert(key, merged);

            let Some(rel_ab) = merged.as_ordering() else {
                continue;
            };
            // close over every other definite fact sharing an endpoint
            let snapshot: Vec<((Term, Term), Ordering)> = facts
                .iter()
                .filter_map(|(k, v)| v.as_ordering().map(|o| (k.clone(), o)))
                .collect();
            for ((c, d), rel_cd) in snapshot {
                if c == a && d == b {
                    continue;
                }
                let derived = if b == c {
                    compose(rel_ab, rel_cd).map(|o| (a.clone(), d.clone(), o))
                } else if a == d {
                    compose(rel_cd, rel_ab).map(|o| (c.clone(), b.clone(), o))
                } else if a == c {
                    compose(rel_ab.reversed(), rel_cd).map(|o| (b.clone(), d.clone(), o))
                } else if b == d {
                    compose(rel_ab, rel_cd.reversed()).map(|o| (a.clone(), c.clone(), o))
                } else {
                    None
                };
                if let Some((x, y, o)) = derived {
                    queue.push((x, y, RelMask::from(o)));
                }
            }
        }

        Some(Trace {
            facts: Arc::new(facts),
        })
    }
}

impl Default for Trace {
    fn default() -> Self {
        Trace::empty()
    }
}

/// A single ordering constraint between two terms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermOrderingConstraint {
    pub lhs: Term,
    pub rhs: Term,
    pub rel: Ordering,
}

/// A partial ordering under construction, with the constraint list that
/// produced it
#[derive(Debug, Clone, Default)]
pub struct POStruct {
    pub tpo: Trace,
    pub cons: Vec<TermOrderingConstraint>,
}

impl POStruct {
    pub fn new() -> Self {
        POStruct::default()
    }

    /// Add a constraint. Returns `Some(true)` when the ordering was
    /// extended, `Some(false)` when the constraint was already implied,
    /// and `None` on contradiction (self left unchanged).
    pub fn try_extend(&mut self, lhs: &Term, rhs: &Term, rel: Ordering) -> Option<bool> {
        let mask = RelMask::from(rel);
        if self.tpo.get(lhs, rhs).implies(mask) {
            return Some(false);
        }
        let extended = self.tpo.set(lhs, rhs, mask)?;
        self.tpo = extended;
        self.cons.push(TermOrderingConstraint {
            lhs: lhs.clone(),
            rhs: rhs.clone(),
            rel,
        });
        Some(true)
    }
}
