//! Formula abstract syntax tree.
//!
//! [`Formula`] is a closed enum: every consumer matches it exhaustively, so
//! adding an operator is a compile error everywhere it is not yet handled.
//!
//! ## Canonical Printing
//!
//! `Display` renders the canonical ASCII surface syntax with the minimum
//! parentheses needed to preserve structure. Binary operators are printed
//! left-associatively, so the right operand of an operator at the same level
//! is parenthesized:
//!
//! | Formula | Printed |
//! |---------|---------|
//! | `And(And(p, q), r)` | `p & q & r` |
//! | `And(p, And(q, r))` | `p & (q & r)` |
//! | `Box(RF, Implies(p, q))` | `[RF](p -> q)` |
//! | `Not(Diamond(default, p))` | `~<>p` |
//!
//! Re-parsing printed text yields a structurally identical tree, provided
//! every atom and modality name is a valid identifier.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// Tag used when a modal operator carries no explicit modality.
pub const DEFAULT_MODALITY: &str = "default";

/// A modality tag selecting one accessibility relation (e.g. one per agent).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modality(String);

impl Modality {
    /// Creates a modality tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the tag assumed when none is written.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_MODALITY
    }
}

impl Default for Modality {
    fn default() -> Self {
        Self(DEFAULT_MODALITY.to_string())
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Modality {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Modality {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// SHA-256 digest of a formula's canonical text.
pub type Fingerprint = [u8; 32];

/// Lowercase hex encoding of a fingerprint.
pub fn to_hex(fingerprint: &Fingerprint) -> String {
    fingerprint.iter().map(|b| format!("{:02x}", b)).collect()
}

/// A propositional modal logic formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Formula {
    /// Constant truth.
    True,
    /// Constant falsehood.
    False,
    /// Atomic proposition.
    Atom(String),
    /// Negation.
    Not(Box<Formula>),
    /// Conjunction.
    And(Box<Formula>, Box<Formula>),
    /// Disjunction.
    Or(Box<Formula>, Box<Formula>),
    /// Material implication.
    Implies(Box<Formula>, Box<Formula>),
    /// Material equivalence.
    Iff(Box<Formula>, Box<Formula>),
    /// Necessity: the operand holds in every accessible world.
    Box(Modality, Box<Formula>),
    /// Possibility: the operand holds in some accessible world.
    Diamond(Modality, Box<Formula>),
}

impl Formula {
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    pub fn not(inner: Formula) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn and(left: Formula, right: Formula) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Formula, right: Formula) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn implies(left: Formula, right: Formula) -> Self {
        Self::Implies(Box::new(left), Box::new(right))
    }

    pub fn iff(left: Formula, right: Formula) -> Self {
        Self::Iff(Box::new(left), Box::new(right))
    }

    /// `[m]inner`
    pub fn necessity(modality: impl Into<Modality>, inner: Formula) -> Self {
        Self::Box(modality.into(), Box::new(inner))
    }

    /// `<m>inner`
    pub fn possibility(modality: impl Into<Modality>, inner: Formula) -> Self {
        Self::Diamond(modality.into(), Box::new(inner))
    }

    /// Returns true for `Box` and `Diamond` nodes.
    pub fn is_modal(&self) -> bool {
        matches!(self, Self::Box(..) | Self::Diamond(..))
    }

    /// Returns `(name, polarity)` if this formula is an atom or a negated atom.
    pub fn as_literal(&self) -> Option<(&str, bool)> {
        match self {
            Self::Atom(name) => Some((name.as_str(), true)),
            Self::Not(inner) => match &**inner {
                Self::Atom(name) => Some((name.as_str(), false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Flattens the top-level conjunction into its conjuncts, left to right.
    pub fn conjuncts(&self) -> Vec<&Formula> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::And(left, right) => {
                    stack.push(right.as_ref());
                    stack.push(left.as_ref());
                }
                other => out.push(other),
            }
        }
        out
    }

    /// All atomic proposition names referenced by the formula.
    pub fn atoms(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.visit(&mut |node| {
            if let Self::Atom(name) = node {
                out.insert(name.as_str());
            }
        });
        out
    }

    /// All modality tags referenced by the formula.
    pub fn modalities(&self) -> BTreeSet<&Modality> {
        let mut out = BTreeSet::new();
        self.visit(&mut |node| match node {
            Self::Box(m, _) | Self::Diamond(m, _) => {
                out.insert(m);
            }
            _ => {}
        });
        out
    }

    /// Maximum nesting of modal operators.
    pub fn modal_depth(&self) -> usize {
        match self {
            Self::True | Self::False | Self::Atom(_) => 0,
            Self::Not(inner) => inner.modal_depth(),
            Self::And(l, r) | Self::Or(l, r) | Self::Implies(l, r) | Self::Iff(l, r) => {
                l.modal_depth().max(r.modal_depth())
            }
            Self::Box(_, inner) | Self::Diamond(_, inner) => 1 + inner.modal_depth(),
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }

    /// SHA-256 of the canonical printed form.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.to_string().as_bytes());
        hasher.finalize().into()
    }

    /// Pre-order traversal.
    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Formula)) {
        f(self);
        match self {
            Self::True | Self::False | Self::Atom(_) => {}
            Self::Not(inner) | Self::Box(_, inner) | Self::Diamond(_, inner) => inner.visit(f),
            Self::And(l, r) | Self::Or(l, r) | Self::Implies(l, r) | Self::Iff(l, r) => {
                l.visit(f);
                r.visit(f);
            }
        }
    }

    /// Binding strength used by the printer; higher binds tighter.
    fn precedence(&self) -> u8 {
        match self {
            Self::Iff(..) => 1,
            Self::Implies(..) => 2,
            Self::Or(..) => 3,
            Self::And(..) => 4,
            Self::Not(_) | Self::Box(..) | Self::Diamond(..) => 5,
            Self::True | Self::False | Self::Atom(_) => 6,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        let prec = self.precedence();
        if prec < min {
            f.write_str("(")?;
            self.fmt_node(f)?;
            return f.write_str(")");
        }
        self.fmt_node(f)
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = self.precedence();
        match self {
            Self::True => f.write_str("true"),
            Self::False => f.write_str("false"),
            Self::Atom(name) => f.write_str(name),
            Self::Not(inner) => {
                f.write_str("~")?;
                inner.fmt_prec(f, prec)
            }
            Self::Box(m, inner) => {
                if m.is_default() {
                    f.write_str("[]")?;
                } else {
                    write!(f, "[{}]", m)?;
                }
                inner.fmt_prec(f, prec)
            }
            Self::Diamond(m, inner) => {
                if m.is_default() {
                    f.write_str("<>")?;
                } else {
                    write!(f, "<{}>", m)?;
                }
                inner.fmt_prec(f, prec)
            }
            Self::And(l, r) => binary(f, l, "&", r, prec),
            Self::Or(l, r) => binary(f, l, "|", r, prec),
            Self::Implies(l, r) => binary(f, l, "->", r, prec),
            Self::Iff(l, r) => binary(f, l, "<->", r, prec),
        }
    }
}

fn binary(
    f: &mut fmt::Formatter<'_>,
    left: &Formula,
    op: &str,
    right: &Formula,
    prec: u8,
) -> fmt::Result {
    left.fmt_prec(f, prec)?;
    write!(f, " {} ", op)?;
    right.fmt_prec(f, prec + 1)
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}
