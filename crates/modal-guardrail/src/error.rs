//! Error types for rule loading and admission.

use modal_kripke::EvalError;
use modal_logic::SyntaxError;
use std::fmt;
use thiserror::Error;

/// One problem found while loading a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleLoadFailure {
    /// The rule text does not parse.
    Syntax {
        /// Rule name
        name: String,
        /// Parser diagnostic
        error: SyntaxError,
    },
    /// The name was already used by an earlier rule.
    DuplicateName {
        /// Rule name
        name: String,
    },
}

impl fmt::Display for RuleLoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { name, error } => write!(f, "rule '{}': {}", name, error),
            Self::DuplicateName { name } => write!(f, "rule '{}': duplicate name", name),
        }
    }
}

/// Errors that can occur during guardrail operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardrailError {
    /// At least one rule failed to load. Every failure is listed.
    #[error("{} invalid rule(s): {}", .failures.len(), list(.failures))]
    InvalidRules {
        /// All failures, in input order
        failures: Vec<RuleLoadFailure>,
    },

    /// A candidate or rule could not be evaluated.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

fn list(failures: &[RuleLoadFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for guardrail operations.
pub type Result<T> = std::result::Result<T, GuardrailError>;
