//! Error types for Modal Guard Core.

use modal_guardrail::GuardrailError;
use modal_kripke::{BeliefError, EvalError, FrameProperty, ModalSystem, ModelError, WorldId};
use modal_logic::{Modality, SyntaxError};
use thiserror::Error;

/// Errors raised while reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO failure when reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Core error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed formula text.
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Model construction or lookup failure.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// A formula could not be evaluated.
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// A belief transition or agent lookup failed.
    #[error("belief error: {0}")]
    Belief(#[from] BeliefError),

    /// The rule set failed to load.
    #[error("rule set error: {0}")]
    Rules(GuardrailError),

    /// A modality's relation lacks a property the declared system requires.
    #[error("relation [{modality}] does not satisfy {system}: not {}", join(.failed))]
    FrameViolation {
        modality: Modality,
        system: ModalSystem,
        failed: Vec<FrameProperty>,
    },

    /// Strict valuation is on and some rule proposition is unassigned.
    #[error("{} rule proposition(s) undefined: {}", .missing.len(), sample(.missing))]
    IncompleteValuation {
        /// `(world, proposition)` pairs
        missing: Vec<(WorldId, String)>,
    },

    /// Configuration file problem.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<GuardrailError> for EngineError {
    fn from(err: GuardrailError) -> Self {
        match err {
            GuardrailError::Eval(eval) => Self::Eval(eval),
            other => Self::Rules(other),
        }
    }
}

impl EngineError {
    /// Whether the caller can carry on, e.g. by skipping the hypothesis
    /// until the next tick. Load-time and configuration errors are not
    /// recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Syntax(_) => true,
            Self::Model(ModelError::InvalidProposition { .. }) => true,
            Self::Eval(EvalError::UndefinedProposition { .. }) => true,
            Self::Belief(BeliefError::InaccessibleWorld { .. })
            | Self::Belief(BeliefError::InconsistentObservation { .. }) => true,
            _ => false,
        }
    }
}

fn sample(missing: &[(WorldId, String)]) -> String {
    let mut shown: Vec<String> = missing
        .iter()
        .take(3)
        .map(|(world, proposition)| format!("'{}' at '{}'", proposition, world))
        .collect();
    if missing.len() > shown.len() {
        shown.push("...".to_string());
    }
    shown.join(", ")
}

fn join(properties: &[FrameProperty]) -> String {
    properties
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guardrail_eval_errors_unwrap() {
        let err: EngineError = GuardrailError::Eval(EvalError::UndefinedProposition {
            proposition: "p".into(),
            world: "w0".into(),
        })
        .into();
        assert!(matches!(err, EngineError::Eval(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_load_errors_are_fatal() {
        let err: EngineError = ModelError::DuplicateWorld { world: "w0".into() }.into();
        assert!(!err.is_recoverable());
        let err: EngineError = GuardrailError::InvalidRules { failures: vec![] }.into();
        assert!(matches!(err, EngineError::Rules(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_frame_violation_display() {
        let err = EngineError::FrameViolation {
            modality: Modality::new("RF"),
            system: ModalSystem::S4,
            failed: vec![FrameProperty::Reflexive, FrameProperty::Transitive],
        };
        assert_eq!(
            err.to_string(),
            "relation [RF] does not satisfy S4: not reflexive, transitive"
        );
    }

    #[test]
    fn test_syntax_is_recoverable() {
        let err: EngineError = SyntaxError::Empty.into();
        assert!(err.is_recoverable());
    }
}
