//! Verdict records returned to the orchestration layer.

use modal_guardrail::Admission;
use modal_kripke::WorldId;
use modal_logic::Formula;
use serde::{Deserialize, Serialize};

/// The engine's answer to one `admit` call.
///
/// Records are self-describing: besides the verdict they carry the model
/// version and rule set digest they were computed against, so a log of
/// records can be audited after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    /// Whether the hypothesis may be adopted.
    pub accepted: bool,

    /// Name of the first violated rule, if a rule caused the rejection.
    pub violated_rule: Option<String>,

    /// World at which the hypothesis was evaluated.
    pub evaluated_world: WorldId,

    /// Canonical text of the hypothesis.
    pub candidate: String,

    /// Human-readable explanation.
    pub reason: String,

    /// Model version the verdict was computed against.
    pub model_version: u64,

    /// Hex SHA-256 of the rule set.
    pub rule_set_digest: String,
}

impl VerdictRecord {
    /// Builds a record from a guardrail admission.
    pub fn new(
        admission: &Admission,
        candidate: &Formula,
        evaluated_world: WorldId,
        model_version: u64,
        rule_set_digest: impl Into<String>,
    ) -> Self {
        Self {
            accepted: admission.is_accepted(),
            violated_rule: admission.violated_rule().map(str::to_string),
            evaluated_world,
            candidate: candidate.to_string(),
            reason: admission.to_string(),
            model_version,
            rule_set_digest: rule_set_digest.into(),
        }
    }

    /// Returns true if the hypothesis was rejected because it is false at
    /// the evaluated world.
    pub fn is_contradiction(&self) -> bool {
        !self.accepted && self.violated_rule.is_none()
    }
}
