//! Hypothesis admission against an expert rule set.
//!
//! ## Admission procedure
//!
//! 1. Evaluate the candidate at the world. False rejects it as
//!    [`Rejection::Contradicted`].
//! 2. Build an [`Assumptions`] overlay asserting the candidate's hypothesis
//!    literals (the atoms and negated atoms of its top-level conjunction) at
//!    that world.
//! 3. Evaluate every rule, in order, under the overlay. The first false rule
//!    rejects the candidate as [`Rejection::RuleViolated`].
//!
//! Evaluation errors are returned, never turned into verdicts. The model is
//! only borrowed immutably, so admission cannot change it.

use std::fmt;

use modal_kripke::{evaluate_with, Assumptions, EvalError, KripkeModel, WorldId};
use modal_logic::Formula;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::checker::{first_violation, violations, RuleViolation};
use crate::error::Result;
use crate::rules::RuleSet;

/// Guardrail settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailConfig {
    /// Also check rules at every world reachable from the evaluated world,
    /// following any modality.
    pub check_reachable: bool,
}

impl GuardrailConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_check_reachable(mut self, enabled: bool) -> Self {
        self.check_reachable = enabled;
        self
    }
}

/// Why a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// The candidate is false at the evaluated world.
    Contradicted,
    /// Asserting the candidate falsifies an expert rule.
    RuleViolated { rule: String, world: WorldId },
}

/// Guardrail verdict for one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "rejection", rename_all = "snake_case")]
pub enum Admission {
    Accepted,
    Rejected(Rejection),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Name of the violated rule, if any.
    pub fn violated_rule(&self) -> Option<&str> {
        match self {
            Self::Rejected(Rejection::RuleViolated { rule, .. }) => Some(rule.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("consistent with all expert rules"),
            Self::Rejected(Rejection::Contradicted) => {
                f.write_str("contradicted by the current valuation")
            }
            Self::Rejected(Rejection::RuleViolated { rule, world }) => {
                write!(f, "violates expert rule '{}' at world '{}'", rule, world)
            }
        }
    }
}

/// A rule set plus the settings it is applied with.
///
/// # Example
///
/// ```rust
/// use modal_guardrail::{Guardrail, RuleSet};
/// use modal_kripke::{KripkeModel, Valuation};
/// use modal_logic::parse;
///
/// let mut model = KripkeModel::new();
/// model.add_world(
///     "w0",
///     Valuation::from([
///         ("cooling_fault_reported".to_string(), true),
///         ("klystron_fault_reported".to_string(), true),
///     ]),
/// ).unwrap();
///
/// let rules = RuleSet::load([(
///     "distinct_faults",
///     "~(cooling_fault_reported & klystron_fault_reported)",
/// )])?;
/// let guardrail = Guardrail::new(rules);
///
/// let verdict = guardrail.admit(&parse("cooling_fault_reported").unwrap(), &"w0".into(), &model)?;
/// assert_eq!(verdict.violated_rule(), Some("distinct_faults"));
/// # Ok::<(), modal_guardrail::GuardrailError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Guardrail {
    rules: RuleSet,
    config: GuardrailConfig,
}

impl Guardrail {
    pub fn new(rules: RuleSet) -> Self {
        Self::with_config(rules, GuardrailConfig::new())
    }

    pub fn with_config(rules: RuleSet, config: GuardrailConfig) -> Self {
        Self { rules, config }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &GuardrailConfig {
        &self.config
    }

    /// Every violated rule at `world` (and reachable worlds, if configured).
    pub fn check_all(&self, world: &WorldId, model: &KripkeModel) -> Result<Vec<RuleViolation>> {
        let scope = self.scope(world, model)?;
        violations(&self.rules, &scope, model, None)
    }

    /// Decides whether `candidate` may be adopted at `world`.
    ///
    /// # Arguments
    ///
    /// * `candidate` - The hypothesis to admit
    /// * `world` - The world it is asserted at, normally the agent's current world
    /// * `model` - The live model, read only
    ///
    /// # Errors
    ///
    /// [`GuardrailError::Eval`] if the candidate or a rule cannot be
    /// evaluated, e.g. because a proposition is undefined.
    pub fn admit(
        &self,
        candidate: &Formula,
        world: &WorldId,
        model: &KripkeModel,
    ) -> Result<Admission> {
        self.admit_assuming(candidate, world, model, &Assumptions::new())
    }

    /// Like [`admit`](Self::admit), with `base` layered over the model first.
    ///
    /// This answers "would the candidate be admitted if these pending
    /// readings were in?" without recording them.
    pub fn admit_assuming(
        &self,
        candidate: &Formula,
        world: &WorldId,
        model: &KripkeModel,
        base: &Assumptions,
    ) -> Result<Admission> {
        if !evaluate_with(candidate, world, model, base)? {
            info!(%candidate, %world, "hypothesis rejected: contradicted");
            return Ok(Admission::Rejected(Rejection::Contradicted));
        }

        let mut overlay = base.clone();
        for literal in candidate.conjuncts() {
            if let Some((name, value)) = literal.as_literal() {
                overlay.assume(world, name, value);
            }
        }
        debug!(%candidate, assumptions = overlay.len(), "trial evaluation");

        let scope = self.scope(world, model)?;
        match first_violation(&self.rules, &scope, model, Some(&overlay))? {
            Some(RuleViolation { rule, world }) => {
                info!(%candidate, %rule, %world, "hypothesis rejected: violates expert rule");
                Ok(Admission::Rejected(Rejection::RuleViolated { rule, world }))
            }
            None => {
                info!(%candidate, %world, "hypothesis admitted");
                Ok(Admission::Accepted)
            }
        }
    }

    /// The evaluated world first, then reachable worlds in sorted order.
    fn scope(&self, world: &WorldId, model: &KripkeModel) -> Result<Vec<WorldId>> {
        let mut scope = vec![world.clone()];
        if self.config.check_reachable {
            let reachable = model.reachable(world, None).map_err(|_| EvalError::UnknownWorld {
                world: world.clone(),
            })?;
            scope.extend(reachable.into_iter().filter(|w| w != world));
        }
        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GuardrailError;
    use modal_kripke::Valuation;
    use modal_logic::parse;

    fn vals(pairs: &[(&str, bool)]) -> Valuation {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn setup() -> (KripkeModel, Guardrail) {
        let mut model = KripkeModel::new();
        model
            .add_world("w0", vals(&[("a", true), ("b", false), ("c", true)]))
            .unwrap();
        model.add_world("w1", vals(&[("a", false), ("b", false), ("c", true)])).unwrap();
        model.add_accessibility("m", "w0", "w1").unwrap();
        let rules = RuleSet::load([("no_a_and_c", "~(a & c)"), ("b_needs_a", "b -> a")]).unwrap();
        (model, Guardrail::new(rules))
    }

    #[test]
    fn test_contradicted_candidate() {
        let (model, guardrail) = setup();
        let verdict = guardrail.admit(&parse("b").unwrap(), &"w1".into(), &model).unwrap();
        assert_eq!(verdict, Admission::Rejected(Rejection::Contradicted));
        assert_eq!(verdict.violated_rule(), None);
    }

    #[test]
    fn test_first_violated_rule_reported() {
        let (model, guardrail) = setup();
        let verdict = guardrail.admit(&parse("a").unwrap(), &"w0".into(), &model).unwrap();
        assert_eq!(verdict.violated_rule(), Some("no_a_and_c"));
    }

    #[test]
    fn test_accepted() {
        let (model, guardrail) = setup();
        let verdict = guardrail.admit(&parse("~a & c").unwrap(), &"w1".into(), &model).unwrap();
        assert!(verdict.is_accepted());
        assert_eq!(verdict.to_string(), "consistent with all expert rules");
    }

    #[test]
    fn test_undefined_candidate_is_error() {
        let (model, guardrail) = setup();
        let err = guardrail
            .admit(&parse("temperature_critical").unwrap(), &"w0".into(), &model)
            .unwrap_err();
        assert!(matches!(
            err,
            GuardrailError::Eval(EvalError::UndefinedProposition { ref proposition, .. })
                if proposition == "temperature_critical"
        ));
    }

    #[test]
    fn test_pending_reading_changes_verdict() {
        let (model, guardrail) = setup();
        let candidate = parse("b").unwrap();
        let pending = Assumptions::new().with("w1", "b", true);
        let verdict = guardrail
            .admit_assuming(&candidate, &"w1".into(), &model, &pending)
            .unwrap();
        assert_eq!(verdict.violated_rule(), Some("b_needs_a"));
    }

    #[test]
    fn test_reachable_worlds_checked_when_enabled() {
        let (model, guardrail) = setup();
        let wide = Guardrail::with_config(
            RuleSet::load([("a_everywhere", "a")]).unwrap(),
            GuardrailConfig::new().with_check_reachable(true),
        );
        let verdict = wide.admit(&parse("c").unwrap(), &"w0".into(), &model).unwrap();
        assert_eq!(
            verdict,
            Admission::Rejected(Rejection::RuleViolated {
                rule: "a_everywhere".into(),
                world: "w1".into()
            })
        );
        assert!(guardrail.check_all(&"w1".into(), &model).unwrap().is_empty());
    }

    #[test]
    fn test_admission_serializes_with_tag() {
        let json = serde_json::to_string(&Admission::Rejected(Rejection::RuleViolated {
            rule: "r".into(),
            world: "w0".into(),
        }))
        .unwrap();
        assert_eq!(
            json,
            r#"{"verdict":"rejected","rejection":{"kind":"rule_violated","rule":"r","world":"w0"}}"#
        );
    }
}
