//! Rule evaluation over one or more worlds.

use std::fmt;

use modal_kripke::{evaluate, evaluate_with, Assumptions, EvalError, KripkeModel, WorldId};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::rules::{Rule, RuleSet};

/// A rule that evaluated false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    /// Rule name
    pub rule: String,
    /// World at which the rule is false
    pub world: WorldId,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule '{}' violated at world '{}'", self.rule, self.world)
    }
}

/// Result of one rule at one world, evaluation errors included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome<'r> {
    pub rule: &'r Rule,
    pub world: WorldId,
    pub result: std::result::Result<bool, EvalError>,
}

/// Every rule violated at `world`, in rule order.
///
/// # Errors
///
/// The first evaluation error, in rule order. No partial list is returned.
pub fn check_all(
    rules: &RuleSet,
    world: &WorldId,
    model: &KripkeModel,
) -> Result<Vec<RuleViolation>> {
    violations(rules, std::slice::from_ref(world), model, None)
}

/// Evaluates every rule at `world` without stopping at errors.
pub fn outcomes<'r>(
    rules: &'r RuleSet,
    world: &WorldId,
    model: &KripkeModel,
) -> Vec<RuleOutcome<'r>> {
    rules
        .iter()
        .map(|rule| RuleOutcome {
            rule,
            world: world.clone(),
            result: evaluate(rule.formula(), world, model),
        })
        .collect()
}

/// All `(rule, world)` violations, rule-major.
pub(crate) fn violations(
    rules: &RuleSet,
    worlds: &[WorldId],
    model: &KripkeModel,
    overlay: Option<&Assumptions>,
) -> Result<Vec<RuleViolation>> {
    let mut found = Vec::new();
    for rule in rules {
        for world in worlds {
            if !holds(rule, world, model, overlay)? {
                found.push(RuleViolation {
                    rule: rule.name().to_string(),
                    world: world.clone(),
                });
            }
        }
    }
    Ok(found)
}

/// The first `(rule, world)` violation, rule-major.
pub(crate) fn first_violation(
    rules: &RuleSet,
    worlds: &[WorldId],
    model: &KripkeModel,
    overlay: Option<&Assumptions>,
) -> Result<Option<RuleViolation>> {
    for rule in rules {
        for world in worlds {
            if !holds(rule, world, model, overlay)? {
                return Ok(Some(RuleViolation {
                    rule: rule.name().to_string(),
                    world: world.clone(),
                }));
            }
        }
    }
    Ok(None)
}

fn holds(
    rule: &Rule,
    world: &WorldId,
    model: &KripkeModel,
    overlay: Option<&Assumptions>,
) -> Result<bool> {
    let value = match overlay {
        Some(overlay) => evaluate_with(rule.formula(), world, model, overlay)?,
        None => evaluate(rule.formula(), world, model)?,
    };
    debug!(rule = rule.name(), %world, value, "rule evaluated");
    Ok(value)
}
