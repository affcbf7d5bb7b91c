//! Named expert rules.
//!
//! A [`RuleSet`] is loaded once, in order, from `(name, text)` pairs. Order
//! is significant: admission reports the first violated rule, so the same
//! rule set always yields the same rejection message.

use std::collections::{BTreeSet, HashSet};

use modal_logic::{parse, Fingerprint, Formula, Modality};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{GuardrailError, Result, RuleLoadFailure};

/// One expert axiom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    name: String,
    formula: Formula,
    source: String,
}

impl Rule {
    /// Builds a rule from an already parsed formula. Its source text is the
    /// canonical rendering.
    pub fn new(name: impl Into<String>, formula: Formula) -> Self {
        let source = formula.to_string();
        Self {
            name: name.into(),
            formula,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    /// The text the rule was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// An ordered, uniquely named collection of rules.
///
/// # Example
///
/// ```rust
/// use modal_guardrail::RuleSet;
///
/// let rules = RuleSet::load([
///     ("cooling_cause", "[] (rf_temp_high -> <>cooling_fault_reported)"),
///     ("distinct_faults", "[] ~(cooling_fault_reported & klystron_fault_reported)"),
/// ])?;
/// assert_eq!(rules.len(), 2);
/// assert!(rules.atoms().contains("rf_temp_high"));
/// # Ok::<(), modal_guardrail::GuardrailError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every `(name, text)` pair.
    ///
    /// # Errors
    ///
    /// [`GuardrailError::InvalidRules`] listing every rule that failed to
    /// parse and every repeated name, not just the first problem.
    pub fn load<I, N, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: AsRef<str>,
    {
        let mut rules = Vec::new();
        let mut failures = Vec::new();
        let mut seen = HashSet::new();

        for (name, text) in pairs {
            let name = name.into();
            let text = text.as_ref();
            if !seen.insert(name.clone()) {
                failures.push(RuleLoadFailure::DuplicateName { name });
                continue;
            }
            match parse(text) {
                Ok(formula) => rules.push(Rule {
                    name,
                    formula,
                    source: text.trim().to_string(),
                }),
                Err(error) => failures.push(RuleLoadFailure::Syntax { name, error }),
            }
        }

        if !failures.is_empty() {
            for failure in &failures {
                warn!(%failure, "rule rejected");
            }
            return Err(GuardrailError::InvalidRules { failures });
        }

        let set = Self { rules };
        info!(rules = set.len(), digest = %set.digest_hex(), "rule set loaded");
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Every proposition any rule mentions.
    pub fn atoms(&self) -> BTreeSet<&str> {
        self.rules.iter().flat_map(|rule| rule.formula.atoms()).collect()
    }

    /// Every modality any rule mentions.
    pub fn modalities(&self) -> BTreeSet<&Modality> {
        self.rules
            .iter()
            .flat_map(|rule| rule.formula.modalities())
            .collect()
    }

    /// SHA-256 over the names and canonical formulas, in order.
    ///
    /// Two rule sets that differ only in whitespace or redundant
    /// parentheses share a digest.
    pub fn digest(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        for rule in &self.rules {
            hasher.update(rule.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(rule.formula.to_string().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().into()
    }

    pub fn digest_hex(&self) -> String {
        modal_logic::to_hex(&self.digest())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl FromIterator<Rule> for RuleSet {
    /// Collects already parsed rules. Later rules with a repeated name are
    /// dropped.
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let rules = iter
            .into_iter()
            .filter(|rule| seen.insert(rule.name.clone()))
            .collect();
        Self { rules }
    }
}
