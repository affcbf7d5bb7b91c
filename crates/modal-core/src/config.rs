//! Configuration types for the Modal Guard engine.
//!
//! An [`EngineConfig`] describes a complete engine: the worlds and their
//! valuations, accessibility edges, the agents reasoning over them and the
//! expert rule set. It is usually loaded from TOML:
//!
//! ```toml
//! [global]
//! strict_valuation = true
//! assumed_system = "S4"
//!
//! [evaluator]
//! max_cache_entries = 4096
//!
//! [[worlds]]
//! id = "w0"
//! valuation = { rf_temp_high = true, cooling_fault_reported = false }
//!
//! [[relations]]
//! modality = "RF"
//! from = "w0"
//! to = "w1"
//!
//! [[agents]]
//! id = "RF_Agent"
//! modality = "RF"
//! start_world = "w0"
//!
//! [[rules]]
//! name = "cooling_may_cause_rf_temp"
//! formula = "[] (rf_temp_high -> <>cooling_fault_reported)"
//! ```

use std::fs;
use std::path::Path;

use modal_guardrail::GuardrailConfig;
use modal_kripke::{EvaluatorConfig, ModalSystem, Valuation};
use modal_logic::DEFAULT_MODALITY;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Global settings.
    pub global: GlobalConfig,

    /// Evaluator cache settings.
    pub evaluator: EvaluatorConfig,

    /// Guardrail settings.
    pub guardrail: GuardrailConfig,

    /// Worlds with their initial valuations.
    pub worlds: Vec<WorldConfig>,

    /// Accessibility edges.
    pub relations: Vec<RelationConfig>,

    /// Agents and where they start.
    pub agents: Vec<AgentConfig>,

    /// Expert rules, in evaluation order.
    pub rules: Vec<RuleConfig>,
}

/// Global engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Refuse to start when a rule proposition is undefined at some world.
    /// When off, missing assignments are only logged.
    pub strict_valuation: bool,

    /// Modal system the rules are written for. Checked against every
    /// modality used by the model or the rules at start-up.
    pub assumed_system: Option<ModalSystem>,
}

/// One world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    pub id: String,
    #[serde(default)]
    pub valuation: Valuation,
}

/// One accessibility edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationConfig {
    #[serde(default = "default_modality")]
    pub modality: String,
    pub from: String,
    pub to: String,
}

/// One agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    #[serde(default = "default_modality")]
    pub modality: String,
    pub start_world: String,
}

/// One expert rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    pub formula: String,
}

fn default_modality() -> String {
    DEFAULT_MODALITY.to_string()
}

impl EngineConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str::<EngineConfig>(contents).map_err(ConfigError::Parse)
    }

    #[must_use]
    pub fn with_world<I, K>(mut self, id: impl Into<String>, valuation: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        self.worlds.push(WorldConfig {
            id: id.into(),
            valuation: valuation.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        });
        self
    }

    #[must_use]
    pub fn with_relation(
        mut self,
        modality: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.relations.push(RelationConfig {
            modality: modality.into(),
            from: from.into(),
            to: to.into(),
        });
        self
    }

    #[must_use]
    pub fn with_agent(
        mut self,
        id: impl Into<String>,
        modality: impl Into<String>,
        start_world: impl Into<String>,
    ) -> Self {
        self.agents.push(AgentConfig {
            id: id.into(),
            modality: modality.into(),
            start_world: start_world.into(),
        });
        self
    }

    #[must_use]
    pub fn with_rule(mut self, name: impl Into<String>, formula: impl Into<String>) -> Self {
        self.rules.push(RuleConfig {
            name: name.into(),
            formula: formula.into(),
        });
        self
    }

    #[must_use]
    pub fn with_strict_valuation(mut self, strict: bool) -> Self {
        self.global.strict_valuation = strict;
        self
    }

    #[must_use]
    pub fn with_assumed_system(mut self, system: ModalSystem) -> Self {
        self.global.assumed_system = Some(system);
        self
    }

    #[must_use]
    pub fn with_evaluator(mut self, evaluator: EvaluatorConfig) -> Self {
        self.evaluator = evaluator;
        self
    }

    #[must_use]
    pub fn with_guardrail(mut self, guardrail: GuardrailConfig) -> Self {
        self.guardrail = guardrail;
        self
    }
}
