//! # Modal Guard Core
//!
//! Engine facade for Modal Guard. Ties the formula language, the Kripke
//! model, agent beliefs and the expert-rule guardrail into one object that
//! an orchestration layer can drive tick by tick.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MODAL GUARD CORE                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │   EngineConfig ──► Engine ◄──── SharedEngine (RwLock)       │
//! │                      │                                      │
//! │        ┌─────────────┼──────────────┬──────────────┐        │
//! │        ▼             ▼              ▼              ▼        │
//! │  ┌──────────┐  ┌───────────┐  ┌───────────┐  ┌──────────┐   │
//! │  │  Parser  │  │  Kripke   │  │  Belief   │  │Guardrail │   │
//! │  │          │  │  Model    │  │  Store    │  │ (rules)  │   │
//! │  └──────────┘  └───────────┘  └───────────┘  └──────────┘   │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use modal_core::{Engine, EngineConfig};
//! use modal_kripke::AgentId;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     [[worlds]]
//!     id = "w0"
//!     valuation = { rf_power_low = true, klystron_fault_reported = true }
//!
//!     [[agents]]
//!     id = "RF_Agent"
//!     start_world = "w0"
//!
//!     [[rules]]
//!     name = "klystron_implies_rf_power"
//!     formula = "klystron_fault_reported -> rf_power_low"
//! "#)?;
//! let engine = Engine::new(config)?;
//!
//! let verdict = engine.admit("klystron_fault_reported", &AgentId::new("RF_Agent"))?;
//! assert!(verdict.accepted);
//! # Ok::<(), modal_core::EngineError>(())
//! ```
//!
//! ## Error Policy
//!
//! - Load-time problems (bad rules, unknown worlds, frame violations) are
//!   fatal: [`Engine::new`] refuses to build.
//! - Per-hypothesis problems (syntax, undefined propositions, refused
//!   transitions) are returned to the caller and leave the engine unchanged.
//!   See [`EngineError::is_recoverable`].
//! - A hypothesis that cannot be evaluated is an error, never a rejection.

mod config;
mod engine;
mod error;
mod shared;
mod verdict;

pub use config::{AgentConfig, EngineConfig, GlobalConfig, RelationConfig, RuleConfig, WorldConfig};
pub use engine::Engine;
pub use error::{ConfigError, EngineError};
pub use shared::SharedEngine;
pub use verdict::VerdictRecord;

// Re-export component types for convenience
pub use modal_guardrail::{Admission, GuardrailConfig, Rejection, RuleSet, RuleViolation};
pub use modal_kripke::{
    AgentId, Assumptions, BeliefEntry, CacheStats, EvaluatorConfig, KripkeModel, ModalSystem,
    Observation, WorldId,
};
pub use modal_logic::{parse, Formula};

/// Core result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
