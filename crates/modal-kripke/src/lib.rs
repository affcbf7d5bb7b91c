//! # Modal Guard Kripke Semantics
//!
//! Possible-worlds machinery for the Modal Guard engine: the model, formula
//! evaluation, frame-property checks and per-agent belief tracking.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`KripkeModel`] | Worlds, valuations and per-modality accessibility |
//! | [`Evaluator`] | Kripke semantics with a version-stamped cache |
//! | [`Assumptions`] | Hypothetical overrides for trial evaluation |
//! | [`FrameProperty`] / [`ModalSystem`] | Frame condition checks (T, D, B, 4, 5) |
//! | [`BeliefStore`] | Agent positions and append-only transition logs |
//!
//! ## Quick Start
//!
//! ```rust
//! use modal_kripke::{evaluate, KripkeModel, Valuation};
//! use modal_logic::parse;
//!
//! let mut model = KripkeModel::new();
//! model.add_world("w1", Valuation::from([("pressure_high".to_string(), true)]))?;
//! model.add_world("w2", Valuation::from([("valve_open".to_string(), false)]))?;
//! model.add_accessibility("RF", "w1", "w2")?;
//!
//! let rule = parse("pressure_high -> diamond[RF](valve_open)").unwrap();
//! assert_eq!(evaluate(&rule, &"w1".into(), &model), Ok(false));
//! # Ok::<(), modal_kripke::ModelError>(())
//! ```
//!
//! ## Undefined vs false
//!
//! A proposition missing from a world's valuation is *undefined*. Looking it
//! up yields [`EvalError::UndefinedProposition`]; it is never read as `false`.

mod assumptions;
mod belief;
mod error;
mod evaluator;
mod frame;
mod model;

pub use assumptions::Assumptions;
pub use belief::{AgentId, BeliefEntry, BeliefState, BeliefStore, Observation};
pub use error::{BeliefError, EvalError, ModelError, Result};
pub use evaluator::{evaluate, evaluate_with, CacheStats, Evaluator, EvaluatorConfig};
pub use frame::{FrameProperty, ModalSystem};
pub use model::{KripkeModel, Valuation, WorldId};
