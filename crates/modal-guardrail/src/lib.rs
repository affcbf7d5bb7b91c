//! # Modal Guard Guardrail
//!
//! Rejects hypotheses that are inconsistent with a fixed set of expert
//! axioms. An upstream generator proposes a candidate formula; the guardrail
//! accepts it only if it holds at the agent's world and asserting it leaves
//! every rule true.
//!
//! ## Components
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`RuleSet`] | Ordered, uniquely named rules loaded from text |
//! | [`check_all`] | Every violated rule at a world |
//! | [`Guardrail`] | Admission of candidates, optionally over reachable worlds |
//!
//! ## Quick Start
//!
//! ```rust
//! use modal_guardrail::{Admission, Guardrail, RuleSet};
//! use modal_kripke::{KripkeModel, Valuation};
//! use modal_logic::parse;
//!
//! let mut model = KripkeModel::new();
//! model.add_world("w0", Valuation::from([
//!     ("vacuum_fault_reported".to_string(), false),
//!     ("rf_power_fault_reported".to_string(), true),
//! ])).unwrap();
//!
//! let guardrail = Guardrail::new(RuleSet::load([(
//!     "vacuum_not_root",
//!     "vacuum_fault_reported -> ~rf_power_fault_reported",
//! )])?);
//!
//! let candidate = parse("rf_power_fault_reported").unwrap();
//! let verdict = guardrail.admit(&candidate, &"w0".into(), &model)?;
//! assert_eq!(verdict, Admission::Accepted);
//! # Ok::<(), modal_guardrail::GuardrailError>(())
//! ```
//!
//! Undefined propositions are errors, not rejections: a candidate that
//! cannot be evaluated yet is reported as such so the caller can retry after
//! more readings arrive.

mod checker;
mod error;
mod guardrail;
mod rules;

pub use checker::{check_all, outcomes, RuleOutcome, RuleViolation};
pub use error::{GuardrailError, Result, RuleLoadFailure};
pub use guardrail::{Admission, Guardrail, GuardrailConfig, Rejection};
pub use rules::{Rule, RuleSet};
