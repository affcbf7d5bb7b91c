//! Error types for model construction, evaluation and belief revision.
//!
//! The three enums mirror the lifecycle of a run: [`ModelError`] is raised
//! while the model is being built (fatal at load time), [`EvalError`] while
//! formulas are evaluated (recoverable per tick), and [`BeliefError`] when an
//! agent's belief transition is refused.

use thiserror::Error;

use crate::belief::AgentId;
use crate::model::WorldId;
use modal_logic::Modality;

/// Errors raised by [`KripkeModel`](crate::KripkeModel) mutations and queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A world with this id is already registered.
    #[error("world '{world}' already exists")]
    DuplicateWorld {
        /// The conflicting world id
        world: WorldId,
    },

    /// The referenced world is not part of the model.
    #[error("unknown world '{world}'")]
    UnknownWorld {
        /// The missing world id
        world: WorldId,
    },

    /// A proposition name no formula could refer to.
    #[error("'{name}' is not a valid proposition name")]
    InvalidProposition {
        /// The rejected name
        name: String,
    },
}

/// Errors raised while evaluating a formula.
///
/// The evaluator never substitutes a truth value for a failed lookup; every
/// failure propagates to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The proposition was never assigned a value at this world.
    ///
    /// Distinct from a defined `false`: it signals missing instrumentation
    /// and means "cannot evaluate yet".
    #[error("proposition '{proposition}' is undefined at world '{world}'")]
    UndefinedProposition {
        /// The proposition name
        proposition: String,
        /// The world where the lookup failed
        world: WorldId,
    },

    /// Evaluation was requested at, or reached, a world not in the model.
    #[error("cannot evaluate at unknown world '{world}'")]
    UnknownWorld {
        /// The missing world id
        world: WorldId,
    },
}

/// Errors raised by the [`BeliefStore`](crate::BeliefStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeliefError {
    /// No belief state is registered for this agent.
    #[error("unknown agent '{agent}'")]
    UnknownAgent {
        /// The agent id
        agent: AgentId,
    },

    /// The agent already has a belief state.
    #[error("agent '{agent}' is already registered")]
    DuplicateAgent {
        /// The agent id
        agent: AgentId,
    },

    /// The target world is not accessible from the agent's current world.
    #[error("agent '{agent}' cannot move from '{from}' to '{to}' under [{modality}]")]
    InaccessibleWorld {
        /// The agent id
        agent: AgentId,
        /// The agent's modality
        modality: Modality,
        /// Current world
        from: WorldId,
        /// Requested world
        to: WorldId,
    },

    /// The target world's valuation contradicts the justifying observation.
    #[error("observation {proposition}={observed} contradicts world '{world}' for agent '{agent}'")]
    InconsistentObservation {
        /// The agent id
        agent: AgentId,
        /// Requested world
        world: WorldId,
        /// Observed proposition
        proposition: String,
        /// Observed value
        observed: bool,
    },

    /// Model lookup failure.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
