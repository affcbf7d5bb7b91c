//! Per-agent belief tracking over a Kripke model.
//!
//! Each agent believes it is at one world and reasons along one modality.
//! Moving to a new world is a belief transition: it must follow an
//! accessibility edge, must not contradict the observation that justified
//! it, and is recorded in an append-only log.

use std::collections::BTreeMap;
use std::fmt;

use modal_logic::{Formula, Modality};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{BeliefError, EvalError, ModelError};
use crate::evaluator::evaluate;
use crate::model::{KripkeModel, WorldId};

/// Agent identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What justified a belief transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    /// A sensor reading of one proposition. Checked against the new world.
    Reading { proposition: String, value: bool },
    /// Free-form justification. Never checked.
    Report(String),
}

impl Observation {
    pub fn reading(proposition: impl Into<String>, value: bool) -> Self {
        Self::Reading {
            proposition: proposition.into(),
            value,
        }
    }

    pub fn report(text: impl Into<String>) -> Self {
        Self::Report(text.into())
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reading { proposition, value } => write!(f, "{}={}", proposition, value),
            Self::Report(text) => f.write_str(text),
        }
    }
}

/// One accepted transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefEntry {
    pub observation: Observation,
    /// World moved to.
    pub world: WorldId,
    /// Model version at the time of the move.
    pub model_version: u64,
}

/// An agent's current belief and its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefState {
    agent: AgentId,
    modality: Modality,
    current: WorldId,
    log: Vec<BeliefEntry>,
}

impl BeliefState {
    pub fn agent(&self) -> &AgentId {
        &self.agent
    }

    pub fn modality(&self) -> &Modality {
        &self.modality
    }

    pub fn current(&self) -> &WorldId {
        &self.current
    }

    /// Accepted transitions, oldest first.
    pub fn log(&self) -> &[BeliefEntry] {
        &self.log
    }
}

/// Belief states of all registered agents.
///
/// The store borrows the model for each operation and never mutates it.
///
/// # Example
///
/// ```rust
/// use modal_kripke::{AgentId, BeliefStore, KripkeModel, Observation, Valuation};
///
/// let mut model = KripkeModel::new();
/// model.add_world("w0", Valuation::new())?;
/// model.add_world("w1", Valuation::from([("rf_fault".to_string(), true)]))?;
/// model.add_accessibility("RF", "w0", "w1")?;
///
/// let mut store = BeliefStore::new();
/// store.register("RF_Agent", "RF", "w0", &model).unwrap();
///
/// let agent = AgentId::new("RF_Agent");
/// store
///     .transition(&agent, "w1", Observation::reading("rf_fault", true), &model)
///     .unwrap();
/// assert_eq!(store.current_world(&agent).unwrap().as_str(), "w1");
/// # Ok::<(), modal_kripke::ModelError>(())
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct BeliefStore {
    agents: BTreeMap<AgentId, BeliefState>,
}

impl BeliefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an agent reasoning along `modality`, starting at `start`.
    ///
    /// # Errors
    ///
    /// - [`BeliefError::DuplicateAgent`] if the agent is already registered
    /// - [`BeliefError::Model`] if `start` is not a world of `model`
    pub fn register(
        &mut self,
        agent: impl Into<AgentId>,
        modality: impl Into<Modality>,
        start: impl Into<WorldId>,
        model: &KripkeModel,
    ) -> Result<(), BeliefError> {
        let (agent, modality, start) = (agent.into(), modality.into(), start.into());
        if self.agents.contains_key(&agent) {
            return Err(BeliefError::DuplicateAgent { agent });
        }
        if !model.contains_world(&start) {
            return Err(ModelError::UnknownWorld { world: start }.into());
        }
        info!(%agent, %modality, world = %start, "agent registered");
        self.agents.insert(
            agent.clone(),
            BeliefState {
                agent,
                modality,
                current: start,
                log: Vec::new(),
            },
        );
        Ok(())
    }

    /// Moves `agent` to `new_world`, justified by `observation`.
    ///
    /// # Arguments
    ///
    /// * `agent` - The registered agent
    /// * `new_world` - Target world; must be accessible from the current one
    /// * `observation` - The justification, recorded in the log
    /// * `model` - The model the move is checked against
    ///
    /// # Errors
    ///
    /// - [`BeliefError::UnknownAgent`] if the agent is not registered
    /// - [`BeliefError::InaccessibleWorld`] if there is no edge to `new_world`
    /// - [`BeliefError::InconsistentObservation`] if a reading is false at `new_world`
    ///
    /// A reading of a proposition the target world leaves undefined is
    /// accepted.
    pub fn transition(
        &mut self,
        agent: &AgentId,
        new_world: impl Into<WorldId>,
        observation: Observation,
        model: &KripkeModel,
    ) -> Result<&BeliefEntry, BeliefError> {
        let new_world = new_world.into();
        let state = self
            .agents
            .get_mut(agent)
            .ok_or_else(|| BeliefError::UnknownAgent {
                agent: agent.clone(),
            })?;

        let accessible = model.successors(&state.modality, &state.current)?;
        if !accessible.contains(&new_world) {
            warn!(
                %agent,
                modality = %state.modality,
                from = %state.current,
                to = %new_world,
                "belief transition refused: world not accessible"
            );
            return Err(BeliefError::InaccessibleWorld {
                agent: agent.clone(),
                modality: state.modality.clone(),
                from: state.current.clone(),
                to: new_world,
            });
        }

        if let Observation::Reading { proposition, value } = &observation {
            let literal = if *value {
                Formula::atom(proposition.as_str())
            } else {
                Formula::not(Formula::atom(proposition.as_str()))
            };
            match evaluate(&literal, &new_world, model) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(
                        %agent,
                        world = %new_world,
                        %observation,
                        "belief transition refused: observation contradicts world"
                    );
                    return Err(BeliefError::InconsistentObservation {
                        agent: agent.clone(),
                        world: new_world,
                        proposition: proposition.clone(),
                        observed: *value,
                    });
                }
                Err(EvalError::UndefinedProposition { .. }) => {
                    debug!(
                        %agent,
                        world = %new_world,
                        %observation,
                        "reading undefined at target world"
                    );
                }
                Err(EvalError::UnknownWorld { world }) => {
                    return Err(ModelError::UnknownWorld { world }.into());
                }
            }
        }

        info!(%agent, from = %state.current, to = %new_world, %observation, "belief transition");
        state.current = new_world.clone();
        state.log.push(BeliefEntry {
            observation,
            world: new_world,
            model_version: model.version(),
        });
        Ok(&state.log[state.log.len() - 1])
    }

    /// Full state of one agent.
    pub fn state(&self, agent: &AgentId) -> Result<&BeliefState, BeliefError> {
        self.agents.get(agent).ok_or_else(|| BeliefError::UnknownAgent {
            agent: agent.clone(),
        })
    }

    pub fn current_world(&self, agent: &AgentId) -> Result<&WorldId, BeliefError> {
        self.state(agent).map(BeliefState::current)
    }

    pub fn modality(&self, agent: &AgentId) -> Result<&Modality, BeliefError> {
        self.state(agent).map(BeliefState::modality)
    }

    pub fn log(&self, agent: &AgentId) -> Result<&[BeliefEntry], BeliefError> {
        self.state(agent).map(BeliefState::log)
    }

    /// Registered agents in sorted order.
    pub fn agents(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.keys()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
