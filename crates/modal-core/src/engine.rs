//! The Modal Guard engine facade.
//!
//! [`Engine`] owns everything one simulation needs: the Kripke model, the
//! expert rule set, the agents' belief states and a caching evaluator. There
//! is no global state; independent engines never interfere.

use std::sync::Arc;

use modal_guardrail::{outcomes, Guardrail, RuleOutcome, RuleSet, RuleViolation};
use modal_kripke::{
    AgentId, Assumptions, BeliefEntry, BeliefStore, CacheStats, Evaluator, KripkeModel,
    Observation, WorldId,
};
use modal_logic::{parse, Modality};
use tracing::{debug, info, warn};

use crate::{config::EngineConfig, error::EngineError, verdict::VerdictRecord, Result};

/// The Modal Guard engine.
///
/// # Lifecycle
///
/// 1. [`Engine::new`] builds and validates everything from an
///    [`EngineConfig`]. Every load-time problem is fatal.
/// 2. Each tick the orchestration layer feeds readings through
///    [`observe`](Engine::observe), asks for verdicts with
///    [`admit`](Engine::admit) and moves agents with
///    [`transition`](Engine::transition).
///
/// # Example
///
/// ```rust
/// use modal_core::{Engine, EngineConfig};
/// use modal_kripke::AgentId;
///
/// let config = EngineConfig::new()
///     .with_world("w0", [("cooling_fault_reported", true), ("klystron_fault_reported", false)])
///     .with_agent("RF_Agent", "RF", "w0")
///     .with_rule("distinct_faults", "~(cooling_fault_reported & klystron_fault_reported)");
/// let mut engine = Engine::new(config)?;
/// let agent = AgentId::new("RF_Agent");
///
/// assert!(engine.admit("cooling_fault_reported", &agent)?.accepted);
///
/// engine.observe(&agent, "klystron_fault_reported", true)?;
/// let verdict = engine.admit("cooling_fault_reported", &agent)?;
/// assert_eq!(verdict.violated_rule.as_deref(), Some("distinct_faults"));
/// # Ok::<(), modal_core::EngineError>(())
/// ```
#[derive(Debug)]
pub struct Engine {
    /// Configuration the engine was built from.
    config: EngineConfig,

    /// Current model; cloned on write while snapshots are outstanding.
    model: Arc<KripkeModel>,

    /// Rule set and admission settings.
    guardrail: Arc<Guardrail>,

    /// Per-agent belief state.
    beliefs: BeliefStore,

    /// Cached evaluator for direct queries.
    evaluator: Evaluator,
}

impl Engine {
    /// Builds an engine from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a world is declared twice or an edge or agent names an unknown world
    /// - any rule fails to parse (all failures are listed)
    /// - an agent id is repeated
    /// - a declared modal system is not satisfied by some relation
    /// - strict valuation is on and a rule proposition is undefined somewhere
    pub fn new(config: EngineConfig) -> Result<Self> {
        let mut model = KripkeModel::new();
        for world in &config.worlds {
            model.add_world(world.id.as_str(), world.valuation.clone())?;
        }
        for edge in &config.relations {
            model.add_accessibility(edge.modality.as_str(), edge.from.as_str(), edge.to.as_str())?;
        }

        let rules = RuleSet::load(
            config
                .rules
                .iter()
                .map(|rule| (rule.name.as_str(), rule.formula.as_str())),
        )?;

        let mut beliefs = BeliefStore::new();
        for agent in &config.agents {
            beliefs.register(
                agent.id.as_str(),
                agent.modality.as_str(),
                agent.start_world.as_str(),
                &model,
            )?;
        }

        verify_frames(&config, &model, &rules, &beliefs)?;
        verify_totality(&config, &model, &rules)?;

        info!(
            worlds = model.world_count(),
            edges = model.edge_count(),
            rules = rules.len(),
            agents = beliefs.len(),
            "engine initialized"
        );

        let guardrail = Guardrail::with_config(rules, config.guardrail.clone());
        let evaluator = Evaluator::with_config(config.evaluator.clone());
        Ok(Self {
            config,
            model: Arc::new(model),
            guardrail: Arc::new(guardrail),
            beliefs,
            evaluator,
        })
    }

    /// Decides whether `candidate_text` may be adopted by `agent`, at the
    /// agent's current world.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Syntax`] if the text does not parse
    /// - [`EngineError::Belief`] if the agent is unknown
    /// - [`EngineError::Eval`] if the candidate or a rule cannot be evaluated
    pub fn admit(&self, candidate_text: &str, agent: &AgentId) -> Result<VerdictRecord> {
        self.admit_assuming(candidate_text, agent, &Assumptions::new())
    }

    /// Like [`admit`](Self::admit), with pending readings layered over the
    /// model. Nothing is recorded.
    pub fn admit_assuming(
        &self,
        candidate_text: &str,
        agent: &AgentId,
        pending: &Assumptions,
    ) -> Result<VerdictRecord> {
        let world = self.beliefs.current_world(agent)?.clone();
        judge(&self.guardrail, candidate_text, world, &self.model, pending)
    }

    /// Records a reading at the agent's current world.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Belief`] if the agent is unknown
    /// - [`EngineError::Model`] if `proposition` is not an identifier; nothing
    ///   is recorded
    pub fn observe(&mut self, agent: &AgentId, proposition: &str, value: bool) -> Result<()> {
        let world = self.beliefs.current_world(agent)?.clone();
        let previous = Arc::make_mut(&mut self.model).set_proposition(&world, proposition, value)?;
        debug!(%agent, %world, proposition, value, ?previous, "observation recorded");
        Ok(())
    }

    /// Moves `agent` to `world`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Belief`] when the move is refused; the agent stays put.
    pub fn transition(
        &mut self,
        agent: &AgentId,
        world: impl Into<WorldId>,
        observation: Observation,
    ) -> Result<BeliefEntry> {
        let entry = self
            .beliefs
            .transition(agent, world, observation, &self.model)?
            .clone();
        Ok(entry)
    }

    /// Evaluates `text` at `world` using the engine's cache.
    pub fn evaluate(&mut self, text: &str, world: impl Into<WorldId>) -> Result<bool> {
        let formula = parse(text)?;
        let world = world.into();
        Ok(self.evaluator.evaluate(&formula, &world, &self.model)?)
    }

    /// Every violated rule at `world`.
    pub fn check_all(&self, world: impl Into<WorldId>) -> Result<Vec<RuleViolation>> {
        Ok(self.guardrail.check_all(&world.into(), &self.model)?)
    }

    /// Each rule's value at `world`, errors included.
    pub fn rule_outcomes(&self, world: &WorldId) -> Vec<RuleOutcome<'_>> {
        outcomes(self.guardrail.rules(), world, &self.model)
    }

    /// A read-only handle to the current model.
    ///
    /// The handle stays valid and unchanged while the engine keeps mutating;
    /// the engine copies the model on its next write instead.
    pub fn snapshot(&self) -> Arc<KripkeModel> {
        Arc::clone(&self.model)
    }

    pub fn model(&self) -> &KripkeModel {
        &self.model
    }

    pub fn rules(&self) -> &RuleSet {
        self.guardrail.rules()
    }

    pub(crate) fn guardrail(&self) -> Arc<Guardrail> {
        Arc::clone(&self.guardrail)
    }

    pub fn beliefs(&self) -> &BeliefStore {
        &self.beliefs
    }

    pub fn current_world(&self, agent: &AgentId) -> Result<&WorldId> {
        Ok(self.beliefs.current_world(agent)?)
    }

    /// Registered agents in sorted order.
    pub fn agents(&self) -> impl Iterator<Item = &AgentId> {
        self.beliefs.agents()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.evaluator.stats()
    }
}

/// Parses and admits a candidate against a fixed model.
pub(crate) fn judge(
    guardrail: &Guardrail,
    candidate_text: &str,
    world: WorldId,
    model: &KripkeModel,
    pending: &Assumptions,
) -> Result<VerdictRecord> {
    let candidate = parse(candidate_text)?;
    let admission = guardrail.admit_assuming(&candidate, &world, model, pending)?;
    Ok(VerdictRecord::new(
        &admission,
        &candidate,
        world,
        model.version(),
        guardrail.rules().digest_hex(),
    ))
}

fn verify_frames(
    config: &EngineConfig,
    model: &KripkeModel,
    rules: &RuleSet,
    beliefs: &BeliefStore,
) -> Result<()> {
    let Some(system) = config.global.assumed_system else {
        return Ok(());
    };

    let mut modalities: Vec<Modality> = model.modalities().cloned().collect();
    modalities.extend(rules.modalities().into_iter().cloned());
    for agent in beliefs.agents() {
        modalities.push(beliefs.modality(agent)?.clone());
    }
    modalities.sort();
    modalities.dedup();

    for modality in modalities {
        let failed = system.violations(model, &modality);
        if !failed.is_empty() {
            return Err(EngineError::FrameViolation {
                modality,
                system,
                failed,
            });
        }
    }
    debug!(%system, "frame conditions verified");
    Ok(())
}

fn verify_totality(config: &EngineConfig, model: &KripkeModel, rules: &RuleSet) -> Result<()> {
    let missing = model.undefined_propositions(rules.atoms());
    if missing.is_empty() {
        return Ok(());
    }
    if config.global.strict_valuation {
        return Err(EngineError::IncompleteValuation { missing });
    }
    for (world, proposition) in &missing {
        warn!(
            %world,
            %proposition,
            "rule proposition undefined; dependent rules cannot be evaluated there"
        );
    }
    Ok(())
}
