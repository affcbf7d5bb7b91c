//! Thread-safe engine handle.

use std::sync::Arc;

use modal_kripke::{evaluate, AgentId, Assumptions, BeliefEntry, KripkeModel, Observation, WorldId};
use modal_logic::parse;
use parking_lot::RwLock;

use crate::{
    engine::{judge, Engine},
    verdict::VerdictRecord,
    Result,
};

/// A cloneable handle to one [`Engine`] shared between threads.
///
/// Admission holds the read lock only long enough to take a model snapshot
/// and the agent's world; evaluation then runs unlocked, so readers never
/// wait on each other and writers never wait on a slow admission. A verdict
/// always reflects one consistent model version, reported in the record.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<RwLock<Engine>>,
}

impl SharedEngine {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn admit(&self, candidate_text: &str, agent: &AgentId) -> Result<VerdictRecord> {
        self.admit_assuming(candidate_text, agent, &Assumptions::new())
    }

    pub fn admit_assuming(
        &self,
        candidate_text: &str,
        agent: &AgentId,
        pending: &Assumptions,
    ) -> Result<VerdictRecord> {
        let (model, guardrail, world) = {
            let engine = self.inner.read();
            let world = engine.current_world(agent)?.clone();
            (engine.snapshot(), engine.guardrail(), world)
        };
        judge(&guardrail, candidate_text, world, &model, pending)
    }

    pub fn observe(&self, agent: &AgentId, proposition: &str, value: bool) -> Result<()> {
        self.inner.write().observe(agent, proposition, value)
    }

    pub fn transition(
        &self,
        agent: &AgentId,
        world: impl Into<WorldId>,
        observation: Observation,
    ) -> Result<BeliefEntry> {
        self.inner.write().transition(agent, world, observation)
    }

    /// Evaluates against the current snapshot, bypassing the engine cache.
    pub fn evaluate(&self, text: &str, world: impl Into<WorldId>) -> Result<bool> {
        let formula = parse(text)?;
        let model = self.snapshot();
        Ok(evaluate(&formula, &world.into(), &model)?)
    }

    pub fn snapshot(&self) -> Arc<KripkeModel> {
        self.inner.read().snapshot()
    }

    /// Runs `f` with shared access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&Engine) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<Engine> for SharedEngine {
    fn from(engine: Engine) -> Self {
        Self::new(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;
    use std::thread;

    fn shared() -> SharedEngine {
        let config = EngineConfig::new()
            .with_world("w0", [("p", true), ("q", false)])
            .with_agent("A", "default", "w0")
            .with_rule("not_both", "~(p & q)");
        SharedEngine::new(Engine::new(config).unwrap())
    }

    #[test]
    fn test_clones_share_state() {
        let engine = shared();
        let other = engine.clone();
        let agent = AgentId::new("A");
        other.observe(&agent, "q", true).unwrap();
        let verdict = engine.admit("p", &agent).unwrap();
        assert_eq!(verdict.violated_rule.as_deref(), Some("not_both"));
    }

    #[test]
    fn test_concurrent_admissions_see_consistent_versions() {
        let engine = shared();
        let agent = AgentId::new("A");
        let start = engine.snapshot().version();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let engine = engine.clone();
                let agent = agent.clone();
                thread::spawn(move || {
                    (0..50)
                        .map(|_| engine.admit("p", &agent).unwrap().model_version)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for i in 0..20 {
            engine.observe(&agent, "r", i % 2 == 0).unwrap();
        }

        let end = engine.snapshot().version();
        for reader in readers {
            for version in reader.join().unwrap() {
                assert!(version >= start && version <= end);
            }
        }
        assert_eq!(end, start + 20);
    }

    #[test]
    fn test_evaluate_and_with() {
        let engine = shared();
        assert!(engine.evaluate("p & ~q", "w0").unwrap());
        assert_eq!(engine.with(|e| e.rules().len()), 1);
    }
}
