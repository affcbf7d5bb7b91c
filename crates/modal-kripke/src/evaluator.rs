//! Kripke-semantics evaluation with a version-stamped result cache.
//!
//! # Semantics
//!
//! - `p` looks up the valuation at the current world. An unassigned
//!   proposition is an [`EvalError::UndefinedProposition`], never `false`.
//! - `[m]φ` holds iff `φ` holds at every `m`-successor (vacuously true).
//! - `<m>φ` holds iff `φ` holds at some `m`-successor (vacuously false).
//! - `φ -> ψ` is `~φ | ψ`; `φ <-> ψ` evaluates both sides.
//!
//! `&`, `|`, `->` and both quantifiers are conservatively lazy: once an
//! operand settles the result it is returned, even if an earlier operand
//! failed. An error surfaces only when no operand was decisive. Successors
//! are visited in sorted world order, so results and errors are
//! deterministic.
//!
//! # Caching
//!
//! [`Evaluator`] memoizes `(formula, world)` results for modal sub-formulas
//! and for the roots it is asked about. The cache is stamped with the model's
//! `(id, version)`; any difference empties it before the next lookup, so a
//! result computed against an older model is never served. Errors are never
//! cached.

use std::collections::HashMap;

use modal_logic::Formula;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::assumptions::Assumptions;
use crate::error::EvalError;
use crate::model::{KripkeModel, WorldId};

/// Evaluator settings.
///
/// # Example
///
/// ```rust
/// use modal_kripke::EvaluatorConfig;
///
/// let config = EvaluatorConfig::new().with_max_cache_entries(512);
/// assert!(config.cache_enabled);
/// assert_eq!(config.max_cache_entries, 512);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Memoize modal sub-formula results.
    pub cache_enabled: bool,
    /// The cache is emptied once it would grow past this many entries.
    pub max_cache_entries: usize,
}

impl EvaluatorConfig {
    /// Caching on, 10 000 entries.
    pub fn new() -> Self {
        Self {
            cache_enabled: true,
            max_cache_entries: 10_000,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_max_cache_entries(mut self, max: usize) -> Self {
        self.max_cache_entries = max;
        self
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache counters since the evaluator was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Times the cache was emptied because the model changed.
    pub invalidations: u64,
    /// Entries currently held.
    pub entries: usize,
}

#[derive(Debug, Default)]
struct Memo {
    stamp: Option<(Uuid, u64)>,
    results: HashMap<WorldId, HashMap<Formula, bool>>,
    stats: CacheStats,
    capacity: usize,
}

impl Memo {
    fn sync(&mut self, model: &KripkeModel) {
        let stamp = (model.id(), model.version());
        if self.stamp == Some(stamp) {
            return;
        }
        if self.stamp.is_some() {
            debug!(
                model = %stamp.0,
                version = stamp.1,
                dropped = self.stats.entries,
                "evaluator cache invalidated"
            );
            self.stats.invalidations += 1;
        }
        self.clear();
        self.stamp = Some(stamp);
    }

    fn clear(&mut self) {
        self.results.clear();
        self.stats.entries = 0;
    }

    fn lookup(&mut self, formula: &Formula, world: &WorldId) -> Option<bool> {
        let hit = self
            .results
            .get(world)
            .and_then(|by_formula| by_formula.get(formula))
            .copied();
        match hit {
            Some(_) => self.stats.hits += 1,
            None => self.stats.misses += 1,
        }
        hit
    }

    fn store(&mut self, formula: &Formula, world: &WorldId, value: bool) {
        if self.stats.entries >= self.capacity {
            debug!(capacity = self.capacity, "evaluator cache full, clearing");
            self.clear();
        }
        let previous = self
            .results
            .entry(world.clone())
            .or_default()
            .insert(formula.clone(), value);
        if previous.is_none() {
            self.stats.entries += 1;
        }
    }
}

/// Caching formula evaluator.
///
/// One evaluator may be used against several models; switching models (or
/// mutating the current one) simply invalidates the cache.
///
/// # Example
///
/// ```rust
/// use modal_kripke::{Evaluator, KripkeModel, Valuation};
/// use modal_logic::parse;
///
/// let mut model = KripkeModel::new();
/// model.add_world("w1", Valuation::from([("pressure_high".to_string(), true)]))?;
/// model.add_world("w2", Valuation::from([("valve_open".to_string(), false)]))?;
/// model.add_accessibility("RF", "w1", "w2")?;
///
/// let rule = parse("pressure_high -> diamond[RF](valve_open)").unwrap();
/// let mut evaluator = Evaluator::new();
/// assert_eq!(evaluator.evaluate(&rule, &"w1".into(), &model), Ok(false));
///
/// model.set_proposition(&"w2".into(), "valve_open", true)?;
/// assert_eq!(evaluator.evaluate(&rule, &"w1".into(), &model), Ok(true));
/// # Ok::<(), modal_kripke::ModelError>(())
/// ```
#[derive(Debug)]
pub struct Evaluator {
    config: EvaluatorConfig,
    memo: Memo,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Creates an evaluator with [`EvaluatorConfig::new`].
    pub fn new() -> Self {
        Self::with_config(EvaluatorConfig::new())
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        let memo = Memo {
            capacity: config.max_cache_entries,
            ..Memo::default()
        };
        Self { config, memo }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn stats(&self) -> CacheStats {
        self.memo.stats
    }

    /// Drops every cached result. Counters are kept.
    pub fn clear_cache(&mut self) {
        self.memo.clear();
    }

    /// Evaluates `formula` at `world`.
    ///
    /// # Arguments
    ///
    /// * `formula` - The formula to evaluate
    /// * `world` - World at which it is evaluated
    /// * `model` - The model providing valuations and accessibility
    ///
    /// # Errors
    ///
    /// - [`EvalError::UnknownWorld`] if `world` is not in the model
    /// - [`EvalError::UndefinedProposition`] if a needed proposition is unassigned
    pub fn evaluate(
        &mut self,
        formula: &Formula,
        world: &WorldId,
        model: &KripkeModel,
    ) -> Result<bool, EvalError> {
        require_world(model, world)?;
        if !self.config.cache_enabled || self.config.max_cache_entries == 0 {
            return Walk::new(model, None, None).eval(formula, world);
        }

        self.memo.sync(model);
        if formula.is_modal() {
            return Walk::new(model, None, Some(&mut self.memo)).eval(formula, world);
        }
        if let Some(hit) = self.memo.lookup(formula, world) {
            return Ok(hit);
        }
        let value = Walk::new(model, None, Some(&mut self.memo)).eval(formula, world)?;
        self.memo.store(formula, world, value);
        Ok(value)
    }

    /// Evaluates under an [`Assumptions`] overlay. Never touches the cache.
    pub fn evaluate_with(
        &self,
        formula: &Formula,
        world: &WorldId,
        model: &KripkeModel,
        assumptions: &Assumptions,
    ) -> Result<bool, EvalError> {
        evaluate_with(formula, world, model, assumptions)
    }
}

/// Evaluates `formula` at `world` without caching.
pub fn evaluate(
    formula: &Formula,
    world: &WorldId,
    model: &KripkeModel,
) -> Result<bool, EvalError> {
    require_world(model, world)?;
    Walk::new(model, None, None).eval(formula, world)
}

/// Evaluates `formula` at `world` with `assumptions` taking precedence over
/// the model's valuation. The model is only read.
pub fn evaluate_with(
    formula: &Formula,
    world: &WorldId,
    model: &KripkeModel,
    assumptions: &Assumptions,
) -> Result<bool, EvalError> {
    require_world(model, world)?;
    Walk::new(model, Some(assumptions), None).eval(formula, world)
}

fn require_world(model: &KripkeModel, world: &WorldId) -> Result<(), EvalError> {
    if model.contains_world(world) {
        Ok(())
    } else {
        Err(EvalError::UnknownWorld {
            world: world.clone(),
        })
    }
}

/// One recursive evaluation pass.
struct Walk<'a> {
    model: &'a KripkeModel,
    overlay: Option<&'a Assumptions>,
    memo: Option<&'a mut Memo>,
}

impl<'a> Walk<'a> {
    fn new(
        model: &'a KripkeModel,
        overlay: Option<&'a Assumptions>,
        memo: Option<&'a mut Memo>,
    ) -> Self {
        Self { model, overlay, memo }
    }

    fn eval(&mut self, formula: &Formula, world: &WorldId) -> Result<bool, EvalError> {
        if !formula.is_modal() {
            return self.compute(formula, world);
        }
        if let Some(hit) = self.memo.as_mut().and_then(|memo| memo.lookup(formula, world)) {
            return Ok(hit);
        }
        let value = self.compute(formula, world)?;
        if let Some(memo) = self.memo.as_mut() {
            memo.store(formula, world, value);
        }
        Ok(value)
    }

    fn compute(&mut self, formula: &Formula, world: &WorldId) -> Result<bool, EvalError> {
        match formula {
            Formula::True => Ok(true),
            Formula::False => Ok(false),
            Formula::Atom(name) => self.lookup(name, world),
            Formula::Not(inner) => Ok(!self.eval(inner, world)?),
            Formula::And(left, right) => {
                self.settle([(&**left, world, false), (&**right, world, false)], false)
            }
            Formula::Or(left, right) => {
                self.settle([(&**left, world, false), (&**right, world, false)], true)
            }
            // ~left | right
            Formula::Implies(left, right) => {
                self.settle([(&**left, world, true), (&**right, world, false)], true)
            }
            Formula::Iff(left, right) => {
                let left = self.eval(left, world)?;
                let right = self.eval(right, world)?;
                Ok(left == right)
            }
            Formula::Box(modality, body) => {
                let model = self.model;
                let next = model
                    .successors(modality, world)
                    .map_err(|_| EvalError::UnknownWorld { world: world.clone() })?;
                self.settle(next.iter().map(|v| (&**body, v, false)), false)
            }
            Formula::Diamond(modality, body) => {
                let model = self.model;
                let next = model
                    .successors(modality, world)
                    .map_err(|_| EvalError::UnknownWorld { world: world.clone() })?;
                self.settle(next.iter().map(|v| (&**body, v, false)), true)
            }
        }
    }

    fn lookup(&self, name: &str, world: &WorldId) -> Result<bool, EvalError> {
        if let Some(value) = self.overlay.and_then(|overlay| overlay.get(world, name)) {
            return Ok(value);
        }
        let value = self
            .model
            .proposition(world, name)
            .map_err(|_| EvalError::UnknownWorld { world: world.clone() })?;
        value.ok_or_else(|| EvalError::UndefinedProposition {
            proposition: name.to_string(),
            world: world.clone(),
        })
    }

    /// Evaluates operands in order and returns `decisive` as soon as one of
    /// them (negated when its flag is set) yields it. Otherwise returns the
    /// first error, or `!decisive` if there was none.
    fn settle<'f, I>(&mut self, operands: I, decisive: bool) -> Result<bool, EvalError>
    where
        I: IntoIterator<Item = (&'f Formula, &'f WorldId, bool)>,
    {
        let mut first_error = None;
        for (formula, world, negate) in operands {
            match self.eval(formula, world) {
                Ok(value) if (value != negate) == decisive => return Ok(decisive),
                Ok(_) => {}
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(!decisive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Valuation;
    use modal_logic::parse;

    fn vals(pairs: &[(&str, bool)]) -> Valuation {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn sample() -> KripkeModel {
        let mut model = KripkeModel::new();
        model.add_world("w0", vals(&[("p", true), ("q", false)])).unwrap();
        model.add_world("w1", vals(&[("p", false), ("q", true)])).unwrap();
        model.add_world("w2", vals(&[("p", true)])).unwrap();
        model.add_world("dead", vals(&[("p", false)])).unwrap();
        model.add_accessibility("m", "w0", "w1").unwrap();
        model.add_accessibility("m", "w0", "w2").unwrap();
        model
    }

    fn eval(text: &str, world: &str, model: &KripkeModel) -> Result<bool, EvalError> {
        evaluate(&parse(text).unwrap(), &world.into(), model)
    }

    #[test]
    fn test_connectives() {
        let model = sample();
        assert_eq!(eval("p & ~q", "w0", &model), Ok(true));
        assert_eq!(eval("p -> q", "w0", &model), Ok(false));
        assert_eq!(eval("q -> p", "w0", &model), Ok(true));
        assert_eq!(eval("p <-> q", "w1", &model), Ok(false));
        assert_eq!(eval("true | false", "w0", &model), Ok(true));
    }

    #[test]
    fn test_quantifiers() {
        let model = sample();
        assert_eq!(eval("[m]p", "w0", &model), Ok(false));
        assert_eq!(eval("<m>p", "w0", &model), Ok(true));
        assert_eq!(eval("[m](p | q)", "w0", &model), Ok(true));
    }

    #[test]
    fn test_vacuous_at_dead_end() {
        let model = sample();
        assert_eq!(eval("[m]false", "dead", &model), Ok(true));
        assert_eq!(eval("<m>true", "dead", &model), Ok(false));
        assert_eq!(eval("[other]false", "w0", &model), Ok(true));
    }

    #[test]
    fn test_undefined_is_an_error() {
        let model = sample();
        assert_eq!(
            eval("r", "w0", &model),
            Err(EvalError::UndefinedProposition {
                proposition: "r".into(),
                world: "w0".into()
            })
        );
        assert!(eval("~r", "w0", &model).is_err());
    }

    #[test]
    fn test_decisive_operand_wins_over_error() {
        let model = sample();
        assert_eq!(eval("r | p", "w0", &model), Ok(true));
        assert_eq!(eval("r & q", "w0", &model), Ok(false));
        assert_eq!(eval("r -> p", "w0", &model), Ok(true));
        assert_eq!(eval("q -> r", "w0", &model), Ok(true));
        assert!(eval("r & p", "w0", &model).is_err());
        // w2 has no q; w1 has q = true
        assert_eq!(eval("<m>q", "w0", &model), Ok(true));
        assert!(eval("[m]q", "w0", &model).is_err());
        assert!(eval("p <-> r", "w0", &model).is_err());
    }

    #[test]
    fn test_unknown_world() {
        let model = sample();
        assert_eq!(
            eval("true", "nowhere", &model),
            Err(EvalError::UnknownWorld {
                world: "nowhere".into()
            })
        );
    }

    #[test]
    fn test_overlay_takes_precedence() {
        let model = sample();
        let formula = parse("[m]p").unwrap();
        let overlay = Assumptions::new().with("w1", "p", true);
        assert_eq!(evaluate_with(&formula, &"w0".into(), &model, &overlay), Ok(true));
        assert_eq!(evaluate(&formula, &"w0".into(), &model), Ok(false));

        let filled = Assumptions::new().with("w0", "r", false);
        assert_eq!(evaluate_with(&parse("~r").unwrap(), &"w0".into(), &model, &filled), Ok(true));
    }

    #[test]
    fn test_cache_hits_and_invalidation() {
        let mut model = sample();
        let formula = parse("<m>q").unwrap();
        let mut evaluator = Evaluator::new();

        assert_eq!(evaluator.evaluate(&formula, &"w0".into(), &model), Ok(true));
        assert_eq!(evaluator.evaluate(&formula, &"w0".into(), &model), Ok(true));
        assert_eq!(evaluator.stats().hits, 1);
        assert_eq!(evaluator.stats().invalidations, 0);

        model.set_proposition(&"w1".into(), "q", false).unwrap();
        model.set_proposition(&"w2".into(), "q", false).unwrap();
        assert_eq!(evaluator.evaluate(&formula, &"w0".into(), &model), Ok(false));
        assert_eq!(evaluator.stats().invalidations, 1);
    }

    #[test]
    fn test_cache_bounded() {
        let model = sample();
        let mut evaluator =
            Evaluator::with_config(EvaluatorConfig::new().with_max_cache_entries(2));
        for text in ["<m>p", "<m>q", "[m]p", "[m](p | q)"] {
            let _ = evaluator.evaluate(&parse(text).unwrap(), &"w0".into(), &model);
            assert!(evaluator.stats().entries <= 2);
        }
    }

    #[test]
    fn test_cache_disabled_matches() {
        let model = sample();
        let formula = parse("[m](p | q) & <m>~p").unwrap();
        let mut cached = Evaluator::new();
        let mut plain = Evaluator::with_config(EvaluatorConfig::new().with_cache(false));
        assert_eq!(
            cached.evaluate(&formula, &"w0".into(), &model),
            plain.evaluate(&formula, &"w0".into(), &model)
        );
        assert_eq!(plain.stats(), CacheStats::default());
    }

    #[test]
    fn test_errors_not_cached() {
        let mut model = sample();
        let formula = parse("[m]q").unwrap();
        let mut evaluator = Evaluator::new();
        assert!(evaluator.evaluate(&formula, &"w0".into(), &model).is_err());
        assert_eq!(evaluator.stats().entries, 0);
        model.set_proposition(&"w2".into(), "q", true).unwrap();
        assert_eq!(evaluator.evaluate(&formula, &"w0".into(), &model), Ok(true));
    }
}
