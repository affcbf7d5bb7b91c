//! Kripke model: worlds, valuations and per-modality accessibility.
//!
//! Accessibility is stored as an explicit adjacency map
//! `modality -> from -> {to}` rather than as references between world
//! objects, so cyclic relations need no shared ownership.
//!
//! ## Versioning
//!
//! Every successful mutation bumps [`KripkeModel::version`]. Together with
//! the per-instance [`KripkeModel::id`] it stamps evaluator caches: a cache
//! built against `(id, version)` is discarded as soon as either differs.
//! Cloning a model assigns the clone a fresh id.
//!
//! All collections are ordered (`BTreeMap`/`BTreeSet`) so iteration, and
//! therefore evaluation order and serialized snapshots, are deterministic.

use modal_logic::{is_identifier, Modality};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ModelError, Result};

/// Opaque world identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(String);

impl WorldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorldId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for WorldId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&WorldId> for WorldId {
    fn from(id: &WorldId) -> Self {
        id.clone()
    }
}

/// Truth assignment at one world. Absent keys are undefined, not false.
pub type Valuation = BTreeMap<String, bool>;

type Adjacency = BTreeMap<WorldId, BTreeSet<WorldId>>;

static NO_SUCCESSORS: BTreeSet<WorldId> = BTreeSet::new();

/// A Kripke model over a finite set of worlds.
///
/// # Example
///
/// ```rust
/// use modal_kripke::{KripkeModel, Valuation};
/// use modal_logic::Modality;
///
/// let mut model = KripkeModel::new();
/// model.add_world("w1", Valuation::from([("pressure_high".to_string(), true)]))?;
/// model.add_world("w2", Valuation::new())?;
/// model.add_accessibility("RF", "w1", "w2")?;
///
/// assert_eq!(model.successors(&Modality::new("RF"), &"w1".into())?.len(), 1);
/// assert!(model.successors(&Modality::new("RF"), &"w2".into())?.is_empty());
/// # Ok::<(), modal_kripke::ModelError>(())
/// ```
#[derive(Debug, Serialize)]
pub struct KripkeModel {
    #[serde(skip)]
    id: Uuid,
    version: u64,
    worlds: BTreeMap<WorldId, Valuation>,
    relations: BTreeMap<Modality, Adjacency>,
}

impl Default for KripkeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for KripkeModel {
    fn clone(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: self.version,
            worlds: self.worlds.clone(),
            relations: self.relations.clone(),
        }
    }
}

impl KripkeModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            version: 0,
            worlds: BTreeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    /// Instance identifier, unique per model value (clones included).
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Registers a world with its initial valuation.
    ///
    /// # Errors
    ///
    /// - [`ModelError::DuplicateWorld`] if the id is already registered
    /// - [`ModelError::InvalidProposition`] if a valuation key is not an
    ///   identifier
    pub fn add_world(&mut self, id: impl Into<WorldId>, valuation: Valuation) -> Result<()> {
        let id = id.into();
        if self.worlds.contains_key(&id) {
            return Err(ModelError::DuplicateWorld { world: id });
        }
        if let Some(name) = valuation.keys().find(|name| !is_identifier(name)) {
            return Err(ModelError::InvalidProposition { name: name.clone() });
        }
        debug!(world = %id, propositions = valuation.len(), "world added");
        self.worlds.insert(id, valuation);
        self.bump();
        Ok(())
    }

    /// Inserts one accessibility edge `from -> to` under `modality`.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownWorld`] if either endpoint is absent.
    pub fn add_accessibility(
        &mut self,
        modality: impl Into<Modality>,
        from: impl Into<WorldId>,
        to: impl Into<WorldId>,
    ) -> Result<()> {
        let (modality, from, to) = (modality.into(), from.into(), to.into());
        self.require(&from)?;
        self.require(&to)?;
        debug!(%modality, %from, %to, "accessibility added");
        self.relations
            .entry(modality)
            .or_default()
            .entry(from)
            .or_default()
            .insert(to);
        self.bump();
        Ok(())
    }

    /// Removes one accessibility edge. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownWorld`] if either endpoint is absent.
    pub fn remove_accessibility(
        &mut self,
        modality: &Modality,
        from: &WorldId,
        to: &WorldId,
    ) -> Result<bool> {
        self.require(from)?;
        self.require(to)?;
        let Some(adjacency) = self.relations.get_mut(modality) else {
            return Ok(false);
        };
        let removed = adjacency
            .get_mut(from)
            .map(|targets| targets.remove(to))
            .unwrap_or(false);
        // keep `modalities()` limited to relations that still have edges
        if adjacency.get(from).is_some_and(BTreeSet::is_empty) {
            adjacency.remove(from);
        }
        if adjacency.is_empty() {
            self.relations.remove(modality);
        }
        if removed {
            debug!(%modality, %from, %to, "accessibility removed");
            self.bump();
        }
        Ok(removed)
    }

    /// Sets one proposition at one world, returning the previous value.
    ///
    /// This is how observations are folded into the model. The version is
    /// bumped even when the value is unchanged.
    ///
    /// # Errors
    ///
    /// - [`ModelError::UnknownWorld`] if the world is absent
    /// - [`ModelError::InvalidProposition`] if `name` is not an identifier
    pub fn set_proposition(
        &mut self,
        world: &WorldId,
        name: impl Into<String>,
        value: bool,
    ) -> Result<Option<bool>> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(ModelError::InvalidProposition { name });
        }
        let valuation = self
            .worlds
            .get_mut(world)
            .ok_or_else(|| ModelError::UnknownWorld {
                world: world.clone(),
            })?;
        debug!(%world, proposition = %name, value, "proposition set");
        let previous = valuation.insert(name, value);
        self.bump();
        Ok(previous)
    }

    /// Worlds accessible from `world` under `modality`.
    ///
    /// An empty set is a meaningful answer: the world has no successors.
    ///
    /// # Errors
    ///
    /// [`ModelError::UnknownWorld`] if `world` is absent.
    pub fn successors(&self, modality: &Modality, world: &WorldId) -> Result<&BTreeSet<WorldId>> {
        self.require(world)?;
        Ok(self
            .relations
            .get(modality)
            .and_then(|adjacency| adjacency.get(world))
            .unwrap_or(&NO_SUCCESSORS))
    }

    /// All worlds reachable from `world` in one or more steps, following
    /// `modality` only or, when `None`, every modality.
    pub fn reachable(
        &self,
        world: &WorldId,
        modality: Option<&Modality>,
    ) -> Result<BTreeSet<WorldId>> {
        self.require(world)?;
        let mut seen = BTreeSet::new();
        let mut frontier = vec![world.clone()];
        while let Some(current) = frontier.pop() {
            for (tag, adjacency) in &self.relations {
                if modality.is_some_and(|m| m != tag) {
                    continue;
                }
                for next in adjacency.get(&current).into_iter().flatten() {
                    if seen.insert(next.clone()) {
                        frontier.push(next.clone());
                    }
                }
            }
        }
        Ok(seen)
    }

    /// Value of `name` at `world`; `None` when undefined.
    pub fn proposition(&self, world: &WorldId, name: &str) -> Result<Option<bool>> {
        Ok(self.require(world)?.get(name).copied())
    }

    /// Full valuation of a world.
    pub fn valuation(&self, world: &WorldId) -> Result<&Valuation> {
        self.require(world)
    }

    pub fn contains_world(&self, world: &WorldId) -> bool {
        self.worlds.contains_key(world)
    }

    /// World ids in sorted order.
    pub fn worlds(&self) -> impl Iterator<Item = &WorldId> {
        self.worlds.keys()
    }

    pub fn world_count(&self) -> usize {
        self.worlds.len()
    }

    /// Modalities with at least one recorded edge set.
    pub fn modalities(&self) -> impl Iterator<Item = &Modality> {
        self.relations.keys()
    }

    /// Edges of one modality in sorted order.
    pub fn edges<'a>(
        &'a self,
        modality: &Modality,
    ) -> impl Iterator<Item = (&'a WorldId, &'a WorldId)> + 'a {
        self.relations
            .get(modality)
            .into_iter()
            .flat_map(|adjacency| {
                adjacency
                    .iter()
                    .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
            })
    }

    /// Total number of edges across all modalities.
    pub fn edge_count(&self) -> usize {
        self.relations
            .values()
            .flat_map(|adjacency| adjacency.values())
            .map(BTreeSet::len)
            .sum()
    }

    /// `(world, proposition)` pairs for which `names` are undefined.
    ///
    /// An empty result means the valuation is total over `names`.
    pub fn undefined_propositions<'a, I>(&self, names: I) -> Vec<(WorldId, String)>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: BTreeSet<&str> = names.into_iter().collect();
        let mut missing = Vec::new();
        for (world, valuation) in &self.worlds {
            for name in &names {
                if !valuation.contains_key(*name) {
                    missing.push((world.clone(), (*name).to_string()));
                }
            }
        }
        missing
    }

    fn require(&self, world: &WorldId) -> Result<&Valuation> {
        self.worlds.get(world).ok_or_else(|| ModelError::UnknownWorld {
            world: world.clone(),
        })
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}
