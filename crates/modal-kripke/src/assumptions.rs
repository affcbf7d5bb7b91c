//! Hypothetical proposition overrides for trial evaluation.
//!
//! An [`Assumptions`] overlay answers "what if `p` held at `w`?" without
//! touching the live model. The evaluator consults the overlay before the
//! model's valuation; the model itself is only ever borrowed immutably.

use std::collections::BTreeMap;

use crate::model::WorldId;

/// Per-world proposition overrides layered over a model's valuation.
///
/// # Example
///
/// ```rust
/// use modal_kripke::Assumptions;
///
/// let overlay = Assumptions::new().with("w0", "cooling_fault_reported", true);
/// assert_eq!(overlay.get(&"w0".into(), "cooling_fault_reported"), Some(true));
/// assert_eq!(overlay.get(&"w1".into(), "cooling_fault_reported"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assumptions {
    overrides: BTreeMap<WorldId, BTreeMap<String, bool>>,
}

impl Assumptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an override, replacing any earlier one for the same pair.
    pub fn assume(&mut self, world: impl Into<WorldId>, name: impl Into<String>, value: bool) {
        self.overrides
            .entry(world.into())
            .or_default()
            .insert(name.into(), value);
    }

    /// Builder form of [`assume`](Self::assume).
    #[must_use]
    pub fn with(mut self, world: impl Into<WorldId>, name: impl Into<String>, value: bool) -> Self {
        self.assume(world, name, value);
        self
    }

    /// The assumed value of `name` at `world`, if any.
    pub fn get(&self, world: &WorldId, name: &str) -> Option<bool> {
        self.overrides.get(world).and_then(|props| props.get(name)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.values().all(BTreeMap::is_empty)
    }

    /// Number of `(world, proposition)` overrides.
    pub fn len(&self) -> usize {
        self.overrides.values().map(BTreeMap::len).sum()
    }

    /// Overrides in `(world, proposition)` order.
    pub fn iter(&self) -> impl Iterator<Item = (&WorldId, &str, bool)> {
        self.overrides.iter().flat_map(|(world, props)| {
            props
                .iter()
                .map(move |(name, value)| (world, name.as_str(), *value))
        })
    }
}
