//! Frame properties of accessibility relations.
//!
//! The engine never hard-codes a modal system. Relations are arbitrary, and
//! a rule set that relies on, say, S5 reasoning can declare it; the declared
//! system is then checked against the model's relations at load time.
//!
//! | Property | Correspondence axiom | Condition on R |
//! |----------|----------------------|----------------|
//! | Reflexive | T: `[]p -> p` | every w: wRw |
//! | Serial | D: `[]p -> <>p` | every w has some v with wRv |
//! | Symmetric | B: `p -> []<>p` | wRv implies vRw |
//! | Transitive | 4: `[]p -> [][]p` | wRv, vRu implies wRu |
//! | Euclidean | 5: `<>p -> []<>p` | wRv, wRu implies vRu |

use modal_logic::Modality;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{KripkeModel, WorldId};

/// A first-order condition on one accessibility relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameProperty {
    Reflexive,
    Serial,
    Symmetric,
    Transitive,
    Euclidean,
}

impl FrameProperty {
    /// The modal axiom this property corresponds to.
    pub fn axiom(&self) -> &'static str {
        match self {
            Self::Reflexive => "T: []p -> p",
            Self::Serial => "D: []p -> <>p",
            Self::Symmetric => "B: p -> []<>p",
            Self::Transitive => "4: []p -> [][]p",
            Self::Euclidean => "5: <>p -> []<>p",
        }
    }

    /// Checks the property on `modality`'s relation over all worlds of `model`.
    pub fn holds(&self, model: &KripkeModel, modality: &Modality) -> bool {
        let successors = |w: &WorldId| successors_of(model, modality, w);
        let related = |a: &WorldId, b: &WorldId| successors_of(model, modality, a).contains(&b);

        match self {
            Self::Reflexive => model.worlds().all(|w| related(w, w)),
            Self::Serial => model.worlds().all(|w| !successors(w).is_empty()),
            Self::Symmetric => model.edges(modality).all(|(a, b)| related(b, a)),
            Self::Transitive => model
                .edges(modality)
                .all(|(a, b)| successors(b).into_iter().all(|c| related(a, c))),
            Self::Euclidean => model.worlds().all(|w| {
                let next = successors(w);
                next.iter().all(|&v| next.iter().all(|&u| related(v, u)))
            }),
        }
    }
}

fn successors_of<'a>(
    model: &'a KripkeModel,
    modality: &Modality,
    world: &WorldId,
) -> Vec<&'a WorldId> {
    model
        .successors(modality, world)
        .map(|set| set.iter().collect())
        .unwrap_or_default()
}

impl fmt::Display for FrameProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reflexive => "reflexive",
            Self::Serial => "serial",
            Self::Symmetric => "symmetric",
            Self::Transitive => "transitive",
            Self::Euclidean => "euclidean",
        };
        f.write_str(name)
    }
}

/// Named normal modal systems and the frame properties they require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModalSystem {
    /// No frame conditions.
    K,
    /// Serial (deontic).
    D,
    /// Reflexive.
    T,
    /// Reflexive and transitive.
    S4,
    /// Equivalence relations.
    S5,
    /// Serial, transitive and euclidean (doxastic).
    KD45,
}

impl ModalSystem {
    pub fn properties(&self) -> &'static [FrameProperty] {
        use FrameProperty::*;
        match self {
            Self::K => &[],
            Self::D => &[Serial],
            Self::T => &[Reflexive],
            Self::S4 => &[Reflexive, Transitive],
            Self::S5 => &[Reflexive, Symmetric, Transitive],
            Self::KD45 => &[Serial, Transitive, Euclidean],
        }
    }

    /// Properties required by this system that `modality` fails.
    pub fn violations(&self, model: &KripkeModel, modality: &Modality) -> Vec<FrameProperty> {
        self.properties()
            .iter()
            .copied()
            .filter(|p| !p.holds(model, modality))
            .collect()
    }
}

impl fmt::Display for ModalSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
