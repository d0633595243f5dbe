//! Planning problem shared by skills.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An object or location the planner reasons about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PddlEntity {
    /// Unique name.
    pub name: String,

    /// Type name in the domain, e.g. `movable_entity_type`.
    pub entity_type: String,
}

impl PddlEntity {
    /// Creates an entity.
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
        }
    }
}

/// A planning problem: the domain entities of the current task.
///
/// Skills receive it behind an [`Arc`](std::sync::Arc) and only read it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PddlProblem {
    entities: HashMap<String, PddlEntity>,
}

impl PddlProblem {
    /// Builds a problem from its entities. A later entity replaces an earlier one of the same name.
    pub fn new(entities: impl IntoIterator<Item = PddlEntity>) -> Self {
        Self {
            entities: entities.into_iter().map(|e| (e.name.clone(), e)).collect(),
        }
    }

    /// Looks up an entity by name.
    pub fn entity(&self, name: &str) -> Option<&PddlEntity> {
        self.entities.get(name)
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the problem has no entity.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities sorted by name.
    ///
    /// The position of an entity in this list is its index in skill arguments
    /// and observation encodings.
    pub fn ordered_entities(&self) -> Vec<PddlEntity> {
        let mut entities: Vec<_> = self.entities.values().cloned().collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        entities
    }
}
