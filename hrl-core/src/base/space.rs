//! Action and observation spaces.
use crate::error::SkillError;
use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_map, BTreeMap},
    iter::{self, FromIterator},
};

/// A single sub-space of an action or observation space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Space {
    /// Continuous values with the given shape.
    Box {
        /// Shape of the values.
        shape: Vec<usize>,
    },

    /// A single integer out of `n` choices.
    Discrete(usize),
}

impl Space {
    /// Builds a 1-dimensional box space.
    pub fn box1(dim: usize) -> Self {
        Self::Box { shape: vec![dim] }
    }

    /// Number of entries this space occupies in a flattened vector.
    pub fn flat_dim(&self) -> usize {
        match self {
            Self::Box { shape } => shape.iter().product(),
            Self::Discrete(_) => 1,
        }
    }
}

/// Named sub-spaces, iterated in name order.
///
/// The full action vector is the concatenation of the sub-actions in this order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSpace(BTreeMap<String, Space>);

impl ActionSpace {
    /// Creates an empty action space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sub-action.
    pub fn insert(&mut self, name: impl Into<String>, space: Space) {
        self.0.insert(name.into(), space);
    }

    /// Returns the sub-space of the given name.
    pub fn get(&self, name: &str) -> Option<&Space> {
        self.0.get(name)
    }

    /// Iterates over sub-actions in the order of the flattened action vector.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Space> {
        self.0.iter()
    }

    /// Names of the sub-actions.
    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Width of the full action vector.
    pub fn num_actions(&self) -> usize {
        self.0.values().map(Space::flat_dim).sum()
    }

    /// Returns an action space holding only the sub-action `name`.
    pub fn filter(&self, name: &str) -> Result<Self, SkillError> {
        let space = self.get(name).ok_or_else(|| SkillError::MissingAction {
            name: name.to_string(),
            available: self.names(),
        })?;
        Ok(iter::once((name.to_string(), space.clone())).collect())
    }
}

impl FromIterator<(String, Space)> for ActionSpace {
    fn from_iter<I: IntoIterator<Item = (String, Space)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Named sensors and the shapes of their per-instance values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSpace(BTreeMap<String, Space>);

impl ObservationSpace {
    /// Creates an empty observation space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sensor.
    pub fn insert(&mut self, key: impl Into<String>, space: Space) {
        self.0.insert(key.into(), space);
    }

    /// Returns the space of the given sensor.
    pub fn get(&self, key: &str) -> Option<&Space> {
        self.0.get(key)
    }

    /// Returns `true` if the sensor exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Sensor names.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Returns an observation space holding only `keys`.
    ///
    /// Fails on the first key absent from this space.
    pub fn filter(&self, keys: &[String]) -> Result<Self, SkillError> {
        keys.iter()
            .map(|k| match self.get(k) {
                Some(space) => Ok((k.clone(), space.clone())),
                None => Err(SkillError::MissingObservationKey(k.clone())),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Self)
    }
}

impl FromIterator<(String, Space)> for ObservationSpace {
    fn from_iter<I: IntoIterator<Item = (String, Space)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
