//! Batched observations and actions.
use crate::error::SkillError;
use ndarray::{Array2, ArrayD};
use std::collections::HashMap;

/// Sensor readings of a batch of environments.
///
/// Each value has the batch on axis 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observations(HashMap<String, ArrayD<f32>>);

impl Observations {
    /// Creates an empty set of observations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sensor reading.
    pub fn insert(&mut self, key: impl Into<String>, value: ArrayD<f32>) {
        self.0.insert(key.into(), value);
    }

    /// Returns the reading of a sensor the caller cannot do without.
    pub fn get(&self, key: &str) -> Result<&ArrayD<f32>, SkillError> {
        self.0
            .get(key)
            .ok_or_else(|| SkillError::MissingSignal(key.to_string()))
    }

    /// Returns `true` if the sensor is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the observations restricted to `keys`.
    pub fn select(&self, keys: &[String]) -> Result<Self, SkillError> {
        keys.iter()
            .map(|k| -> Result<(String, ArrayD<f32>), SkillError> {
                Ok((k.clone(), self.get(k)?.clone()))
            })
            .collect::<Result<HashMap<_, _>, _>>()
            .map(Self)
    }
}

/// Output of [`Skill::act`](crate::Skill::act).
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyActionData {
    /// Full action vectors, one row per entry of `batch_idx`.
    pub actions: Array2<f32>,

    /// Recurrent state to pass to the next call.
    pub rnn_hidden_states: ArrayD<f32>,
}
