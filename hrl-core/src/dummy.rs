//! This module is used for tests.
use crate::{
    error::SkillError, ActionSpace, ObservationSpace, Observations, PolicyActionData,
    SkillConfig, SkillCore, SkillPolicy,
};
use anyhow::Result;
use ndarray::{Array1, Array2, ArrayD};

/// Sensor read by [`DummySkill`] to decide termination.
pub const DUMMY_DONE_SENSOR: &str = "dummy_done";

/// Dummy skill.
///
/// Its argument is an integer; it writes that integer into the first entry of its
/// sub-action and is done when [`DUMMY_DONE_SENSOR`] is non-zero.
pub struct DummySkill {
    core: SkillCore<i64>,
}

impl DummySkill {
    /// Builds the skill.
    pub fn build(
        config: &SkillConfig,
        observation_space: &ObservationSpace,
        action_space: &ActionSpace,
        batch_size: usize,
    ) -> Result<Self> {
        Ok(Self {
            core: SkillCore::from_config(config, observation_space, action_space, batch_size)?,
        })
    }
}

impl SkillPolicy for DummySkill {
    type Args = i64;

    fn core(&self) -> &SkillCore<i64> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SkillCore<i64> {
        &mut self.core
    }

    fn parse_skill_arg(&self, skill_arg: &[String]) -> Result<i64> {
        let invalid = |reason: &str| SkillError::InvalidSkillArg {
            arg: skill_arg.to_vec(),
            reason: reason.to_string(),
        };
        let first = skill_arg.first().ok_or_else(|| invalid("empty"))?;
        let v = first
            .parse::<i64>()
            .map_err(|_| invalid("not an integer"))?;
        Ok(v)
    }

    fn check_done(
        &self,
        observations: &Observations,
        _rnn_hidden_states: &ArrayD<f32>,
        _prev_actions: &Array2<f32>,
        _masks: &Array1<bool>,
        _batch_idx: &[usize],
    ) -> Result<Vec<bool>> {
        Ok(observations
            .get(DUMMY_DONE_SENSOR)?
            .iter()
            .map(|v| *v != 0.0)
            .collect())
    }

    fn internal_act(
        &mut self,
        _observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        _prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        batch_idx: &[usize],
        _deterministic: bool,
    ) -> Result<PolicyActionData> {
        let mut actions = self.core.zero_actions(masks.len());
        let col = self.core.action_range().start;
        for (k, &i) in batch_idx.iter().enumerate() {
            actions[[k, col]] = *self.core.args(i)? as f32;
        }
        Ok(PolicyActionData {
            actions,
            rnn_hidden_states: rnn_hidden_states.clone(),
        })
    }
}
