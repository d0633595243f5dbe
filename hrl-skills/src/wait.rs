//! Skill doing nothing for a given number of steps.
use anyhow::Result;
use hrl_core::{
    error::SkillError, ActionSpace, ObservationSpace, Observations, PolicyActionData,
    SkillConfig, SkillCore, SkillPolicy,
};
use ndarray::{Array1, Array2, ArrayD};

/// Emits zero actions until the requested number of steps has passed.
///
/// The argument is a single positive integer, the number of steps to wait.
pub struct WaitSkillPolicy {
    core: SkillCore<usize>,
}

impl WaitSkillPolicy {
    /// Builds the skill.
    pub fn from_config(
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

impl SkillPolicy for WaitSkillPolicy {
    type Args = usize;

    fn core(&self) -> &SkillCore<usize> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SkillCore<usize> {
        &mut self.core
    }

    fn parse_skill_arg(&self, skill_arg: &[String]) -> Result<usize> {
        let wait_time = match skill_arg {
            [v] => v.parse::<usize>().ok().filter(|&n| n > 0),
            _ => None,
        };
        wait_time.ok_or_else(|| {
            SkillError::InvalidSkillArg {
                arg: skill_arg.to_vec(),
                reason: "expected a single positive number of steps".to_string(),
            }
            .into()
        })
    }

    fn check_done(
        &self,
        _observations: &Observations,
        _rnn_hidden_states: &ArrayD<f32>,
        _prev_actions: &Array2<f32>,
        _masks: &Array1<bool>,
        batch_idx: &[usize],
    ) -> Result<Vec<bool>> {
        batch_idx
            .iter()
            .map(|&i| -> Result<bool> {
                let slot = self.core.slot(i)?;
                let wait_time = self.core.args(i)?;
                Ok(slot.steps >= *wait_time)
            })
            .collect()
    }

    fn internal_act(
        &mut self,
        _observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        _prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        _batch_idx: &[usize],
        _deterministic: bool,
    ) -> Result<PolicyActionData> {
        Ok(PolicyActionData {
            actions: self.core.zero_actions(masks.len()),
            rnn_hidden_states: rnn_hidden_states.clone(),
        })
    }
}
