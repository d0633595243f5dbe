//! Oracle navigation skill for social navigation tasks.
//!
//! The skill does not plan. It selects the oracle navigation action, which follows a
//! path computed by the simulator, and reads completion from the
//! [`HAS_FINISHED_ORACLE_NAV`] sensor.
use anyhow::Result;
use hrl_core::{
    error::SkillError, ActionSpace, BatchSlots, FullConfig, ObservationSpace, Observations,
    PddlEntity, PddlProblem, PolicyActionData, SkillConfig, SkillCore, SkillPolicy,
};
use log::debug;
use ndarray::{Array1, Array2, ArrayD, Axis, Ix2};
use std::path::{Path, PathBuf};

/// Sensor set to a non-zero value once the oracle navigator reached its target.
pub const HAS_FINISHED_ORACLE_NAV: &str = "has_finished_oracle_nav";

/// Sub-action driving the oracle navigator.
pub const ORACLE_NAV_SOC_ACTION: &str = "oracle_nav_soc_action";

/// Agent position and heading, `[x, y, z, angle]` per row. Optional.
pub const LOCALIZATION_SENSOR: &str = "localization_sensor";

/// Action index every activation of the skill uses.
const ORACLE_ACTION_IDX: usize = 100;

/// Argument of [`OracleNavSocPolicy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleNavSocActionArgs {
    /// Index of the oracle action to execute. The action written is `action_idx + 1`,
    /// as `0` means no oracle action.
    pub action_idx: usize,
}

/// Scratch state of one slot, cleared on every `on_enter`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavScratch {
    /// Agent position seen on the last step.
    pub prev_pos: Option<[f32; 3]>,

    /// Agent heading seen on the last step.
    pub prev_angle: Option<f32>,

    /// Whether the navigation target is an object rather than a receptacle.
    /// Nothing populates it yet; it is only cleared on entry.
    pub is_target_obj: Option<bool>,

    /// Index of the target entity. Nothing populates it yet; it is only cleared on entry.
    pub targ_obj_idx: Option<usize>,
}

/// Skill that hands navigation to the simulator's oracle path follower.
pub struct OracleNavSocPolicy {
    core: SkillCore<OracleNavSocActionArgs>,
    oracle_nav_ac_idx: usize,
    pddl_domain_path: PathBuf,
    pddl_task_path: PathBuf,
    all_entities: Vec<PddlEntity>,
    scratch: BatchSlots<NavScratch>,
}

impl OracleNavSocPolicy {
    /// Builds the skill.
    ///
    /// `config.action_name` must be [`ORACLE_NAV_SOC_ACTION`], the only action the skill
    /// writes. Fails if it is not in `action_space`, or if one of `config.obs_skill_inputs`
    /// is not in `observation_space`.
    pub fn from_config(
        config: &SkillConfig,
        observation_space: &ObservationSpace,
        action_space: &ActionSpace,
        batch_size: usize,
        full_config: &FullConfig,
    ) -> Result<Self> {
        if config.action_name != ORACLE_NAV_SOC_ACTION {
            return Err(SkillError::InvalidConfig(format!(
                "skill {} must use action {}, got {}",
                config.skill_name, ORACLE_NAV_SOC_ACTION, config.action_name
            ))
            .into());
        }
        let core = SkillCore::from_config(config, observation_space, action_space, batch_size)?;
        let oracle_nav_ac_idx = core.action_range().start;
        debug!(
            "Skill {} uses stop threshold {}",
            config.skill_name, config.stop_thresh
        );

        Ok(Self {
            core,
            oracle_nav_ac_idx,
            pddl_domain_path: full_config.task.pddl_domain_def.clone(),
            pddl_task_path: full_config.task.task_spec_path(),
            all_entities: vec![],
            scratch: BatchSlots::new(batch_size),
        })
    }

    /// Scratch state of a slot.
    pub fn scratch(&self, slot: usize) -> Result<&NavScratch, SkillError> {
        self.scratch.get(slot)
    }

    /// Entities of the planning problem, sorted by name. Empty until a problem is set.
    pub fn all_entities(&self) -> &[PddlEntity] {
        &self.all_entities
    }

    /// Path of the PDDL domain definition.
    pub fn pddl_domain_path(&self) -> &Path {
        &self.pddl_domain_path
    }

    /// Path of the task specification.
    pub fn pddl_task_path(&self) -> &Path {
        &self.pddl_task_path
    }

    fn record_pose(&mut self, observations: &Observations, batch_idx: &[usize]) -> Result<()> {
        if !observations.contains_key(LOCALIZATION_SENSOR) {
            return Ok(());
        }
        let poses = observations.get(LOCALIZATION_SENSOR)?;
        let shape_error = || {
            SkillError::ShapeMismatch(format!(
                "{} has shape {:?}, expected ({}, 4)",
                LOCALIZATION_SENSOR,
                poses.shape(),
                batch_idx.len()
            ))
        };
        let poses = poses
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| shape_error())?;
        if poses.ncols() < 4 || poses.nrows() != batch_idx.len() {
            return Err(shape_error().into());
        }
        for (pose, &i) in poses.outer_iter().zip(batch_idx) {
            let scratch = self.scratch.get_mut(i)?;
            scratch.prev_pos = Some([pose[0], pose[1], pose[2]]);
            scratch.prev_angle = Some(pose[3]);
        }
        Ok(())
    }
}

impl SkillPolicy for OracleNavSocPolicy {
    type Args = OracleNavSocActionArgs;

    fn core(&self) -> &SkillCore<OracleNavSocActionArgs> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SkillCore<OracleNavSocActionArgs> {
        &mut self.core
    }

    /// Always selects action index 100: the oracle follows a precomputed route, so the
    /// planner's argument carries no information for this skill.
    fn parse_skill_arg(&self, _skill_arg: &[String]) -> Result<OracleNavSocActionArgs> {
        Ok(OracleNavSocActionArgs {
            action_idx: ORACLE_ACTION_IDX,
        })
    }

    fn on_pddl_problem(&mut self, problem: &PddlProblem) -> Result<()> {
        self.all_entities = problem.ordered_entities();
        Ok(())
    }

    fn reset_slots(&mut self, batch_idx: &[usize]) -> Result<()> {
        self.scratch.reset(batch_idx)?;
        Ok(())
    }

    fn check_done(
        &self,
        observations: &Observations,
        _rnn_hidden_states: &ArrayD<f32>,
        _prev_actions: &Array2<f32>,
        _masks: &Array1<bool>,
        _batch_idx: &[usize],
    ) -> Result<Vec<bool>> {
        let finished = observations.get(HAS_FINISHED_ORACLE_NAV)?;
        if finished.ndim() == 0 {
            return Err(SkillError::ShapeMismatch(format!(
                "{} has no batch axis",
                HAS_FINISHED_ORACLE_NAV
            ))
            .into());
        }

        let mut is_done = Vec::with_capacity(finished.len_of(Axis(0)));
        for row in finished.outer_iter() {
            let v = row.iter().next().ok_or_else(|| {
                SkillError::ShapeMismatch(format!("{} has empty rows", HAS_FINISHED_ORACLE_NAV))
            })?;
            if !v.is_finite() {
                return Err(SkillError::InvalidSignal(HAS_FINISHED_ORACLE_NAV.to_string()).into());
            }
            is_done.push(*v != 0.0);
        }
        Ok(is_done)
    }

    fn internal_act(
        &mut self,
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        _prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        batch_idx: &[usize],
        _deterministic: bool,
    ) -> Result<PolicyActionData> {
        let mut full_action = self.core.zero_actions(masks.len());
        for (k, &i) in batch_idx.iter().enumerate() {
            let action_idx = self.core.args(i)?.action_idx;
            full_action[[k, self.oracle_nav_ac_idx]] = (action_idx + 1) as f32;
        }
        self.record_pose(observations, batch_idx)?;

        Ok(PolicyActionData {
            actions: full_action,
            rnn_hidden_states: rnn_hidden_states.clone(),
        })
    }
}
