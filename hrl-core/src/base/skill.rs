//! Skill policies.
//!
//! A skill is implemented through [`SkillPolicy`], which supplies the variant-specific
//! hooks on top of a [`SkillCore`]. Every [`SkillPolicy`] is a [`Skill`], the object-safe
//! interface an orchestrator drives: it enters slots, acts, and asks whether to
//! terminate.
use super::{BatchSlots, Observations, PddlProblem, PolicyActionData};
use crate::{
    error::SkillError,
    record::{Record, RecordValue},
    util::{find_action_range, ActionRange},
    ActionSpace, ObservationSpace, SkillConfig,
};
use anyhow::Result;
use log::{debug, info, trace};
use ndarray::{Array1, Array2, ArrayD, Axis};
use std::{fmt::Debug, sync::Arc};

/// Raw skill argument as produced by the planner, e.g. entity names.
pub type SkillArg = Vec<String>;

/// Lifecycle of a skill in one batch slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotPhase {
    /// The skill never entered the slot.
    Uninitialized,

    /// The skill controls the slot.
    Active,

    /// The skill reported termination for the slot.
    Done,
}

impl Default for SlotPhase {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// State of a skill in one batch slot, common to all skills.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillSlot<A> {
    /// Lifecycle phase.
    pub phase: SlotPhase,

    /// Parsed argument of the current activation.
    pub args: Option<A>,

    /// Raw argument of the current activation.
    pub raw_args: SkillArg,

    /// Number of `act` calls since the last `on_enter`.
    pub steps: usize,
}

impl<A> Default for SkillSlot<A> {
    fn default() -> Self {
        Self {
            phase: SlotPhase::Uninitialized,
            args: None,
            raw_args: vec![],
            steps: 0,
        }
    }
}

/// Result of [`Skill::should_terminate`], aligned to `batch_idx`.
#[derive(Clone, Debug, PartialEq)]
pub struct Termination {
    /// The skill ended, successfully or by timeout.
    pub is_done: Vec<bool>,

    /// The skill ended by timeout and counts as a failure.
    pub bad_terminate: Vec<bool>,

    /// Actions to apply on this step.
    pub actions: Array2<f32>,
}

/// State shared by every skill variant.
#[derive(Clone, Debug)]
pub struct SkillCore<A> {
    config: SkillConfig,
    batch_size: usize,
    full_ac_size: usize,
    action_range: ActionRange,
    filtered_action_space: ActionSpace,
    filtered_obs_space: ObservationSpace,
    pddl_problem: Option<Arc<PddlProblem>>,
    slots: BatchSlots<SkillSlot<A>>,
}

impl<A> SkillCore<A> {
    /// Builds the shared state from the configuration and the full spaces.
    ///
    /// Fails if `config.action_name` is not in `action_space` or one of
    /// `config.obs_skill_inputs` is not in `observation_space`.
    pub fn from_config(
        config: &SkillConfig,
        observation_space: &ObservationSpace,
        action_space: &ActionSpace,
        batch_size: usize,
    ) -> Result<Self> {
        let action_range = find_action_range(action_space, &config.action_name)?;
        let filtered_action_space = action_space.filter(&config.action_name)?;
        let filtered_obs_space = observation_space.filter(&config.obs_skill_inputs)?;
        debug!(
            "Loaded action space {:?} for skill {}",
            filtered_action_space, config.skill_name
        );

        Ok(Self {
            config: config.clone(),
            batch_size,
            full_ac_size: action_space.num_actions(),
            action_range,
            filtered_action_space,
            filtered_obs_space,
            pddl_problem: None,
            slots: BatchSlots::new(batch_size),
        })
    }

    /// Configuration of the skill.
    pub fn config(&self) -> &SkillConfig {
        &self.config
    }

    /// Number of batch slots.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Width of the full action vector.
    pub fn full_ac_size(&self) -> usize {
        self.full_ac_size
    }

    /// Where the configured sub-action lives in the full action vector.
    pub fn action_range(&self) -> &ActionRange {
        &self.action_range
    }

    /// Action space restricted to the configured sub-action.
    pub fn filtered_action_space(&self) -> &ActionSpace {
        &self.filtered_action_space
    }

    /// Observation space restricted to the configured inputs.
    pub fn filtered_obs_space(&self) -> &ObservationSpace {
        &self.filtered_obs_space
    }

    /// The planning problem, once set.
    pub fn pddl_problem(&self) -> Option<&Arc<PddlProblem>> {
        self.pddl_problem.as_ref()
    }

    /// Common state of a slot.
    pub fn slot(&self, slot: usize) -> Result<&SkillSlot<A>, SkillError> {
        self.slots.get(slot)
    }

    /// Parsed argument of the current activation of a slot.
    pub fn args(&self, slot: usize) -> Result<&A, SkillError> {
        self.slots
            .get(slot)?
            .args
            .as_ref()
            .ok_or(SkillError::NotEntered(slot))
    }

    /// Observations restricted to the configured inputs.
    pub fn filtered_obs(&self, observations: &Observations) -> Result<Observations, SkillError> {
        observations.select(&self.config.obs_skill_inputs)
    }

    /// An all-zero block of full action vectors.
    pub fn zero_actions(&self, n_rows: usize) -> Array2<f32> {
        Array2::zeros((n_rows, self.full_ac_size))
    }
}

/// Variant-specific behaviour of a skill.
///
/// Hooks receive tensors restricted to `batch_idx`: row `k` belongs to slot `batch_idx[k]`.
/// The lifecycle operations themselves are provided by the blanket [`Skill`] impl.
pub trait SkillPolicy {
    /// Parsed skill argument.
    type Args: Clone + Debug;

    /// Shared state.
    fn core(&self) -> &SkillCore<Self::Args>;

    /// Mutable shared state.
    fn core_mut(&mut self) -> &mut SkillCore<Self::Args>;

    /// Decodes a raw argument from the planner.
    fn parse_skill_arg(&self, skill_arg: &[String]) -> Result<Self::Args>;

    /// Derives cached views of a newly set planning problem.
    fn on_pddl_problem(&mut self, _problem: &PddlProblem) -> Result<()> {
        Ok(())
    }

    /// Clears variant-specific scratch state of `batch_idx`.
    fn reset_slots(&mut self, _batch_idx: &[usize]) -> Result<()> {
        Ok(())
    }

    /// Termination condition, one flag per entry of `batch_idx`.
    fn check_done(
        &self,
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        batch_idx: &[usize],
    ) -> Result<Vec<bool>>;

    /// Computes full action vectors for `batch_idx`.
    fn internal_act(
        &mut self,
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        batch_idx: &[usize],
        deterministic: bool,
    ) -> Result<PolicyActionData>;
}

/// The interface an orchestrator uses to drive a skill.
pub trait Skill {
    /// Configuration of the skill.
    fn config(&self) -> &SkillConfig;

    /// Name of the skill as used by the planner.
    fn skill_name(&self) -> &str {
        &self.config().skill_name
    }

    /// Lifecycle phase of a slot.
    fn phase(&self, slot: usize) -> Result<SlotPhase>;

    /// Stores the shared planning problem.
    fn set_pddl_problem(&mut self, problem: Arc<PddlProblem>) -> Result<()>;

    /// Starts the skill in the slots `batch_idx`.
    ///
    /// `skill_args` is aligned to `batch_idx`. `rnn_hidden_states` and `prev_actions` cover
    /// the whole batch. Slots not in `batch_idx` are left untouched. Returns zeroed hidden
    /// states and previous actions for `batch_idx`.
    fn on_enter(
        &mut self,
        skill_args: &[SkillArg],
        batch_idx: &[usize],
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
    ) -> Result<(ArrayD<f32>, Array2<f32>)>;

    /// Returns, per entry of `batch_idx`, whether the skill reached its goal.
    fn is_skill_done(
        &mut self,
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        batch_idx: &[usize],
    ) -> Result<Vec<bool>>;

    /// Computes full action vectors for `batch_idx`.
    ///
    /// Every slot in `batch_idx` must be [`SlotPhase::Active`]; a finished slot has to
    /// enter the skill again before it acts.
    fn act(
        &mut self,
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        batch_idx: &[usize],
        deterministic: bool,
    ) -> Result<PolicyActionData>;

    /// Combines [`Skill::is_skill_done`] with the step limit and the high-level policy's request.
    ///
    /// `log_info` has one record per batch slot; slots that time out as a failure get
    /// `failed_skill` set to the skill name.
    #[allow(clippy::too_many_arguments)]
    fn should_terminate(
        &mut self,
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        actions: Array2<f32>,
        hl_wants_skill_term: &[bool],
        batch_idx: &[usize],
        log_info: &mut [Record],
    ) -> Result<Termination>;
}

fn batch_rows(what: &str, a: &ArrayD<f32>) -> Result<usize, SkillError> {
    if a.ndim() == 0 {
        return Err(SkillError::ShapeMismatch(format!("{} has no batch axis", what)));
    }
    Ok(a.len_of(Axis(0)))
}

fn check_rows(what: &str, rows: usize, expected: usize) -> Result<(), SkillError> {
    if rows == expected {
        Ok(())
    } else {
        Err(SkillError::ShapeMismatch(format!(
            "{} has {} rows, expected {}",
            what, rows, expected
        )))
    }
}

/// Checks that the per-call tensors have one row per entry of `batch_idx`
/// and that every slot has entered the skill.
fn check_step_inputs<A>(
    core: &SkillCore<A>,
    rnn_hidden_states: &ArrayD<f32>,
    prev_actions: &Array2<f32>,
    masks: &Array1<bool>,
    batch_idx: &[usize],
) -> Result<(), SkillError> {
    let n = batch_idx.len();
    check_rows("masks", masks.len(), n)?;
    check_rows("prev_actions", prev_actions.nrows(), n)?;
    check_rows("rnn_hidden_states", batch_rows("rnn_hidden_states", rnn_hidden_states)?, n)?;
    for &i in batch_idx {
        core.args(i)?;
    }
    Ok(())
}

impl<T: SkillPolicy> Skill for T {
    fn config(&self) -> &SkillConfig {
        self.core().config()
    }

    fn phase(&self, slot: usize) -> Result<SlotPhase> {
        Ok(self.core().slot(slot)?.phase)
    }

    fn set_pddl_problem(&mut self, problem: Arc<PddlProblem>) -> Result<()> {
        self.on_pddl_problem(&problem)?;
        self.core_mut().pddl_problem = Some(problem);
        Ok(())
    }

    fn on_enter(
        &mut self,
        skill_args: &[SkillArg],
        batch_idx: &[usize],
        _observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
    ) -> Result<(ArrayD<f32>, Array2<f32>)> {
        check_rows("skill_args", skill_args.len(), batch_idx.len())?;
        let hidden_rows = batch_rows("rnn_hidden_states", rnn_hidden_states)?;
        for &i in batch_idx {
            self.core().slot(i)?;
            if i >= hidden_rows || i >= prev_actions.nrows() {
                return Err(SkillError::ShapeMismatch(format!(
                    "batch slot {} is beyond the batched hidden states or previous actions",
                    i
                ))
                .into());
            }
        }

        // Parse everything first so that a bad argument leaves all slots as they were.
        let parsed = skill_args
            .iter()
            .map(|arg| self.parse_skill_arg(arg))
            .collect::<Result<Vec<_>>>()?;

        self.reset_slots(batch_idx)?;
        let core = self.core_mut();
        core.slots.reset(batch_idx)?;
        for ((&i, args), raw_args) in batch_idx.iter().zip(parsed).zip(skill_args) {
            let slot = core.slots.get_mut(i)?;
            slot.phase = SlotPhase::Active;
            slot.args = Some(args);
            slot.raw_args = raw_args.clone();
        }
        trace!(
            "Skill {} entered for slots {:?}",
            core.config.skill_name,
            batch_idx
        );

        let hidden = rnn_hidden_states
            .select(Axis(0), batch_idx)
            .mapv_into(|_| 0.0);
        let prev_actions = prev_actions.select(Axis(0), batch_idx).mapv_into(|_| 0.0);
        Ok((hidden, prev_actions))
    }

    fn is_skill_done(
        &mut self,
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        batch_idx: &[usize],
    ) -> Result<Vec<bool>> {
        check_step_inputs(self.core(), rnn_hidden_states, prev_actions, masks, batch_idx)?;
        let is_done = self.check_done(
            observations,
            rnn_hidden_states,
            prev_actions,
            masks,
            batch_idx,
        )?;
        check_rows("done flags", is_done.len(), batch_idx.len())?;

        let core = self.core_mut();
        for (&i, &done) in batch_idx.iter().zip(is_done.iter()) {
            if done {
                core.slots.get_mut(i)?.phase = SlotPhase::Done;
            }
        }
        Ok(is_done)
    }

    fn act(
        &mut self,
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        batch_idx: &[usize],
        deterministic: bool,
    ) -> Result<PolicyActionData> {
        check_step_inputs(self.core(), rnn_hidden_states, prev_actions, masks, batch_idx)?;
        for &i in batch_idx {
            if self.core().slot(i)?.phase != SlotPhase::Active {
                return Err(SkillError::NotActive(i).into());
            }
        }
        let action_data = self.internal_act(
            observations,
            rnn_hidden_states,
            prev_actions,
            masks,
            batch_idx,
            deterministic,
        )?;

        let core = self.core_mut();
        let (rows, cols) = action_data.actions.dim();
        if rows != batch_idx.len() || cols != core.full_ac_size {
            return Err(SkillError::ShapeMismatch(format!(
                "skill {} produced actions of shape ({}, {}), expected ({}, {})",
                core.config.skill_name,
                rows,
                cols,
                batch_idx.len(),
                core.full_ac_size
            ))
            .into());
        }
        for &i in batch_idx {
            core.slots.get_mut(i)?.steps += 1;
        }
        Ok(action_data)
    }

    fn should_terminate(
        &mut self,
        observations: &Observations,
        rnn_hidden_states: &ArrayD<f32>,
        prev_actions: &Array2<f32>,
        masks: &Array1<bool>,
        actions: Array2<f32>,
        hl_wants_skill_term: &[bool],
        batch_idx: &[usize],
        log_info: &mut [Record],
    ) -> Result<Termination> {
        check_rows("hl_wants_skill_term", hl_wants_skill_term.len(), batch_idx.len())?;
        check_rows("actions", actions.nrows(), batch_idx.len())?;
        let mut is_done = self.is_skill_done(
            observations,
            rnn_hidden_states,
            prev_actions,
            masks,
            batch_idx,
        )?;
        let mut bad_terminate = vec![false; batch_idx.len()];

        let core = self.core_mut();
        let max_steps = core.config.max_skill_steps;
        for (k, &i) in batch_idx.iter().enumerate() {
            let slot = core.slots.get_mut(i)?;
            if max_steps > 0 && slot.steps >= max_steps {
                info!(
                    "Skill {} reached {} steps in slot {}",
                    core.config.skill_name, slot.steps, i
                );
                if core.config.force_end_on_timeout {
                    bad_terminate[k] = true;
                } else {
                    is_done[k] = true;
                }
            }
            is_done[k] |= hl_wants_skill_term[k];
            if is_done[k] || bad_terminate[k] {
                slot.phase = SlotPhase::Done;
            }

            if bad_terminate[k] {
                let record = log_info.get_mut(i).ok_or_else(|| {
                    SkillError::ShapeMismatch(format!("no log record for batch slot {}", i))
                })?;
                record.insert(
                    "failed_skill",
                    RecordValue::String(core.config.skill_name.clone()),
                );
            }
        }

        Ok(Termination {
            is_done,
            bad_terminate,
            actions,
        })
    }
}
