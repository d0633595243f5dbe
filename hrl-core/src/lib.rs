#![warn(missing_docs)]
//! Skill policies for hierarchical reinforcement learning.
//!
//! A high-level policy picks, for every environment of a batch, which skill controls it.
//! Skills implement [`SkillPolicy`] and are driven through [`Skill`]:
//!
//! 1. [`Skill::on_enter`] hands batch slots to the skill,
//! 2. [`Skill::act`] writes the skill's sub-action into full action vectors,
//! 3. [`Skill::should_terminate`] tells when to give the slots back.
pub mod config;
pub mod dummy;
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{
    ActionSpace, BatchSlots, ObservationSpace, Observations, PddlEntity, PddlProblem,
    PolicyActionData, Skill, SkillArg, SkillCore, SkillPolicy, SkillSlot, SlotPhase, Space,
    Termination,
};
pub use config::{FullConfig, SkillConfig, TaskConfig};
