#![warn(missing_docs)]
//! Skills for hierarchical reinforcement learning, built on [`hrl_core`].
//!
//! * [`OracleNavSocPolicy`] - navigates with the simulator's oracle path follower.
//! * [`WaitSkillPolicy`] - does nothing for a number of steps.
//!
//! [`SkillSet`] builds skills from their configurations and looks them up by name.
mod oracle_nav;
mod registry;
mod wait;

pub use oracle_nav::{
    NavScratch, OracleNavSocActionArgs, OracleNavSocPolicy, HAS_FINISHED_ORACLE_NAV,
    LOCALIZATION_SENSOR, ORACLE_NAV_SOC_ACTION,
};
pub use registry::{build_skill, SkillSet};
pub use wait::WaitSkillPolicy;
