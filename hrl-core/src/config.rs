//! Configuration of skills.
//!
//! Configurations arrive already parsed; these types only describe their fields
//! and defaults.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration of a single skill.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct SkillConfig {
    /// Name of the skill as used by the planner, e.g. `nav`.
    pub skill_name: String,

    /// Name of the skill variant, e.g. `OracleNavSocPolicy`.
    pub name: String,

    /// Name of the sub-action the skill writes into.
    pub action_name: String,

    /// Distance under which a navigation target counts as reached.
    pub stop_thresh: f32,

    /// Observation keys the skill consumes.
    pub obs_skill_inputs: Vec<String>,

    /// Maximum number of steps of a single activation. `0` disables the limit.
    pub max_skill_steps: usize,

    /// If `true`, reaching `max_skill_steps` is reported as a failure.
    pub force_end_on_timeout: bool,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            skill_name: String::new(),
            name: String::new(),
            action_name: "base_velocity".to_string(),
            stop_thresh: 0.001,
            obs_skill_inputs: vec![],
            max_skill_steps: 200,
            force_end_on_timeout: true,
        }
    }
}

impl SkillConfig {
    /// Sets the skill name.
    pub fn skill_name(mut self, v: impl Into<String>) -> Self {
        self.skill_name = v.into();
        self
    }

    /// Sets the variant name.
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the action name.
    pub fn action_name(mut self, v: impl Into<String>) -> Self {
        self.action_name = v.into();
        self
    }

    /// Sets the stop threshold.
    pub fn stop_thresh(mut self, v: f32) -> Self {
        self.stop_thresh = v;
        self
    }

    /// Sets the observation keys the skill consumes.
    pub fn obs_skill_inputs(mut self, v: Vec<String>) -> Self {
        self.obs_skill_inputs = v;
        self
    }

    /// Sets the step limit of an activation.
    pub fn max_skill_steps(mut self, v: usize) -> Self {
        self.max_skill_steps = v;
        self
    }

    /// Sets whether a timeout is a failure.
    pub fn force_end_on_timeout(mut self, v: bool) -> Self {
        self.force_end_on_timeout = v;
        self
    }
}

/// Task definition files.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
#[serde(default)]
pub struct TaskConfig {
    /// Path of the PDDL domain definition.
    pub pddl_domain_def: PathBuf,

    /// Directory of task specifications.
    pub task_spec_base_path: PathBuf,

    /// Task specification name, without extension.
    pub task_spec: String,
}

impl TaskConfig {
    /// Path of the task specification file.
    pub fn task_spec_path(&self) -> PathBuf {
        self.task_spec_base_path.join(format!("{}.yaml", self.task_spec))
    }
}

/// The parts of the experiment configuration skills read.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
#[serde(default)]
pub struct FullConfig {
    /// Task configuration.
    pub task: TaskConfig,
}
