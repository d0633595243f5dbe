//! Skills by name.
use crate::{OracleNavSocPolicy, WaitSkillPolicy};
use anyhow::Result;
use hrl_core::{
    error::SkillError, ActionSpace, FullConfig, ObservationSpace, PddlProblem, Skill,
    SkillConfig,
};
use log::info;
use std::{collections::HashMap, sync::Arc};

/// Builds the skill variant named by `config.name`.
pub fn build_skill(
    config: &SkillConfig,
    observation_space: &ObservationSpace,
    action_space: &ActionSpace,
    batch_size: usize,
    full_config: &FullConfig,
) -> Result<Box<dyn Skill>> {
    let skill: Box<dyn Skill> = match config.name.as_str() {
        "OracleNavSocPolicy" => Box::new(OracleNavSocPolicy::from_config(
            config,
            observation_space,
            action_space,
            batch_size,
            full_config,
        )?),
        "WaitSkillPolicy" => Box::new(WaitSkillPolicy::from_config(
            config,
            observation_space,
            action_space,
            batch_size,
        )?),
        name => return Err(SkillError::UnknownPolicy(name.to_string()).into()),
    };
    Ok(skill)
}

/// The skills a high-level policy chooses from.
///
/// Skills are numbered in the order they were defined.
pub struct SkillSet {
    skills: Vec<Box<dyn Skill>>,
    name_to_idx: HashMap<String, usize>,
}

impl SkillSet {
    /// Builds one skill per `(skill name, config)` pair.
    ///
    /// The skill name overrides `config.skill_name`.
    pub fn build<I>(
        defined_skills: I,
        observation_space: &ObservationSpace,
        action_space: &ActionSpace,
        batch_size: usize,
        full_config: &FullConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (String, SkillConfig)>,
    {
        let mut skills = vec![];
        let mut name_to_idx = HashMap::new();
        for (skill_name, config) in defined_skills {
            let config = config.skill_name(skill_name.as_str());
            let skill = build_skill(
                &config,
                observation_space,
                action_space,
                batch_size,
                full_config,
            )?;
            info!("Built skill {} ({})", skill_name, config.name);
            name_to_idx.insert(skill_name, skills.len());
            skills.push(skill);
        }
        Ok(Self {
            skills,
            name_to_idx,
        })
    }

    /// Number of skills.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Returns `true` if there is no skill.
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Index of a skill.
    pub fn idx(&self, skill_name: &str) -> Option<usize> {
        self.name_to_idx.get(skill_name).copied()
    }

    /// Skill names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(|s| s.skill_name())
    }

    /// Skill of the given name.
    pub fn get(&self, skill_name: &str) -> Option<&dyn Skill> {
        let ix = self.idx(skill_name)?;
        Some(self.skills[ix].as_ref())
    }

    /// Mutable skill of the given name.
    pub fn get_mut(&mut self, skill_name: &str) -> Option<&mut (dyn Skill + 'static)> {
        let ix = self.idx(skill_name)?;
        Some(self.skills[ix].as_mut())
    }

    /// Hands the planning problem to every skill.
    pub fn set_pddl_problem(&mut self, problem: Arc<PddlProblem>) -> Result<()> {
        for skill in self.skills.iter_mut() {
            skill.set_pddl_problem(problem.clone())?;
        }
        Ok(())
    }
}
