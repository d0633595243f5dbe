use anyhow::Result;
use hrl_core::{
    error::SkillError, record::Record, ActionSpace, FullConfig, ObservationSpace, Observations,
    PddlEntity, PddlProblem, SkillConfig, SlotPhase, Space,
};
use hrl_skills::{SkillSet, HAS_FINISHED_ORACLE_NAV, ORACLE_NAV_SOC_ACTION};
use ndarray::{array, Array2, ArrayD, IxDyn};
use std::sync::Arc;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn spaces() -> (ObservationSpace, ActionSpace) {
    let mut obs_space = ObservationSpace::new();
    obs_space.insert(HAS_FINISHED_ORACLE_NAV, Space::box1(1));
    let mut action_space = ActionSpace::new();
    action_space.insert("base_velocity", Space::box1(2));
    action_space.insert(ORACLE_NAV_SOC_ACTION, Space::box1(1));
    (obs_space, action_space)
}

fn defined_skills() -> Vec<(String, SkillConfig)> {
    vec![
        (
            "nav".to_string(),
            SkillConfig::default()
                .name("OracleNavSocPolicy")
                .action_name(ORACLE_NAV_SOC_ACTION),
        ),
        (
            "wait".to_string(),
            SkillConfig::default()
                .name("WaitSkillPolicy")
                .max_skill_steps(0),
        ),
    ]
}

fn build(batch_size: usize) -> Result<SkillSet> {
    let (obs_space, action_space) = spaces();
    SkillSet::build(
        defined_skills(),
        &obs_space,
        &action_space,
        batch_size,
        &FullConfig::default(),
    )
}

#[test]
fn test_lookup_by_name() -> Result<()> {
    init();
    let skills = build(2)?;
    assert_eq!(skills.len(), 2);
    assert_eq!(skills.names().collect::<Vec<_>>(), vec!["nav", "wait"]);
    assert_eq!(skills.idx("wait"), Some(1));
    assert_eq!(skills.get("nav").map(|s| s.config().name.clone()), Some("OracleNavSocPolicy".to_string()));
    assert!(skills.get("pick").is_none());
    Ok(())
}

#[test]
fn test_unknown_policy() {
    let (obs_space, action_space) = spaces();
    let defined = vec![(
        "pick".to_string(),
        SkillConfig::default().name("PickSkillPolicy"),
    )];
    let err = SkillSet::build(defined, &obs_space, &action_space, 1, &FullConfig::default())
        .err()
        .unwrap();
    assert_eq!(
        err.downcast_ref::<SkillError>(),
        Some(&SkillError::UnknownPolicy("PickSkillPolicy".to_string()))
    );
}

#[test]
fn test_slots_switch_between_skills() -> Result<()> {
    init();
    let mut skills = build(2)?;
    skills.set_pddl_problem(Arc::new(PddlProblem::new(vec![PddlEntity::new(
        "robot_0",
        "robot_entity_type",
    )])))?;

    let full_obs = {
        let mut obs = Observations::new();
        obs.insert(HAS_FINISHED_ORACLE_NAV, array![[0.0f32], [1.0]].into_dyn());
        obs
    };
    let hidden = ArrayD::<f32>::zeros(IxDyn(&[2, 4]));
    let prev_actions = Array2::<f32>::zeros((2, 3));

    // Slot 0 navigates, slot 1 waits for one step.
    let nav = skills.get_mut("nav").unwrap();
    nav.on_enter(&[vec![]], &[0], &full_obs, &hidden, &prev_actions)?;
    let wait = skills.get_mut("wait").unwrap();
    wait.on_enter(&[vec!["1".to_string()]], &[1], &full_obs, &hidden, &prev_actions)?;

    let slot0_obs = {
        let mut obs = Observations::new();
        obs.insert(HAS_FINISHED_ORACLE_NAV, array![[0.0f32]].into_dyn());
        obs
    };
    let nav = skills.get_mut("nav").unwrap();
    let out = nav.act(
        &slot0_obs,
        &ArrayD::zeros(IxDyn(&[1, 4])),
        &Array2::zeros((1, 3)),
        &array![true],
        &[0],
        true,
    )?;
    assert_eq!(out.actions, array![[0.0f32, 0.0, 101.0]]);

    let wait = skills.get_mut("wait").unwrap();
    let out = wait.act(
        &Observations::new(),
        &ArrayD::zeros(IxDyn(&[1, 4])),
        &Array2::zeros((1, 3)),
        &array![true],
        &[1],
        true,
    )?;
    assert_eq!(out.actions, Array2::<f32>::zeros((1, 3)));
    let term = wait.should_terminate(
        &Observations::new(),
        &ArrayD::zeros(IxDyn(&[1, 4])),
        &Array2::zeros((1, 3)),
        &array![true],
        out.actions,
        &[false],
        &[1],
        &mut [Record::empty(), Record::empty()],
    )?;
    assert_eq!(term.is_done, vec![true]);
    assert_eq!(term.bad_terminate, vec![false]);

    // Slot 1 is handed to navigation; the wait skill keeps its own record of the slot.
    let nav = skills.get_mut("nav").unwrap();
    nav.on_enter(&[vec![]], &[1], &full_obs, &hidden, &prev_actions)?;
    assert_eq!(nav.phase(0)?, SlotPhase::Active);
    assert_eq!(nav.phase(1)?, SlotPhase::Active);
    assert_eq!(skills.get("wait").unwrap().phase(1)?, SlotPhase::Done);
    assert_eq!(skills.get("wait").unwrap().phase(0)?, SlotPhase::Uninitialized);
    Ok(())
}
