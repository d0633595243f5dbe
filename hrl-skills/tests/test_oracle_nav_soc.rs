use anyhow::Result;
use hrl_core::{
    error::SkillError, record::Record, ActionSpace, FullConfig, ObservationSpace, Observations,
    PddlEntity, PddlProblem, Skill, SkillConfig, SkillPolicy, SlotPhase, Space,
};
use hrl_skills::{OracleNavSocPolicy, HAS_FINISHED_ORACLE_NAV, ORACLE_NAV_SOC_ACTION};
use ndarray::{array, s, Array2, ArrayD, IxDyn};
use std::sync::Arc;

const BATCH_SIZE: usize = 2;
const FULL_AC_SIZE: usize = 10;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `arm_action` takes columns 0..5, the oracle action column 5 and
/// `rearrange_stop` columns 6..10.
fn action_space() -> ActionSpace {
    let mut space = ActionSpace::new();
    space.insert("arm_action", Space::box1(5));
    space.insert(ORACLE_NAV_SOC_ACTION, Space::box1(1));
    space.insert("rearrange_stop", Space::box1(4));
    space
}

fn observation_space() -> ObservationSpace {
    let mut space = ObservationSpace::new();
    space.insert(HAS_FINISHED_ORACLE_NAV, Space::box1(1));
    space.insert("head_depth", Space::Box { shape: vec![32, 32, 1] });
    space
}

fn config() -> SkillConfig {
    SkillConfig::default()
        .skill_name("nav_to_obj")
        .name("OracleNavSocPolicy")
        .action_name(ORACLE_NAV_SOC_ACTION)
}

fn build() -> Result<OracleNavSocPolicy> {
    OracleNavSocPolicy::from_config(
        &config(),
        &observation_space(),
        &action_space(),
        BATCH_SIZE,
        &FullConfig::default(),
    )
}

fn finished(flags: &[f32]) -> Observations {
    let mut obs = Observations::new();
    obs.insert(
        HAS_FINISHED_ORACLE_NAV,
        ArrayD::from_shape_vec(IxDyn(&[flags.len(), 1]), flags.to_vec()).unwrap(),
    );
    obs
}

fn hidden(n: usize) -> ArrayD<f32> {
    ArrayD::from_elem(IxDyn(&[n, 1, 16]), 0.25)
}

fn enter_all(skill: &mut OracleNavSocPolicy) -> Result<()> {
    let args = vec![
        vec!["any_targets|0".to_string()],
        vec!["TARGET_any_targets|0".to_string()],
    ];
    skill.on_enter(
        &args,
        &[0, 1],
        &finished(&[0.0, 0.0]),
        &hidden(BATCH_SIZE),
        &Array2::ones((BATCH_SIZE, FULL_AC_SIZE)),
    )?;
    Ok(())
}

#[test]
fn test_act_writes_oracle_action() -> Result<()> {
    init();
    let mut skill = build()?;
    enter_all(&mut skill)?;
    assert_eq!(
        skill.parse_skill_arg(&["whatever".to_string()])?.action_idx,
        100
    );

    let out = skill.act(
        &finished(&[0.0, 0.0]),
        &hidden(BATCH_SIZE),
        &Array2::zeros((BATCH_SIZE, FULL_AC_SIZE)),
        &array![true, true],
        &[0, 1],
        true,
    )?;

    let mut expected = Array2::<f32>::zeros((BATCH_SIZE, FULL_AC_SIZE));
    expected.column_mut(5).fill(101.0);
    assert_eq!(out.actions, expected);
    assert_eq!(out.rnn_hidden_states, hidden(BATCH_SIZE));
    Ok(())
}

#[test]
fn test_act_only_writes_reserved_slice() -> Result<()> {
    let mut skill = build()?;
    enter_all(&mut skill)?;

    for batch_idx in [vec![0], vec![1], vec![1, 0]].iter() {
        let n = batch_idx.len();
        let out = skill.act(
            &finished(&vec![0.0; n]),
            &hidden(n),
            &Array2::from_elem((n, FULL_AC_SIZE), 3.0),
            &ndarray::Array1::from_elem(n, true),
            batch_idx,
            false,
        )?;
        assert_eq!(out.actions.dim(), (n, FULL_AC_SIZE));
        assert!(out.actions.slice(s![.., ..5]).iter().all(|v| *v == 0.0));
        assert!(out.actions.slice(s![.., 6..]).iter().all(|v| *v == 0.0));
    }
    Ok(())
}

#[test]
fn test_deterministic_act_is_reproducible() -> Result<()> {
    let mut skill = build()?;
    enter_all(&mut skill)?;

    let act = |skill: &mut OracleNavSocPolicy| {
        skill.act(
            &finished(&[0.0, 1.0]),
            &hidden(BATCH_SIZE),
            &Array2::zeros((BATCH_SIZE, FULL_AC_SIZE)),
            &array![true, true],
            &[0, 1],
            true,
        )
    };
    let first = act(&mut skill)?;
    let second = act(&mut skill)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_fresh_entry_is_not_done() -> Result<()> {
    let mut skill = build()?;
    enter_all(&mut skill)?;

    let is_done = skill.is_skill_done(
        &finished(&[0.0, 0.0]),
        &hidden(BATCH_SIZE),
        &Array2::zeros((BATCH_SIZE, FULL_AC_SIZE)),
        &array![true, true],
        &[0, 1],
    )?;
    assert_eq!(is_done, vec![false, false]);
    assert_eq!(skill.phase(0)?, SlotPhase::Active);
    assert_eq!(skill.phase(1)?, SlotPhase::Active);
    Ok(())
}

#[test]
fn test_done_follows_finished_sensor() -> Result<()> {
    let mut skill = build()?;
    enter_all(&mut skill)?;

    let is_done = skill.is_skill_done(
        &finished(&[1.0]),
        &hidden(1),
        &Array2::zeros((1, FULL_AC_SIZE)),
        &array![true],
        &[1],
    )?;
    assert_eq!(is_done, vec![true]);
    assert_eq!(skill.phase(0)?, SlotPhase::Active);
    assert_eq!(skill.phase(1)?, SlotPhase::Done);

    // Entering again makes the slot active.
    skill.on_enter(
        &[vec![]],
        &[1],
        &finished(&[0.0, 0.0]),
        &hidden(BATCH_SIZE),
        &Array2::zeros((BATCH_SIZE, FULL_AC_SIZE)),
    )?;
    assert_eq!(skill.phase(1)?, SlotPhase::Active);
    Ok(())
}

#[test]
fn test_missing_finished_sensor_is_an_error() -> Result<()> {
    let mut skill = build()?;
    enter_all(&mut skill)?;

    let mut obs = Observations::new();
    obs.insert("head_depth", ArrayD::zeros(IxDyn(&[2, 32, 32, 1])));
    let err = skill
        .is_skill_done(
            &obs,
            &hidden(BATCH_SIZE),
            &Array2::zeros((BATCH_SIZE, FULL_AC_SIZE)),
            &array![true, true],
            &[0, 1],
        )
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<SkillError>(),
        Some(&SkillError::MissingSignal(HAS_FINISHED_ORACLE_NAV.to_string()))
    );

    let err = skill
        .should_terminate(
            &obs,
            &hidden(BATCH_SIZE),
            &Array2::zeros((BATCH_SIZE, FULL_AC_SIZE)),
            &array![true, true],
            Array2::zeros((BATCH_SIZE, FULL_AC_SIZE)),
            &[false, false],
            &[0, 1],
            &mut [Record::empty(), Record::empty()],
        )
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SkillError>(),
        Some(SkillError::MissingSignal(_))
    ));
    Ok(())
}

#[test]
fn test_missing_oracle_action_is_a_config_error() {
    let space: ActionSpace = action_space()
        .iter()
        .filter(|(k, _)| k.as_str() != ORACLE_NAV_SOC_ACTION)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let err = OracleNavSocPolicy::from_config(
        &config(),
        &observation_space(),
        &space,
        BATCH_SIZE,
        &FullConfig::default(),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err.downcast_ref::<SkillError>(),
        Some(SkillError::MissingAction { name, .. }) if name == ORACLE_NAV_SOC_ACTION
    ));
}

#[test]
fn test_other_action_name_is_a_config_error() {
    let mut space = action_space();
    space.insert("base_velocity", Space::box1(2));

    // The default action name is base_velocity.
    let default_config = SkillConfig::default().name("OracleNavSocPolicy");
    for config in [default_config, config().action_name("arm_action")].iter() {
        let err = OracleNavSocPolicy::from_config(
            config,
            &observation_space(),
            &space,
            BATCH_SIZE,
            &FullConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err.downcast_ref::<SkillError>(),
            Some(SkillError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_act_after_done_needs_reentry() -> Result<()> {
    let mut skill = build()?;
    enter_all(&mut skill)?;
    let act = |skill: &mut OracleNavSocPolicy| {
        skill.act(
            &finished(&[0.0]),
            &hidden(1),
            &Array2::zeros((1, FULL_AC_SIZE)),
            &array![true],
            &[0],
            true,
        )
    };
    act(&mut skill)?;

    skill.is_skill_done(
        &finished(&[1.0]),
        &hidden(1),
        &Array2::zeros((1, FULL_AC_SIZE)),
        &array![true],
        &[0],
    )?;
    let err = act(&mut skill).unwrap_err();
    assert_eq!(err.downcast_ref::<SkillError>(), Some(&SkillError::NotActive(0)));
    assert_eq!(skill.core().slot(0)?.steps, 1);

    skill.on_enter(
        &[vec![]],
        &[0],
        &finished(&[0.0, 0.0]),
        &hidden(BATCH_SIZE),
        &Array2::zeros((BATCH_SIZE, FULL_AC_SIZE)),
    )?;
    let out = act(&mut skill)?;
    assert_eq!(out.actions[[0, 5]], 101.0);
    assert_eq!(skill.core().slot(0)?.steps, 1);
    Ok(())
}

#[test]
fn test_non_finite_finished_reading_is_an_error() -> Result<()> {
    let mut skill = build()?;
    enter_all(&mut skill)?;

    let err = skill
        .is_skill_done(
            &finished(&[0.0, f32::NAN]),
            &hidden(BATCH_SIZE),
            &Array2::zeros((BATCH_SIZE, FULL_AC_SIZE)),
            &array![true, true],
            &[0, 1],
        )
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<SkillError>(),
        Some(&SkillError::InvalidSignal(HAS_FINISHED_ORACLE_NAV.to_string()))
    );
    assert_eq!(skill.phase(0)?, SlotPhase::Active);
    assert_eq!(skill.phase(1)?, SlotPhase::Active);
    Ok(())
}

#[test]
fn test_pddl_problem_entities_are_ordered() -> Result<()> {
    let mut skill = build()?;
    let problem = Arc::new(PddlProblem::new(vec![
        PddlEntity::new("robot_0", "robot_entity_type"),
        PddlEntity::new("any_targets|0", "movable_entity_type"),
    ]));
    skill.set_pddl_problem(problem.clone())?;

    let names: Vec<_> = skill.all_entities().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["any_targets|0", "robot_0"]);
    assert!(Arc::ptr_eq(skill.core().pddl_problem().unwrap(), &problem));
    Ok(())
}
