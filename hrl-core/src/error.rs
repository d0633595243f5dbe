//! Errors in the library.
use thiserror::Error;

/// Errors raised by skills and the types they work on.
///
/// Public functions of this crate return [`anyhow::Result`]; the typed error can be
/// recovered with `err.downcast_ref::<SkillError>()`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkillError {
    /// The configured action name is not in the full action space.
    #[error("Action `{name}` is not in the action space {available:?}")]
    MissingAction {
        /// Name that was looked up.
        name: String,

        /// Names present in the action space.
        available: Vec<String>,
    },

    /// A configured observation key is not in the full observation space.
    #[error("Observation key `{0}` is not in the observation space")]
    MissingObservationKey(String),

    /// A sensor required at call time is absent from the observations.
    #[error("Sensor `{0}` is missing from the observations")]
    MissingSignal(String),

    /// A skill argument outside the domain accepted by the skill.
    #[error("Invalid skill argument {arg:?}: {reason}")]
    InvalidSkillArg {
        /// Raw argument given by the planner.
        arg: Vec<String>,

        /// Why it was rejected.
        reason: String,
    },

    /// Batch slot index not smaller than the batch size.
    #[error("Batch slot {slot} is out of range for batch size {batch_size}")]
    SlotOutOfRange {
        /// Offending slot.
        slot: usize,

        /// Number of slots.
        batch_size: usize,
    },

    /// The slot was used before `on_enter` was called for it.
    #[error("Batch slot {0} has not entered the skill")]
    NotEntered(usize),

    /// The slot is not running the skill, e.g. it finished and has not re-entered.
    #[error("Batch slot {0} is not active in the skill")]
    NotActive(usize),

    /// A configuration value the skill cannot work with.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A sensor reading that is not a usable value, such as NaN.
    #[error("Sensor `{0}` has a non-finite reading")]
    InvalidSignal(String),

    /// Batched inputs disagree with `batch_idx` or with the action space.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// No skill variant with the given name.
    #[error("Unknown skill policy `{0}`")]
    UnknownPolicy(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
