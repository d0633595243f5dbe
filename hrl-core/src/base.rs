//! Core functionalities.
mod obs;
mod pddl;
mod skill;
mod slots;
mod space;
pub use obs::{Observations, PolicyActionData};
pub use pddl::{PddlEntity, PddlProblem};
pub use skill::{Skill, SkillArg, SkillCore, SkillPolicy, SkillSlot, SlotPhase, Termination};
pub use slots::BatchSlots;
pub use space::{ActionSpace, ObservationSpace, Space};
