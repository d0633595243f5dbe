//! Records attached to batch slots.
//!
//! A skill reports per-slot diagnostics, such as the name of a skill that ended
//! by timeout, as [`Record`]s. The orchestrator owns one record per slot and
//! passes them to [`Skill::should_terminate`](crate::Skill::should_terminate).
//!
//! ```rust
//! use hrl_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("failed_skill", RecordValue::String("nav".to_string()));
//! record.insert("skill_steps", RecordValue::Scalar(200.0));
//! assert_eq!(record.get_string("failed_skill").unwrap(), "nav");
//! ```
mod base;

pub use base::{Record, RecordValue};
