//! Utilities for locating sub-actions in the full action vector.
use crate::{error::SkillError, ActionSpace};
use std::ops::Range;

/// Position of a named sub-action within the flattened full action vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRange {
    /// Name of the sub-action.
    pub name: String,

    /// Index of the first entry.
    pub start: usize,

    /// Number of entries.
    pub len: usize,
}

impl ActionRange {
    /// The half-open index range `[start, start + len)`.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }

    /// Returns `true` if `ix` lies in this sub-action.
    pub fn contains(&self, ix: usize) -> bool {
        self.range().contains(&ix)
    }
}

/// Finds where the sub-action `name` lives in the flattened action vector of `action_space`.
///
/// The offset is the sum of the flattened sizes of all sub-actions ordered before `name`.
pub fn find_action_range(action_space: &ActionSpace, name: &str) -> Result<ActionRange, SkillError> {
    let mut start = 0;
    for (k, space) in action_space.iter() {
        if k == name {
            return Ok(ActionRange {
                name: name.to_string(),
                start,
                len: space.flat_dim(),
            });
        }
        start += space.flat_dim();
    }
    Err(SkillError::MissingAction {
        name: name.to_string(),
        available: action_space.names(),
    })
}
