//! Per-slot state of a batch.
use crate::error::SkillError;

/// One record per batch slot, addressed by slot index.
///
/// Records are reset explicitly; a slot not named in a reset keeps its record.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchSlots<T> {
    slots: Vec<T>,
}

impl<T: Default> BatchSlots<T> {
    /// Creates `batch_size` default records.
    pub fn new(batch_size: usize) -> Self {
        Self {
            slots: (0..batch_size).map(|_| T::default()).collect(),
        }
    }

    /// Resets the records of `batch_idx` to their default.
    ///
    /// All indices are checked before any record is touched.
    pub fn reset(&mut self, batch_idx: &[usize]) -> Result<(), SkillError> {
        for &i in batch_idx {
            self.check(i)?;
        }
        for &i in batch_idx {
            self.slots[i] = T::default();
        }
        Ok(())
    }
}

impl<T> BatchSlots<T> {
    fn check(&self, slot: usize) -> Result<(), SkillError> {
        if slot < self.slots.len() {
            Ok(())
        } else {
            Err(SkillError::SlotOutOfRange {
                slot,
                batch_size: self.slots.len(),
            })
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if there is no slot.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record of a slot.
    pub fn get(&self, slot: usize) -> Result<&T, SkillError> {
        self.check(slot)?;
        Ok(&self.slots[slot])
    }

    /// Mutable record of a slot.
    pub fn get_mut(&mut self, slot: usize) -> Result<&mut T, SkillError> {
        self.check(slot)?;
        Ok(&mut self.slots[slot])
    }

    /// Iterates over all records in slot order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.slots.iter()
    }
}
