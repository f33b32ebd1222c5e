//! The record under detail focus.
//!
//! At most one record is focused at a time. Loads are tagged so that a
//! response for a record the user has already navigated away from cannot
//! overwrite the slot.

use crate::error::Result;
use crate::types::{Record, RecordId};

/// Ticket for an in-flight detail load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailLoad {
    pub id: RecordId,
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct CurrentRecord<T> {
    focus: Option<RecordId>,
    record: Option<T>,
    seq: u64,
}

impl<T> Default for CurrentRecord<T> {
    fn default() -> Self {
        Self {
            focus: None,
            record: None,
            seq: 0,
        }
    }
}

impl<T: Record> CurrentRecord<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus `id` and start loading it. Any previously loaded record is
    /// dropped so a stale copy is never shown under the new focus.
    pub fn open(&mut self, id: RecordId) -> DetailLoad {
        self.seq += 1;
        self.focus = Some(id);
        self.record = None;
        DetailLoad { id, seq: self.seq }
    }

    /// Apply a load result. Returns `Ok(true)` when it was stored and
    /// `Ok(false)` when focus had moved on in the meantime.
    pub fn complete(&mut self, load: DetailLoad, result: Result<T>) -> Result<bool> {
        if load.seq != self.seq || self.focus != Some(load.id) {
            tracing::debug!(id = load.id, "discarding detail load for unfocused record");
            return Ok(false);
        }
        self.record = Some(result?);
        Ok(true)
    }

    /// Replace the focused record after a mutation addressed it.
    pub fn refresh(&mut self, record: T) -> bool {
        if self.focus == Some(record.id()) {
            self.record = Some(record);
            true
        } else {
            false
        }
    }

    /// Empty the slot if it holds `id`.
    pub fn clear_if(&mut self, id: RecordId) -> bool {
        if self.focus == Some(id) {
            self.close();
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.focus = None;
        self.record = None;
    }

    pub fn focused_id(&self) -> Option<RecordId> {
        self.focus
    }

    pub fn get(&self) -> Option<&T> {
        self.record.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.focus.is_none()
    }
}
