//! Per-record single-flight: at most one mutation per record at a time.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{DeskError, Result};
use crate::types::RecordId;

#[derive(Debug, Default, Clone)]
pub struct SingleFlight {
    in_flight: Arc<Mutex<HashSet<RecordId>>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for the lifetime of the returned guard, or fail with
    /// [`DeskError::Busy`] if another mutation already holds it.
    pub fn acquire(&self, id: RecordId) -> Result<FlightGuard> {
        if !self.in_flight.lock().insert(id) {
            tracing::debug!(id, "rejecting mutation, record busy");
            return Err(DeskError::Busy(id));
        }
        Ok(FlightGuard {
            id,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    pub fn is_busy(&self, id: RecordId) -> bool {
        self.in_flight.lock().contains(&id)
    }
}

/// Releases the record when dropped.
#[derive(Debug)]
pub struct FlightGuard {
    id: RecordId,
    in_flight: Arc<Mutex<HashSet<RecordId>>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.id);
    }
}
