use std::sync::Mutex;

use crate::domain::entities::sample::Sample;
use crate::domain::ports::store::{HealthLog, StoreError};

/// In-memory health log for testing purposes.
pub struct InMemoryHealthLog {
    samples: Mutex<Vec<Sample>>,
}

impl InMemoryHealthLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            samples: Mutex::new(Vec::new()),
        }
    }

    /// Number of appended rows, in write order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.lock().map_or(0, |s| s.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryHealthLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthLog for InMemoryHealthLog {
    fn append(&self, sample: &Sample) -> Result<(), StoreError> {
        self.samples
            .lock()
            .map_err(|_| StoreError::LogWriteError("lock poisoned".into()))?
            .push(sample.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<Sample>, StoreError> {
        let mut samples = self
            .samples
            .lock()
            .map_err(|_| StoreError::LogReadError("lock poisoned".into()))?
            .clone();
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }
}
