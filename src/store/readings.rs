use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::Reading;

/// Every reading seen so far, in arrival order.
///
/// Starts unloaded; the source dataset is loaded into it once, after which
/// it only grows.
#[derive(Debug, Default)]
pub struct ReadingHistory {
    initialized: bool,
    readings: Vec<Reading>,
}

impl ReadingHistory {
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Seeds the history from the source dataset.
    ///
    /// An empty dataset is an error and leaves the history unloaded.
    pub fn load(&mut self, readings: Vec<Reading>) -> Result<()> {
        if readings.is_empty() {
            return Err(Error::EmptyDataset);
        }
        info!("Successfully loaded {} patient records", readings.len());
        self.readings = readings;
        self.initialized = true;
        Ok(())
    }

    pub fn append(&mut self, readings: Vec<Reading>) {
        self.readings.extend(readings);
    }
}

#[derive(Debug, Default)]
pub struct ReadingStore {
    inner: RwLock<ReadingHistory>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, ReadingHistory> {
        self.inner.read().await
    }

    /// Exclusive access for the load-expand-append cycle.
    pub async fn write(&self) -> RwLockWriteGuard<'_, ReadingHistory> {
        self.inner.write().await
    }
}
