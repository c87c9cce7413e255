//! The single expiring draft slot.
//!
//! Storage is best-effort: `save`, `load` and `clear` never return an error.
//! Failures are logged at `warn` and reported as "nothing happened". The
//! `try_*` variants expose the underlying result for callers that care.

use std::sync::Arc;

use time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::error::StorageError;
use crate::record::{DraftRecord, FormRecord};
use crate::traits::{check_key, KeyValueStore};

/// Well-known key the draft lives under.
pub const DEFAULT_DRAFT_KEY: &str = "kudos_testimonial_draft";

/// Drafts at least this old are ignored on load.
pub const DEFAULT_DRAFT_TTL: Duration = Duration::hours(24);

pub struct DraftStore {
    backend: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    ttl: Duration,
}

impl DraftStore {
    /// Draft slot on `backend` with the default key, TTL and the system clock.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        DraftStore {
            backend,
            clock: Arc::new(SystemClock),
            key: DEFAULT_DRAFT_KEY.to_string(),
            ttl: DEFAULT_DRAFT_TTL,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Persist `record` stamped with the current time, overwriting any
    /// previous draft. Returns `true` if the write landed.
    pub fn save(&self, record: &FormRecord) -> bool {
        match self.try_save(record) {
            Ok(()) => {
                tracing::debug!(key = %self.key, fields = record.len(), "draft saved");
                true
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "draft save skipped");
                false
            }
        }
    }

    pub fn try_save(&self, record: &FormRecord) -> Result<(), StorageError> {
        check_key(&self.key)?;
        let draft = DraftRecord::new(record.clone(), self.clock.now())?;
        self.backend.set(&self.key, &draft.to_json()?)
    }

    /// The stored snapshot, unless it is missing, unreadable, or stale.
    ///
    /// Stale drafts are ignored, not deleted.
    pub fn load(&self) -> Option<FormRecord> {
        match self.try_load() {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "draft unreadable, ignoring");
                None
            }
        }
    }

    pub fn try_load(&self) -> Result<Option<FormRecord>, StorageError> {
        let raw = match self.backend.get(&self.key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let draft = DraftRecord::from_json(&raw)?;
        let age = draft.age(self.clock.now())?;
        if age >= self.ttl {
            tracing::debug!(key = %self.key, age_secs = age.whole_seconds(), "draft expired");
            return Ok(None);
        }
        Ok(Some(draft.data))
    }

    /// Remove the draft. Returns `true` if the backend accepted the removal.
    pub fn clear(&self) -> bool {
        match self.backend.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "draft clear failed");
                false
            }
        }
    }
}
