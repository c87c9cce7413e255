use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::error::StorageError;

/// Field identifier → raw answer. Key order carries no meaning.
pub type FormRecord = BTreeMap<String, String>;

/// The persisted draft: a snapshot of the answers plus when it was taken.
///
/// Serialized as `{"data": {...}, "timestamp": "<RFC 3339>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub data: FormRecord,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub timestamp: String,
}

impl DraftRecord {
    pub fn new(data: FormRecord, saved_at: OffsetDateTime) -> Result<Self, StorageError> {
        let timestamp = saved_at
            .format(&Rfc3339)
            .map_err(|e| StorageError::Malformed(format!("unformattable timestamp: {}", e)))?;
        Ok(DraftRecord { data, timestamp })
    }

    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Malformed(e.to_string()))
    }

    pub fn saved_at(&self) -> Result<OffsetDateTime, StorageError> {
        OffsetDateTime::parse(&self.timestamp, &Rfc3339).map_err(|e| {
            StorageError::Malformed(format!("bad timestamp {:?}: {}", self.timestamp, e))
        })
    }

    /// Milliseconds since the Unix epoch at which the draft was taken.
    pub fn saved_at_epoch_millis(&self) -> Result<i64, StorageError> {
        let millis = self.saved_at()?.unix_timestamp_nanos() / 1_000_000;
        i64::try_from(millis)
            .map_err(|_| StorageError::Malformed("timestamp out of range".to_string()))
    }

    /// Time elapsed between the save and `now`. Negative if the clock went backwards.
    pub fn age(&self, now: OffsetDateTime) -> Result<Duration, StorageError> {
        Ok(now - self.saved_at()?)
    }
}
