//! Measurement record data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One measurement entry
///
/// `id` and `timestamp` are fixed at creation; the remaining fields can be
/// overwritten through [`crate::Store::update`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Store-assigned identifier, unique within the collection
    pub id: u64,

    /// When the record was created
    pub timestamp: DateTime<Utc>,

    /// Where the measurement came from
    pub source: String,

    /// Measured value
    pub measurement: f64,

    /// Event label
    pub event: String,
}

impl Record {
    /// Create a record stamped with the current time
    pub fn new(id: u64, source: String, measurement: f64, event: String) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            source,
            measurement,
            event,
        }
    }

    /// Overwrite the mutable fields
    pub fn set_fields(&mut self, source: String, measurement: f64, event: String) {
        self.source = source;
        self.measurement = measurement;
        self.event = event;
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} [{}] {} = {} ({})",
            self.id,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.source,
            self.measurement,
            self.event
        )
    }
}
