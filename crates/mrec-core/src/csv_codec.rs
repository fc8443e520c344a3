//! Row encoding for the records CSV file
//!
//! Columns, no header: `timestamp, id, source, measurement, event`.

use crate::{Error, LoadPolicy, Record, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use csv::StringRecord;
use tracing::warn;

/// Largest identifier accepted from a file; leaves the counter room to grow
pub const MAX_ID: u64 = i64::MAX as u64;

/// Encode one record as a CSV row
///
/// Timestamps are RFC 3339 in UTC; sub-second digits are written only when
/// present. Measurements use the shortest text that parses back to the same
/// `f64`.
pub fn encode_row(record: &Record) -> [String; 5] {
    [
        record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        record.id.to_string(),
        record.source.clone(),
        record.measurement.to_string(),
        record.event.clone(),
    ]
}

/// Decode one CSV row
///
/// `row_num` is 1-based and only used for diagnostics. Returns `Ok(None)`
/// when the policy drops the row.
pub fn decode_row(row: &StringRecord, row_num: usize, policy: LoadPolicy) -> Result<Option<Record>> {
    let timestamp = row.get(0).and_then(parse_timestamp);
    let id = row
        .get(1)
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&id| id <= MAX_ID);
    let source = row.get(2);
    let measurement = row.get(3).and_then(|s| s.parse::<f64>().ok());
    let event = row.get(4);

    let bad: Vec<&'static str> = [
        ("timestamp", timestamp.is_none()),
        ("id", id.is_none()),
        ("source", source.is_none()),
        ("measurement", measurement.is_none()),
        ("event", event.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, missing)| missing.then_some(field))
    .collect();

    if let Some(&field) = bad.first() {
        match policy {
            LoadPolicy::Reject => return Err(Error::Malformed { row: row_num, field }),
            LoadPolicy::Skip => {
                warn!(row = row_num, fields = ?bad, "skipping malformed row");
                return Ok(None);
            }
            LoadPolicy::ZeroFill => {
                warn!(row = row_num, fields = ?bad, "zero-filling malformed fields");
            }
        }
    }

    Ok(Some(Record {
        id: id.unwrap_or_default(),
        timestamp: timestamp.unwrap_or_default(),
        source: source.unwrap_or_default().to_string(),
        measurement: measurement.unwrap_or_default(),
        event: event.unwrap_or_default().to_string(),
    }))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
