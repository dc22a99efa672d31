use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A timezone-aware instant.
///
/// Naive (offset-less) instants are rejected at construction; a default zone
/// is never assumed. Query strings therefore always render timestamps in full
/// RFC 3339 form with an explicit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp(DateTime<FixedOffset>);

impl Timestamp {
    /// Parse an RFC 3339 date-time with a mandatory offset
    pub fn parse(input: &str) -> Result<Self> {
        match DateTime::parse_from_rfc3339(input) {
            Ok(instant) => Ok(Self(instant)),
            Err(_) => {
                if input.parse::<NaiveDateTime>().is_ok() {
                    Err(Error::InvalidTimestamp(format!(
                        "the time {input} has no timezone offset"
                    )))
                } else {
                    Err(Error::InvalidTimestamp(format!(
                        "{input} is not a valid RFC 3339 date-time"
                    )))
                }
            }
        }
    }

    /// Render in full RFC 3339 form, offset included
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// The underlying instant
    pub fn as_datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self(instant)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant.fixed_offset())
    }
}

impl TryFrom<NaiveDateTime> for Timestamp {
    type Error = Error;

    fn try_from(instant: NaiveDateTime) -> std::result::Result<Self, Error> {
        Err(Error::InvalidTimestamp(format!(
            "the time {instant} has no timezone offset"
        )))
    }
}

/// A single field value on a point or frame cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    Boolean(bool),
    Text(String),
}

impl FieldValue {
    /// Render as a line protocol field value
    pub fn to_line_protocol(&self) -> String {
        match self {
            FieldValue::Float(value) => value.to_string(),
            FieldValue::Integer(value) => format!("{value}i"),
            FieldValue::Boolean(value) => value.to_string(),
            FieldValue::Text(value) => {
                format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
            }
        }
    }

    /// Render as a tag value (unquoted, untyped)
    pub fn as_tag_text(&self) -> String {
        match self {
            FieldValue::Float(value) => value.to_string(),
            FieldValue::Integer(value) => value.to_string(),
            FieldValue::Boolean(value) => value.to_string(),
            FieldValue::Text(value) => value.clone(),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// One measurement write unit: measurement name, tags, fields, timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
    timestamp: Option<DateTime<Utc>>,
}

impl Point {
    /// Start a point for the given measurement
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    /// Add a tag
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Add a field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Set the point timestamp
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Convert to line protocol.
    /// Format: `<measurement>[,<tag>=<value>...] <field>=<value>[,...] [<timestamp>]`
    pub fn to_line_protocol(&self) -> Result<String> {
        if self.fields.is_empty() {
            return Err(Error::LineProtocol(format!(
                "point for measurement {:?} has no fields",
                self.measurement
            )));
        }

        let mut line = escape_measurement(&self.measurement);

        // Tags are sorted for a stable series key
        let mut tags = self.tags.clone();
        tags.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, value) in &tags {
            line.push(',');
            line.push_str(&escape_tag_key(key));
            line.push('=');
            line.push_str(&escape_tag_value(value));
        }

        line.push(' ');
        for (position, (key, value)) in self.fields.iter().enumerate() {
            if position > 0 {
                line.push(',');
            }
            line.push_str(&escape_tag_key(key));
            line.push('=');
            line.push_str(&value.to_line_protocol());
        }

        if let Some(timestamp) = self.timestamp {
            let nanos = timestamp
                .timestamp_nanos_opt()
                .unwrap_or(timestamp.timestamp() * 1_000_000_000);
            line.push(' ');
            line.push_str(&nanos.to_string());
        }

        Ok(line)
    }
}

/// One raw result table from a Flux query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxTable {
    /// Group key tags shared by the table's records
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// The table's records
    #[serde(default)]
    pub records: Vec<FluxRecord>,
}

/// One record inside a Flux result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxRecord {
    /// Window or sample time
    #[serde(rename = "_time")]
    pub time: Option<DateTime<Utc>>,
    /// Aggregated value; absent for empty windows
    #[serde(rename = "_value")]
    pub value: Option<f64>,
    /// Remaining columns, all tag-valued
    #[serde(flatten)]
    pub tags: HashMap<String, String>,
}

/// Escape special characters in measurement names for line protocol
pub(crate) fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Escape special characters in tag and field keys for line protocol
pub(crate) fn escape_tag_key(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// Escape special characters in tag values for line protocol
pub(crate) fn escape_tag_value(s: &str) -> String {
    s.replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_timestamp_parse_with_offset() {
        let ts = Timestamp::parse("2025-01-15T10:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-01-15T10:00:00+02:00");
    }

    #[test]
    fn test_timestamp_parse_utc() {
        let ts = Timestamp::parse("2025-01-15T10:00:00Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-01-15T10:00:00+00:00");
    }

    #[test]
    fn test_timestamp_parse_naive_rejected() {
        let result = Timestamp::parse("2025-01-15T10:00:00");
        assert!(matches!(result, Err(Error::InvalidTimestamp(_))));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("no timezone offset"));
    }

    #[test]
    fn test_timestamp_parse_garbage_rejected() {
        let result = Timestamp::parse("not-a-datetime");
        assert!(matches!(result, Err(Error::InvalidTimestamp(_))));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("not a valid RFC 3339 date-time"));
    }

    #[test]
    fn test_timestamp_try_from_naive_rejected() {
        let naive = NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let result = Timestamp::try_from(naive);
        assert!(matches!(result, Err(Error::InvalidTimestamp(_))));
    }

    #[test]
    fn test_timestamp_from_utc_keeps_offset() {
        let utc = DateTime::parse_from_rfc3339("2025-01-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let ts = Timestamp::from(utc);
        assert_eq!(ts.to_rfc3339(), "2025-01-15T10:00:00+00:00");
    }

    #[test]
    fn test_field_value_rendering() {
        assert_eq!(FieldValue::Float(85.5).to_line_protocol(), "85.5");
        assert_eq!(FieldValue::Integer(7).to_line_protocol(), "7i");
        assert_eq!(FieldValue::Boolean(true).to_line_protocol(), "true");
        assert_eq!(
            FieldValue::Text("say \"hi\"".to_string()).to_line_protocol(),
            "\"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn test_point_to_line_protocol_simple() {
        let timestamp = DateTime::parse_from_rfc3339("2025-01-15T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let point = Point::new("room_climate")
            .field("value", 85.5)
            .timestamp(timestamp);

        let line = point.to_line_protocol().unwrap();
        assert!(line.starts_with("room_climate value=85.5"));
        assert!(line.contains("1736935200000000000"));
    }

    #[test]
    fn test_point_to_line_protocol_sorts_tags() {
        let point = Point::new("room_climate")
            .tag("host", "node-1")
            .tag("device", "sensor-7")
            .field("value", 20.0);

        let line = point.to_line_protocol().unwrap();
        assert!(line.starts_with("room_climate,device=sensor-7,host=node-1 "));
    }

    #[test]
    fn test_point_without_fields_rejected() {
        let point = Point::new("room_climate").tag("device", "sensor-7");
        assert!(matches!(
            point.to_line_protocol(),
            Err(Error::LineProtocol(_))
        ));
    }

    #[test]
    fn test_escape_tag_key() {
        assert_eq!(escape_tag_key("simple"), "simple");
        assert_eq!(escape_tag_key("with space"), "with\\ space");
        assert_eq!(escape_tag_key("with,comma"), "with\\,comma");
        assert_eq!(escape_tag_key("with=equals"), "with\\=equals");
    }

    #[test]
    fn test_escape_measurement() {
        assert_eq!(escape_measurement("room climate"), "room\\ climate");
        assert_eq!(escape_measurement("a,b"), "a\\,b");
    }
}
