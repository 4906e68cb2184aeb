//! Payload Decoder - Transport boundary
//!
//! Maps a loosely-typed JSON payload into the fixed `Record` shape.
//! Anything that does not fit is rejected here so malformed data never
//! reaches the ingress queue.
//!
//! Two payload shapes are accepted:
//! - flat: `{"timestamp": "2024-03-25T08:00:00", "temperature": 71.2, ...}`
//! - column-wrapped (CSV streamer): `{"timestamp": ["..."], "temperature": [71.2], ...}`

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use super::record::{Record, SensorField};
use crate::constants::DEFAULT_VOLTAGE;

/// Naive timestamp formats, interpreted as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Offset timestamp formats not covered by RFC 3339
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unparseable timestamp: {0}")]
    InvalidTimestamp(String),
}

// ============================================================================
// DECODER
// ============================================================================

/// Payload decoder
#[derive(Debug, Clone)]
pub struct Decoder {
    voltage: f64,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DEFAULT_VOLTAGE)
    }
}

impl Decoder {
    /// `voltage` derives power from motor current when a payload omits it
    pub fn new(voltage: f64) -> Self {
        Self { voltage }
    }

    /// Decode raw payload bytes
    pub fn decode(&self, payload: &[u8]) -> Result<Record, DecodeError> {
        let value: Value = serde_json::from_slice(payload)
            .map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
        self.decode_value(&value)
    }

    /// Decode an already parsed JSON value
    pub fn decode_value(&self, value: &Value) -> Result<Record, DecodeError> {
        let object = value.as_object().ok_or(DecodeError::NotAnObject)?;

        let raw_ts = field(object, "timestamp")?
            .ok_or(DecodeError::MissingField("timestamp"))?;
        let mut record = Record::new(parse_timestamp(raw_ts)?);

        for sensor in SensorField::ALL {
            let value = match field(object, sensor.name())? {
                Some(raw) => parse_number(sensor.name(), raw)?,
                None => None,
            };
            record.set_value(sensor, value);
        }

        if record.power.is_none() {
            record.power = record.motor_current.map(|current| current * self.voltage);
        }

        record.failure = match field(object, "failure")? {
            Some(raw) => parse_flag(raw)?,
            None => None,
        };

        Ok(record)
    }
}

/// Decode with the default voltage
pub fn decode(payload: &[u8]) -> Result<Record, DecodeError> {
    Decoder::default().decode(payload)
}

// ============================================================================
// FIELD PARSING
// ============================================================================

/// Look up a key, unwrapping single-element column lists
fn field<'a>(object: &'a Map<String, Value>, key: &'static str) -> Result<Option<&'a Value>, DecodeError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => match items.as_slice() {
            [Value::Null] => Ok(None),
            [single] => Ok(Some(single)),
            _ => Err(DecodeError::InvalidField {
                field: key,
                reason: format!("expected a single value, got a list of {}", items.len()),
            }),
        },
        Some(other) => Ok(Some(other)),
    }
}

fn parse_number(field: &'static str, raw: &Value) -> Result<Option<f64>, DecodeError> {
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(Some(n)),
        Some(n) => Err(DecodeError::InvalidField {
            field,
            reason: format!("non-finite value {}", n),
        }),
        None => Err(DecodeError::InvalidField {
            field,
            reason: format!("expected a number, got {}", raw),
        }),
    }
}

fn parse_flag(raw: &Value) -> Result<Option<bool>, DecodeError> {
    let invalid = || DecodeError::InvalidField {
        field: "failure",
        reason: format!("expected 0/1 or a boolean, got {}", raw),
    };

    match raw {
        Value::Bool(b) => Ok(Some(*b)),
        Value::Number(n) => n.as_f64().map(|v| Some(v != 0.0)).ok_or_else(invalid),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Ok(Some(true))
            } else if s.eq_ignore_ascii_case("false") {
                Ok(Some(false))
            } else {
                match s.parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(Some(v != 0.0)),
                    _ => Err(invalid()),
                }
            }
        }
        _ => Err(invalid()),
    }
}

/// Parse a timestamp from any of the encodings the feeds use
pub fn parse_timestamp(raw: &Value) -> Result<DateTime<Utc>, DecodeError> {
    match raw {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => {
            let secs = n
                .as_f64()
                .ok_or_else(|| DecodeError::InvalidTimestamp(n.to_string()))?;
            let millis = (secs * 1000.0).round();
            if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
                return Err(DecodeError::InvalidTimestamp(n.to_string()));
            }
            Utc.timestamp_millis_opt(millis as i64)
                .single()
                .ok_or_else(|| DecodeError::InvalidTimestamp(n.to_string()))
        }
        other => Err(DecodeError::InvalidTimestamp(other.to_string())),
    }
}

fn parse_timestamp_str(s: &str) -> Result<DateTime<Utc>, DecodeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(DecodeError::InvalidTimestamp(s.to_string()))
}
