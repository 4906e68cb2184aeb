//! Telemetry Record - One decoded sensor sample
//!
//! Created at the transport boundary (see `decode`), moved by value into
//! the ingress queue, and owned by the window store until evicted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// SENSOR FIELDS
// ============================================================================

/// Numeric sensor fields carried by a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorField {
    Temperature,
    Vibration,
    Pressure,
    MotorCurrent,
    Power,
}

impl SensorField {
    pub const ALL: [SensorField; 5] = [
        SensorField::Temperature,
        SensorField::Vibration,
        SensorField::Pressure,
        SensorField::MotorCurrent,
        SensorField::Power,
    ];

    /// Payload key for this field
    pub fn name(self) -> &'static str {
        match self {
            SensorField::Temperature => "temperature",
            SensorField::Vibration => "vibration",
            SensorField::Pressure => "pressure",
            SensorField::MotorCurrent => "motor_current",
            SensorField::Power => "power",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for SensorField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// Telemetry sample
///
/// Sensor values are unit-less floats. Any of them may be absent when the
/// feed does not carry it; feature extraction reports what is missing.
/// `failure` is the advisory label from the source, not authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
    pub vibration: Option<f64>,
    pub pressure: Option<f64>,
    pub motor_current: Option<f64>,
    pub power: Option<f64>,
    pub failure: Option<bool>,
}

impl Record {
    /// Create an empty record at the given time
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            temperature: None,
            vibration: None,
            pressure: None,
            motor_current: None,
            power: None,
            failure: None,
        }
    }

    pub fn builder(timestamp: DateTime<Utc>) -> RecordBuilder {
        RecordBuilder::new(timestamp)
    }

    /// Get a sensor value by field
    pub fn value(&self, field: SensorField) -> Option<f64> {
        match field {
            SensorField::Temperature => self.temperature,
            SensorField::Vibration => self.vibration,
            SensorField::Pressure => self.pressure,
            SensorField::MotorCurrent => self.motor_current,
            SensorField::Power => self.power,
        }
    }

    /// Set a sensor value by field
    pub fn set_value(&mut self, field: SensorField, value: Option<f64>) {
        match field {
            SensorField::Temperature => self.temperature = value,
            SensorField::Vibration => self.vibration = value,
            SensorField::Pressure => self.pressure = value,
            SensorField::MotorCurrent => self.motor_current = value,
            SensorField::Power => self.power = value,
        }
    }
}

// ============================================================================
// BUILDER PATTERN
// ============================================================================

/// Builder for creating Record with named setters
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self { record: Record::new(timestamp) }
    }

    pub fn temperature(mut self, value: f64) -> Self {
        self.record.temperature = Some(value);
        self
    }

    pub fn vibration(mut self, value: f64) -> Self {
        self.record.vibration = Some(value);
        self
    }

    pub fn pressure(mut self, value: f64) -> Self {
        self.record.pressure = Some(value);
        self
    }

    pub fn motor_current(mut self, value: f64) -> Self {
        self.record.motor_current = Some(value);
        self
    }

    pub fn power(mut self, value: f64) -> Self {
        self.record.power = Some(value);
        self
    }

    pub fn failure(mut self, value: bool) -> Self {
        self.record.failure = Some(value);
        self
    }

    /// Set a sensor value by field
    pub fn set(mut self, field: SensorField, value: f64) -> Self {
        self.record.set_value(field, Some(value));
        self
    }

    pub fn build(self) -> Record {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builder_sets_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 25, 8, 0, 0).unwrap();
        let record = Record::builder(ts)
            .temperature(71.5)
            .set(SensorField::Pressure, 101.0)
            .failure(true)
            .build();

        assert_eq!(record.timestamp, ts);
        assert_eq!(record.value(SensorField::Temperature), Some(71.5));
        assert_eq!(record.value(SensorField::Pressure), Some(101.0));
        assert_eq!(record.value(SensorField::Vibration), None);
        assert_eq!(record.failure, Some(true));
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in SensorField::ALL {
            assert_eq!(SensorField::from_name(field.name()), Some(field));
        }
        assert_eq!(SensorField::from_name("failure"), None);
    }
}
