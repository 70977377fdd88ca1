//! Payload encoding
//!
//! This module encodes a [`DayReport`] into the JSON payload handed to a
//! rendering collaborator. Instants are written as RFC 3339 strings in the
//! location's own offset; nothing in the payload depends on when it was encoded.

use crate::error::HoursError;
use crate::types::{DayReport, HoursPayload, PayloadLocation, Producer};
use crate::{HOURS_VERSION, PRODUCER_NAME};
use chrono::SecondsFormat;

/// Current payload schema version
pub const PAYLOAD_VERSION: &str = "1.0.0";

/// Encoder for day reports
#[derive(Debug, Clone, Default)]
pub struct ReportEncoder {
    pretty: bool,
}

impl ReportEncoder {
    /// Create an encoder producing compact JSON
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Create an encoder producing indented JSON
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Build the payload for a report
    pub fn encode(&self, report: &DayReport) -> HoursPayload {
        let producer = Producer {
            name: PRODUCER_NAME.to_string(),
            version: HOURS_VERSION.to_string(),
        };

        let location = PayloadLocation {
            name: report.location.name.clone(),
            latitude: report.location.coordinates.latitude,
            longitude: report.location.coordinates.longitude,
            utc_offset_minutes: report.location.utc_offset_minutes,
        };

        let stamp = |dt: &chrono::DateTime<chrono::FixedOffset>| {
            dt.to_rfc3339_opts(SecondsFormat::Millis, false)
        };

        HoursPayload {
            payload_version: PAYLOAD_VERSION.to_string(),
            producer,
            date: report.date.format("%Y-%m-%d").to_string(),
            location,
            day_ruler: report.day_ruler,
            sunrise: stamp(&report.sun_times.sunrise),
            sunset: stamp(&report.sun_times.sunset),
            next_sunrise: stamp(&report.sun_times.next_sunrise()),
            evaluated_at: stamp(&report.evaluated_at),
            active_index: report.active_index,
            hours: report.hours.clone(),
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, report: &DayReport) -> Result<String, HoursError> {
        let payload = self.encode(report);
        let json = if self.pretty {
            serde_json::to_string_pretty(&payload)?
        } else {
            serde_json::to_string(&payload)?
        };
        Ok(json)
    }
}
