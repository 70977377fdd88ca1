//! Error types for the planetary hours engine

use thiserror::Error;

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum HoursError {
    #[error("Invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Invalid UTC offset: {0} minutes")]
    InvalidUtcOffset(i32),

    #[error("No sun event: {0}")]
    NoSunEvent(String),

    #[error("Invalid day ruler: {0}")]
    InvalidRuler(String),

    #[error("Invalid natal data: {0}")]
    InvalidNatalData(String),

    #[error("Invalid ecliptic longitude: {0}")]
    InvalidLongitude(f64),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),
}
