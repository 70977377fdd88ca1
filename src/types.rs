//! Core types for the planetary hours engine
//!
//! This module defines the static reference data (planets, Chaldean order, zodiac
//! signs) and the values that flow through each stage of the engine: validated
//! location, sun times, raw planetary hours, enriched hours and the day report.
//!
//! Every instant is a `DateTime<FixedOffset>` expressed in the local civil time of
//! the location, i.e. UTC shifted by `Location::utc_offset_minutes`.

use crate::error::HoursError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest accepted UTC offset, in minutes (+/-18h)
pub const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// The seven classical planets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Planet {
    Saturn,
    Jupiter,
    Mars,
    Sun,
    Venus,
    Mercury,
    Moon,
}

/// Chaldean order, slowest to fastest apparent motion
pub const CHALDEAN_ORDER: [Planet; 7] = [
    Planet::Saturn,
    Planet::Jupiter,
    Planet::Mars,
    Planet::Sun,
    Planet::Venus,
    Planet::Mercury,
    Planet::Moon,
];

/// Ruler of the first hour for each weekday, indexed from Sunday = 0
pub const DAY_RULERS: [Planet; 7] = [
    Planet::Sun,
    Planet::Moon,
    Planet::Mars,
    Planet::Mercury,
    Planet::Jupiter,
    Planet::Venus,
    Planet::Saturn,
];

impl Planet {
    pub fn name(&self) -> &'static str {
        match self {
            Planet::Saturn => "Saturn",
            Planet::Jupiter => "Jupiter",
            Planet::Mars => "Mars",
            Planet::Sun => "Sun",
            Planet::Venus => "Venus",
            Planet::Mercury => "Mercury",
            Planet::Moon => "Moon",
        }
    }

    /// Astronomical glyph
    pub fn symbol(&self) -> &'static str {
        match self {
            Planet::Saturn => "♄",
            Planet::Jupiter => "♃",
            Planet::Mars => "♂",
            Planet::Sun => "☉",
            Planet::Venus => "♀",
            Planet::Mercury => "☿",
            Planet::Moon => "☽",
        }
    }

    /// Display color as a CSS hex string
    pub fn color(&self) -> &'static str {
        match self {
            Planet::Saturn => "#6b5b95",
            Planet::Jupiter => "#3f51b5",
            Planet::Mars => "#e53935",
            Planet::Sun => "#fbc02d",
            Planet::Venus => "#43a047",
            Planet::Mercury => "#fb8c00",
            Planet::Moon => "#b0bec5",
        }
    }

    /// Position in `CHALDEAN_ORDER` (Saturn = 0 .. Moon = 6)
    pub fn chaldean_index(&self) -> usize {
        match self {
            Planet::Saturn => 0,
            Planet::Jupiter => 1,
            Planet::Mars => 2,
            Planet::Sun => 3,
            Planet::Venus => 4,
            Planet::Mercury => 5,
            Planet::Moon => 6,
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Planet {
    type Err = HoursError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CHALDEAN_ORDER
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| HoursError::InvalidRuler(format!("unknown planet \"{trimmed}\"")))
    }
}

/// The twelve tropical zodiac signs, 30 degrees each starting at Aries 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

/// All signs in ecliptic order (Aries = 0 .. Pisces = 11)
pub const ZODIAC_SIGNS: [ZodiacSign; 12] = [
    ZodiacSign::Aries,
    ZodiacSign::Taurus,
    ZodiacSign::Gemini,
    ZodiacSign::Cancer,
    ZodiacSign::Leo,
    ZodiacSign::Virgo,
    ZodiacSign::Libra,
    ZodiacSign::Scorpio,
    ZodiacSign::Sagittarius,
    ZodiacSign::Capricorn,
    ZodiacSign::Aquarius,
    ZodiacSign::Pisces,
];

impl ZodiacSign {
    pub fn name(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ZodiacSign::Aries => "♈",
            ZodiacSign::Taurus => "♉",
            ZodiacSign::Gemini => "♊",
            ZodiacSign::Cancer => "♋",
            ZodiacSign::Leo => "♌",
            ZodiacSign::Virgo => "♍",
            ZodiacSign::Libra => "♎",
            ZodiacSign::Scorpio => "♏",
            ZodiacSign::Sagittarius => "♐",
            ZodiacSign::Capricorn => "♑",
            ZodiacSign::Aquarius => "♒",
            ZodiacSign::Pisces => "♓",
        }
    }

    /// 0-based index (Aries = 0 .. Pisces = 11)
    pub fn index(&self) -> usize {
        match self {
            ZodiacSign::Aries => 0,
            ZodiacSign::Taurus => 1,
            ZodiacSign::Gemini => 2,
            ZodiacSign::Cancer => 3,
            ZodiacSign::Leo => 4,
            ZodiacSign::Virgo => 5,
            ZodiacSign::Libra => 6,
            ZodiacSign::Scorpio => 7,
            ZodiacSign::Sagittarius => 8,
            ZodiacSign::Capricorn => 9,
            ZodiacSign::Aquarius => 10,
            ZodiacSign::Pisces => 11,
        }
    }

    /// Ecliptic longitude where the sign begins
    pub fn start_degree(&self) -> f64 {
        self.index() as f64 * 30.0
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Essential dignity of a planet in a sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dignity {
    Domicile,
    Exaltation,
    Neutral,
    Detriment,
    Fall,
}

impl Dignity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dignity::Domicile => "domicile",
            Dignity::Exaltation => "exaltation",
            Dignity::Neutral => "neutral",
            Dignity::Detriment => "detriment",
            Dignity::Fall => "fall",
        }
    }
}

/// Qualitative band of a strength score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthTier {
    Weak,
    Moderate,
    Strong,
    Exceptional,
}

impl StrengthTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrengthTier::Weak => "weak",
            StrengthTier::Moderate => "moderate",
            StrengthTier::Strong => "strong",
            StrengthTier::Exceptional => "exceptional",
        }
    }
}

/// Strength of an hour's ruler (score 1-6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strength {
    pub score: u8,
    pub tier: StrengthTier,
}

/// Geographic coordinates in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, north positive, [-90, 90]
    pub latitude: f64,
    /// Longitude, east positive, [-180, 180]
    pub longitude: f64,
}

impl Coordinates {
    /// Create validated coordinates
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, HoursError> {
        let coordinates = Self {
            latitude,
            longitude,
        };
        coordinates.validate()?;
        Ok(coordinates)
    }

    /// Reject NaN, infinities and out-of-range values
    pub fn validate(&self) -> Result<(), HoursError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(HoursError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// A place together with the fixed civil-time offset used for all its instants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Display name, may be empty
    #[serde(default)]
    pub name: String,
    pub coordinates: Coordinates,
    /// Civil time offset from UTC in minutes (east positive)
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Location {
    /// Create a validated location
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        utc_offset_minutes: i32,
    ) -> Result<Self, HoursError> {
        let location = Self {
            name: name.into(),
            coordinates: Coordinates::new(latitude, longitude)?,
            utc_offset_minutes,
        };
        location.offset()?;
        Ok(location)
    }

    /// Validate coordinates and offset
    pub fn validate(&self) -> Result<(), HoursError> {
        self.coordinates.validate()?;
        self.offset().map(|_| ())
    }

    /// The fixed offset for this location's civil time
    pub fn offset(&self) -> Result<FixedOffset, HoursError> {
        utc_offset(self.utc_offset_minutes)
    }
}

/// Convert an offset in minutes into a `FixedOffset`, bounded to +/-18h
pub fn utc_offset(minutes: i32) -> Result<FixedOffset, HoursError> {
    if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
        return Err(HoursError::InvalidUtcOffset(minutes));
    }
    FixedOffset::east_opt(minutes * 60).ok_or(HoursError::InvalidUtcOffset(minutes))
}

/// Parse a civil date written as `YYYY-MM-DD`
pub fn parse_date(raw: &str) -> Result<NaiveDate, HoursError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| HoursError::DateParseError(format!("\"{raw}\": {e}")))
}

/// Parse an RFC 3339 instant
pub fn parse_instant(raw: &str) -> Result<DateTime<FixedOffset>, HoursError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|e| HoursError::DateParseError(format!("\"{raw}\": {e}")))
}

/// Sunrise and sunset for one civil day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
}

impl SunTimes {
    /// Create sun times, requiring `sunrise < sunset < sunrise + 24h`
    pub fn new(
        sunrise: DateTime<FixedOffset>,
        sunset: DateTime<FixedOffset>,
    ) -> Result<Self, HoursError> {
        if sunset <= sunrise {
            return Err(HoursError::NoSunEvent(format!(
                "sunset {} is not after sunrise {}",
                sunset.to_rfc3339(),
                sunrise.to_rfc3339()
            )));
        }
        if sunset >= sunrise + Duration::hours(24) {
            return Err(HoursError::NoSunEvent(format!(
                "sunset {} is a full day or more after sunrise {}",
                sunset.to_rfc3339(),
                sunrise.to_rfc3339()
            )));
        }
        Ok(Self { sunrise, sunset })
    }

    /// Next sunrise, always derived as sunrise + 24h
    pub fn next_sunrise(&self) -> DateTime<FixedOffset> {
        self.sunrise + Duration::hours(24)
    }

    pub fn day_length(&self) -> Duration {
        self.sunset - self.sunrise
    }

    pub fn night_length(&self) -> Duration {
        self.next_sunrise() - self.sunset
    }
}

/// One of the 24 unequal hours of a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetaryHour {
    /// 0..=11 day hours, 12..=23 night hours
    pub index: usize,
    pub planet: Planet,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub is_day: bool,
}

impl PlanetaryHour {
    /// Whether `at` falls inside `[start, end)`
    pub fn contains(&self, at: &DateTime<FixedOffset>) -> bool {
        self.start <= *at && *at < self.end
    }
}

/// Birth date and time as supplied by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatalChart {
    /// Birth date, `YYYY-MM-DD`
    pub date: String,
    /// Birth time, `HH:MM` or `HH:MM:SS` (24-hour)
    pub time: String,
    /// Civil offset at birth; falls back to the current location's offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
}

impl NatalChart {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            utc_offset_minutes: None,
        }
    }

    pub fn with_offset(mut self, utc_offset_minutes: i32) -> Self {
        self.utc_offset_minutes = Some(utc_offset_minutes);
        self
    }
}

/// A planetary hour with zodiac placement, dignity, strength and resonance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedHour {
    pub index: usize,
    pub planet: Planet,
    pub planet_symbol: String,
    pub planet_color: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub is_day: bool,
    /// Ecliptic longitude of the ruler used for the placement
    pub longitude: f64,
    pub sign: ZodiacSign,
    pub sign_symbol: String,
    pub dignity: Dignity,
    pub strength: Strength,
    pub natal_resonant: bool,
}

/// Placement of one planet at an instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub planet: Planet,
    pub longitude: f64,
    pub sign: ZodiacSign,
    /// Degrees travelled inside `sign`, [0, 30)
    pub degree_in_sign: f64,
    pub dignity: Dignity,
}

/// Everything computed for one civil day at one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub location: Location,
    pub day_ruler: Planet,
    pub sun_times: SunTimes,
    /// Instant used for placements and the active hour
    pub evaluated_at: DateTime<FixedOffset>,
    pub hours: Vec<EnrichedHour>,
    /// Index of the hour containing `evaluated_at`, if any
    pub active_index: Option<usize>,
}

impl DayReport {
    pub fn active_hour(&self) -> Option<&EnrichedHour> {
        self.active_index.and_then(|i| self.hours.get(i))
    }
}

/// Producer metadata for encoded payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
}

/// Location block of an encoded payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub utc_offset_minutes: i32,
}

/// Complete JSON payload handed to a rendering collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursPayload {
    pub payload_version: String,
    pub producer: Producer,
    pub date: String,
    pub location: PayloadLocation,
    pub day_ruler: Planet,
    pub sunrise: String,
    pub sunset: String,
    pub next_sunrise: String,
    pub evaluated_at: String,
    pub active_index: Option<usize>,
    pub hours: Vec<EnrichedHour>,
}
