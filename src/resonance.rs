//! Natal resonance
//!
//! A planet is resonant when it occupies the same zodiac sign now as it did at
//! the moment of birth. Only sign identity matters, not the degree.
//!
//! Natal data is stored as the user typed it and validated here, on use.
//! Invalid data never aborts a computation: it is logged and read as "not
//! resonant".

use crate::error::HoursError;
use crate::longitude::LongitudeModel;
use crate::types::{utc_offset, NatalChart, Planet};
use crate::zodiac::ZodiacMapper;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Earliest accepted birth year
pub const MIN_NATAL_YEAR: i32 = 1900;

/// Latest accepted birth year
pub const MAX_NATAL_YEAR: i32 = 2100;

/// Parse and validate natal data into an instant.
///
/// The chart's own offset is used when present, otherwise `fallback_offset_minutes`
/// (normally the current location's offset).
pub fn birth_instant(
    natal: &NatalChart,
    fallback_offset_minutes: i32,
) -> Result<DateTime<FixedOffset>, HoursError> {
    let date = NaiveDate::parse_from_str(natal.date.trim(), "%Y-%m-%d").map_err(|e| {
        HoursError::InvalidNatalData(format!("birth date \"{}\": {e}", natal.date))
    })?;
    if !(MIN_NATAL_YEAR..=MAX_NATAL_YEAR).contains(&date.year()) {
        return Err(HoursError::InvalidNatalData(format!(
            "birth year {} outside {MIN_NATAL_YEAR}..={MAX_NATAL_YEAR}",
            date.year()
        )));
    }

    let time = parse_birth_time(natal.time.trim())
        .ok_or_else(|| HoursError::InvalidNatalData(format!("birth time \"{}\"", natal.time)))?;

    let minutes = natal.utc_offset_minutes.unwrap_or(fallback_offset_minutes);
    let offset = utc_offset(minutes)
        .map_err(|_| HoursError::InvalidNatalData(format!("birth offset {minutes} minutes")))?;

    offset
        .from_local_datetime(&NaiveDateTime::new(date, time))
        .single()
        .ok_or_else(|| HoursError::InvalidNatalData(format!("{} {}", natal.date, natal.time)))
}

/// Validate natal data without keeping the result
pub fn validate_natal(natal: &NatalChart, fallback_offset_minutes: i32) -> Result<(), HoursError> {
    birth_instant(natal, fallback_offset_minutes).map(|_| ())
}

fn parse_birth_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Compares current placements against natal placements
pub struct ResonanceEvaluator<'a, L: LongitudeModel> {
    model: &'a L,
}

impl<'a, L: LongitudeModel> ResonanceEvaluator<'a, L> {
    pub fn new(model: &'a L) -> Self {
        Self { model }
    }

    /// Whether `planet` is in its natal sign at `current`.
    ///
    /// Absent natal data is simply not resonant; invalid natal data is logged
    /// and treated the same way.
    pub fn is_resonant(
        &self,
        planet: Planet,
        current: &DateTime<FixedOffset>,
        natal: Option<&NatalChart>,
    ) -> bool {
        match self.try_is_resonant(planet, current, natal) {
            Ok(resonant) => resonant,
            Err(err) => {
                log::warn!("ignoring natal data for {planet}: {err}");
                false
            }
        }
    }

    /// Like [`ResonanceEvaluator::is_resonant`] but surfacing validation errors
    pub fn try_is_resonant(
        &self,
        planet: Planet,
        current: &DateTime<FixedOffset>,
        natal: Option<&NatalChart>,
    ) -> Result<bool, HoursError> {
        let Some(natal) = natal else {
            return Ok(false);
        };
        let fallback = current.offset().local_minus_utc() / 60;
        let born = birth_instant(natal, fallback)?;

        let natal_sign = ZodiacMapper::sign_of(self.model.longitude(planet, &born))?;
        let current_sign = ZodiacMapper::sign_of(self.model.longitude(planet, current))?;
        Ok(natal_sign == current_sign)
    }
}
