//! Planetary hour sequencing
//!
//! Splits the span from sunrise to sunset into 12 equal day hours and the span
//! from sunset to the next sunrise (sunrise + 24h) into 12 equal night hours,
//! assigning rulers in Chaldean order starting from the day ruler.
//!
//! Boundaries are computed in whole milliseconds from the two anchors, so the
//! hours are exactly contiguous and the last one ends exactly on the next
//! sunrise.

use crate::error::HoursError;
use crate::types::{Planet, PlanetaryHour, SunTimes, CHALDEAN_ORDER, DAY_RULERS};
use chrono::{DateTime, Duration, FixedOffset, Weekday};

/// Number of planetary hours in a day
pub const HOURS_PER_DAY: usize = 24;

/// Hours in each of the day and night halves
const HOURS_PER_HALF: i64 = 12;

/// Generator for the 24 planetary hours of a day
pub struct HourSequencer;

impl HourSequencer {
    /// Generate the hours for a day ruled by `day_ruler`
    pub fn generate(
        day_ruler: Planet,
        sunrise: DateTime<FixedOffset>,
        sunset: DateTime<FixedOffset>,
    ) -> Result<Vec<PlanetaryHour>, HoursError> {
        let sun = SunTimes::new(sunrise, sunset)?;
        Ok(Self::generate_for(day_ruler, &sun))
    }

    /// Same as [`HourSequencer::generate`] but resolving the ruler by name
    pub fn generate_named(
        day_ruler: &str,
        sunrise: DateTime<FixedOffset>,
        sunset: DateTime<FixedOffset>,
    ) -> Result<Vec<PlanetaryHour>, HoursError> {
        let ruler: Planet = day_ruler.parse()?;
        Self::generate(ruler, sunrise, sunset)
    }

    /// Generate the hours from already validated sun times
    pub fn generate_for(day_ruler: Planet, sun: &SunTimes) -> Vec<PlanetaryHour> {
        let start_index = day_ruler.chaldean_index();
        let day_ms = sun.day_length().num_milliseconds();
        let night_ms = sun.night_length().num_milliseconds();

        (0..HOURS_PER_DAY)
            .map(|i| {
                let is_day = i < 12;
                let (anchor, span_ms, k) = if is_day {
                    (sun.sunrise, day_ms, i as i64)
                } else {
                    (sun.sunset, night_ms, i as i64 - HOURS_PER_HALF)
                };
                PlanetaryHour {
                    index: i,
                    planet: CHALDEAN_ORDER[(start_index + i) % CHALDEAN_ORDER.len()],
                    start: boundary(anchor, span_ms, k),
                    end: boundary(anchor, span_ms, k + 1),
                    is_day,
                }
            })
            .collect()
    }
}

/// Shorthand for [`HourSequencer::generate`]
pub fn generate_hours(
    day_ruler: Planet,
    sunrise: DateTime<FixedOffset>,
    sunset: DateTime<FixedOffset>,
) -> Result<Vec<PlanetaryHour>, HoursError> {
    HourSequencer::generate(day_ruler, sunrise, sunset)
}

/// `anchor + span * k / 12`, in integer milliseconds
fn boundary(anchor: DateTime<FixedOffset>, span_ms: i64, k: i64) -> DateTime<FixedOffset> {
    anchor + Duration::milliseconds(span_ms * k / HOURS_PER_HALF)
}

/// Ruler of the first hour of a weekday (Sunday -> Sun .. Saturday -> Saturn)
pub fn day_ruler(weekday: Weekday) -> Planet {
    DAY_RULERS[weekday.num_days_from_sunday() as usize]
}

/// The hour containing `at`, if any
pub fn current_hour<'a>(
    hours: &'a [PlanetaryHour],
    at: &DateTime<FixedOffset>,
) -> Option<&'a PlanetaryHour> {
    hours.iter().find(|h| h.contains(at))
}
