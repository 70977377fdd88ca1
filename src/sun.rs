//! Sunrise and sunset
//!
//! The engine consumes sun times through the [`SunTimeProvider`] trait. The
//! bundled [`SolarCalculator`] takes rise and set from the NREL solar position
//! algorithm in `solar_positioning::spa`, at the standard sunrise/sunset
//! horizon.
//!
//! Polar day and polar night are reported as `NoSunEvent`; the caller decides
//! what to show instead.

use crate::error::HoursError;
use crate::types::{Location, SunTimes};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use solar_positioning::{spa, Horizon, SunriseResult};

/// Delta T (TT - UT) in seconds
pub const DELTA_T_SECONDS: f64 = 69.0;

/// Source of sunrise/sunset for a civil day at a location
pub trait SunTimeProvider {
    /// Sun times for the civil `date` in the location's fixed offset
    fn sun_times(&self, date: NaiveDate, location: &Location) -> Result<SunTimes, HoursError>;
}

/// Sunrise/sunset calculator over the SPA
#[derive(Debug, Clone, Copy)]
pub struct SolarCalculator {
    delta_t: f64,
}

impl Default for SolarCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl SolarCalculator {
    pub fn new() -> Self {
        Self {
            delta_t: DELTA_T_SECONDS,
        }
    }

    /// Use a specific Delta T, in seconds
    pub fn with_delta_t(delta_t: f64) -> Self {
        Self { delta_t }
    }
}

/// Transit of one UT day, with its rise and set or the reason there are none
struct SolarDay {
    transit: DateTime<FixedOffset>,
    events: Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), HoursError>,
}

impl SunTimeProvider for SolarCalculator {
    fn sun_times(&self, date: NaiveDate, location: &Location) -> Result<SunTimes, HoursError> {
        location.validate()?;
        let offset = location.offset()?;

        // The UT day whose transit falls on the local date can be one day
        // either side of it when the offset is far from the longitude.
        let mut day = None;
        for ut_date in [Some(date), date.pred_opt(), date.succ_opt()]
            .into_iter()
            .flatten()
        {
            let candidate = self.solar_day(ut_date, location, offset)?;
            if candidate.transit.date_naive() == date {
                day = Some(candidate);
                break;
            }
        }
        let day = day.ok_or_else(|| {
            HoursError::NoSunEvent(format!("no solar transit on {date} at this offset"))
        })?;
        let (sunrise, sunset) = day.events?;

        log::debug!(
            "sun times for {} at ({:.4}, {:.4}): rise {}, set {}",
            date,
            location.coordinates.latitude,
            location.coordinates.longitude,
            sunrise.to_rfc3339(),
            sunset.to_rfc3339()
        );

        SunTimes::new(sunrise, sunset)
    }
}

impl SolarCalculator {
    fn solar_day(
        &self,
        ut_date: NaiveDate,
        location: &Location,
        offset: FixedOffset,
    ) -> Result<SolarDay, HoursError> {
        let latitude = location.coordinates.latitude;
        let result = spa::sunrise_sunset_utc_for_horizon(
            ut_date.year(),
            ut_date.month(),
            ut_date.day(),
            latitude,
            location.coordinates.longitude,
            self.delta_t,
            Horizon::SunriseSunset,
        )
        .map_err(|e| HoursError::NoSunEvent(format!("solar position failed: {e}")))?;

        let day = match result {
            SunriseResult::RegularDay {
                sunrise,
                transit,
                sunset,
            } => SolarDay {
                transit: at_hours(ut_date, transit.hours(), offset)?,
                events: Ok((
                    at_hours(ut_date, sunrise.hours(), offset)?,
                    at_hours(ut_date, sunset.hours(), offset)?,
                )),
            },
            SunriseResult::AllDay { transit } => SolarDay {
                transit: at_hours(ut_date, transit.hours(), offset)?,
                events: Err(HoursError::NoSunEvent(format!(
                    "sun never sets at latitude {latitude:.4} on {ut_date}"
                ))),
            },
            SunriseResult::AllNight { transit } => SolarDay {
                transit: at_hours(ut_date, transit.hours(), offset)?,
                events: Err(HoursError::NoSunEvent(format!(
                    "sun never rises at latitude {latitude:.4} on {ut_date}"
                ))),
            },
        };
        Ok(day)
    }
}

/// Civil instant `hours` after 0h UT of `ut_date`, rounded to the millisecond
fn at_hours(
    ut_date: NaiveDate,
    hours: f64,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, HoursError> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() {
        return Err(HoursError::NoSunEvent(format!(
            "non-finite event time on {ut_date}"
        )));
    }
    let midnight = ut_date
        .and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| HoursError::NoSunEvent(format!("no midnight on {ut_date}")))?;
    Ok((midnight + Duration::milliseconds(millis as i64)).with_timezone(&offset))
}
