//! Pipeline orchestration
//!
//! This module provides the public API for computing a day of planetary hours.
//! It runs the full flow from date and location to an enriched [`DayReport`]:
//!
//! 1. SunTimeProvider - sunrise and sunset for the civil day
//! 2. HourSequencer - 24 hours in Chaldean order from the weekday's ruler
//! 3. LongitudeModel + ZodiacMapper - sign of each hour's ruler
//! 4. DignityScorer + ResonanceEvaluator - dignity and natal resonance
//! 5. StrengthScorer - score and tier

use crate::config::{EngineConfig, PlacementMode};
use crate::dignity::{DignityScorer, StrengthScorer};
use crate::encoder::ReportEncoder;
use crate::error::HoursError;
use crate::longitude::{LongitudeModel, MeanMotionModel};
use crate::resonance::{validate_natal, ResonanceEvaluator};
use crate::sequencer::{current_hour, day_ruler, HourSequencer};
use crate::sun::{SolarCalculator, SunTimeProvider};
use crate::types::{
    DayReport, EnrichedHour, Location, NatalChart, Planet, PlanetPosition, PlanetaryHour,
    CHALDEAN_ORDER,
};
use crate::zodiac::ZodiacMapper;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};

/// Compute the planetary hours of a civil day with the bundled models.
///
/// # Arguments
/// * `date` - Civil date at the location
/// * `location` - Coordinates and fixed UTC offset
/// * `natal` - Optional birth data for resonance
/// * `at` - Evaluation instant (placements and active hour)
///
/// # Example
/// ```ignore
/// let report = planetary_hours_for_day(date, &location, None, &now)?;
/// println!("{}", report.day_ruler);
/// ```
pub fn planetary_hours_for_day(
    date: NaiveDate,
    location: &Location,
    natal: Option<&NatalChart>,
    at: &DateTime<FixedOffset>,
) -> Result<DayReport, HoursError> {
    HourEngine::new().compute_day(date, location, natal, at)
}

/// Same as [`planetary_hours_for_day`], encoded as a JSON payload
pub fn planetary_hours_json(
    date: NaiveDate,
    location: &Location,
    natal: Option<&NatalChart>,
    at: &DateTime<FixedOffset>,
) -> Result<String, HoursError> {
    let report = planetary_hours_for_day(date, location, natal, at)?;
    ReportEncoder::new().encode_to_json(&report)
}

/// Planetary hours engine over a sun-time source and a longitude model.
///
/// Holds no mutable state; every call recomputes from its inputs.
pub struct HourEngine<S = SolarCalculator, L = MeanMotionModel> {
    sun: S,
    longitudes: L,
    config: EngineConfig,
}

impl Default for HourEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HourEngine {
    /// Create an engine with the bundled models and default settings
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with the bundled models and a specific configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_models(SolarCalculator::new(), MeanMotionModel::new(), config)
    }
}

impl<S: SunTimeProvider, L: LongitudeModel> HourEngine<S, L> {
    /// Create an engine over custom models
    pub fn with_models(sun: S, longitudes: L, config: EngineConfig) -> Self {
        Self {
            sun,
            longitudes,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a day ruler by name, applying the configured fallback if any
    pub fn resolve_ruler(&self, name: &str) -> Result<Planet, HoursError> {
        match name.parse::<Planet>() {
            Ok(planet) => Ok(planet),
            Err(err) => match self.config.ruler_fallback {
                Some(fallback) => {
                    log::warn!("{err}; using fallback ruler {fallback}");
                    Ok(fallback)
                }
                None => Err(err),
            },
        }
    }

    /// Compute the day, taking the ruler from the date's weekday
    pub fn compute_day(
        &self,
        date: NaiveDate,
        location: &Location,
        natal: Option<&NatalChart>,
        at: &DateTime<FixedOffset>,
    ) -> Result<DayReport, HoursError> {
        let ruler = day_ruler(date.weekday());
        log::debug!("day ruler for {date} ({:?}) is {ruler}", date.weekday());
        self.compute_day_with_ruler(date, location, ruler, natal, at)
    }

    /// Compute the planetary day that contains `at`.
    ///
    /// Before sunrise the hours still belong to the previous civil day's night.
    /// When sunrise comes later each day, the previous day's last hour ends
    /// (at its sunrise + 24h) before today's sunrise; an instant in that gap
    /// is reported as the previous day's last night hour.
    pub fn compute_current(
        &self,
        location: &Location,
        natal: Option<&NatalChart>,
        at: &DateTime<FixedOffset>,
    ) -> Result<DayReport, HoursError> {
        location.validate()?;
        let local = at.with_timezone(&location.offset()?);
        let date = local.date_naive();

        let report = self.compute_day(date, location, natal, at)?;
        if local >= report.sun_times.sunrise {
            return Ok(report);
        }
        let Some(previous) = date.pred_opt() else {
            return Ok(report);
        };

        let mut report = self.compute_day(previous, location, natal, at)?;
        if report.active_index.is_none() {
            if let Some(last) = report.hours.last() {
                if local >= last.end {
                    log::debug!(
                        "{} is after the previous day's end {}; keeping hour {}",
                        local.to_rfc3339(),
                        last.end.to_rfc3339(),
                        last.index
                    );
                    report.active_index = Some(last.index);
                }
            }
        }
        Ok(report)
    }

    /// Compute the day with a ruler given by name
    pub fn compute_day_named(
        &self,
        date: NaiveDate,
        location: &Location,
        ruler: &str,
        natal: Option<&NatalChart>,
        at: &DateTime<FixedOffset>,
    ) -> Result<DayReport, HoursError> {
        let ruler = self.resolve_ruler(ruler)?;
        self.compute_day_with_ruler(date, location, ruler, natal, at)
    }

    /// Compute the day with an explicit ruler
    pub fn compute_day_with_ruler(
        &self,
        date: NaiveDate,
        location: &Location,
        ruler: Planet,
        natal: Option<&NatalChart>,
        at: &DateTime<FixedOffset>,
    ) -> Result<DayReport, HoursError> {
        // Reject bad input before any lookup
        location.validate()?;
        let offset = location.offset()?;
        let evaluated_at = at.with_timezone(&offset);

        let sun_times = self.sun.sun_times(date, location)?;
        let hours = HourSequencer::generate(ruler, sun_times.sunrise, sun_times.sunset)?;
        let active_index = current_hour(&hours, &evaluated_at).map(|h| h.index);

        let natal = natal.filter(|chart| match validate_natal(chart, location.utc_offset_minutes) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("natal data ignored: {err}");
                false
            }
        });

        let hours = hours
            .iter()
            .map(|hour| {
                let placed_at = match self.config.placement {
                    PlacementMode::EvaluationTime => evaluated_at,
                    PlacementMode::HourStart => hour.start,
                };
                self.enrich(hour, &placed_at, natal)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DayReport {
            date,
            location: location.clone(),
            day_ruler: ruler,
            sun_times,
            evaluated_at,
            hours,
            active_index,
        })
    }

    /// Add placement, dignity, resonance and strength to one hour
    pub fn enrich(
        &self,
        hour: &PlanetaryHour,
        placed_at: &DateTime<FixedOffset>,
        natal: Option<&NatalChart>,
    ) -> Result<EnrichedHour, HoursError> {
        let planet = hour.planet;
        let longitude = self.longitudes.longitude(planet, placed_at);
        let sign = ZodiacMapper::sign_of(longitude)?;
        let dignity = DignityScorer::dignity_of(planet, sign);
        let natal_resonant =
            ResonanceEvaluator::new(&self.longitudes).is_resonant(planet, placed_at, natal);
        let strength = StrengthScorer::from_dignity(dignity, natal_resonant);

        Ok(EnrichedHour {
            index: hour.index,
            planet,
            planet_symbol: planet.symbol().to_string(),
            planet_color: planet.color().to_string(),
            start: hour.start,
            end: hour.end,
            is_day: hour.is_day,
            longitude,
            sign,
            sign_symbol: sign.symbol().to_string(),
            dignity,
            strength,
            natal_resonant,
        })
    }

    /// Longitude, sign and dignity of all seven planets at an instant
    pub fn positions(&self, at: &DateTime<FixedOffset>) -> Result<Vec<PlanetPosition>, HoursError> {
        CHALDEAN_ORDER
            .iter()
            .map(|&planet| {
                let longitude = self.longitudes.longitude(planet, at);
                let sign = ZodiacMapper::sign_of(longitude)?;
                Ok(PlanetPosition {
                    planet,
                    longitude,
                    sign,
                    degree_in_sign: ZodiacMapper::degree_in_sign(longitude)?,
                    dignity: DignityScorer::dignity_of(planet, sign),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Dignity, StrengthTier, SunTimes, ZodiacSign};
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    /// Sunrise 06:00 and sunset 18:00 local time, every day
    struct EquinoxSun;

    impl SunTimeProvider for EquinoxSun {
        fn sun_times(&self, date: NaiveDate, location: &Location) -> Result<SunTimes, HoursError> {
            let offset = location.offset()?;
            let at = |h| {
                offset
                    .from_local_datetime(&date.and_hms_opt(h, 0, 0).unwrap())
                    .unwrap()
            };
            SunTimes::new(at(6), at(18))
        }
    }

    /// Fails the test if consulted
    struct UnreachableSun;

    impl SunTimeProvider for UnreachableSun {
        fn sun_times(
            &self,
            _date: NaiveDate,
            _location: &Location,
        ) -> Result<SunTimes, HoursError> {
            panic!("sun lookup must not happen for invalid input");
        }
    }

    /// Every body sits at a fixed longitude
    struct FixedLongitudes(f64);

    impl LongitudeModel for FixedLongitudes {
        fn longitude(&self, _body: Planet, _at: &DateTime<FixedOffset>) -> f64 {
            self.0
        }
    }

    /// Longitude grows one degree per hour since 2024-03-19 00:00 UTC
    struct DriftingLongitudes;

    impl LongitudeModel for DriftingLongitudes {
        fn longitude(&self, _body: Planet, at: &DateTime<FixedOffset>) -> f64 {
            let origin = chrono::Utc.with_ymd_and_hms(2024, 3, 19, 0, 0, 0).unwrap();
            let hours = (at.with_timezone(&chrono::Utc) - origin).num_minutes() as f64 / 60.0;
            (100.0 + hours).rem_euclid(360.0)
        }
    }

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 19).unwrap()
    }

    fn greenwich() -> Location {
        Location::new("Greenwich", 51.48, 0.0, 0).unwrap()
    }

    fn at(rfc3339: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    fn engine<L: LongitudeModel>(longitudes: L) -> HourEngine<EquinoxSun, L> {
        HourEngine::with_models(EquinoxSun, longitudes, EngineConfig::default())
    }

    #[test]
    fn test_mars_day_scenario() {
        // 135 degrees is Leo
        let engine = engine(FixedLongitudes(135.0));
        let report = engine
            .compute_day(tuesday(), &greenwich(), None, &at("2024-03-19T06:30:00+00:00"))
            .unwrap();

        assert_eq!(report.day_ruler, Planet::Mars);
        assert_eq!(report.hours.len(), 24);
        assert_eq!(report.hours[0].planet, Planet::Mars);
        assert_eq!(report.hours[0].start, at("2024-03-19T06:00:00+00:00"));
        assert_eq!(report.hours[0].end, at("2024-03-19T07:00:00+00:00"));
        assert_eq!(report.hours[12].start, at("2024-03-19T18:00:00+00:00"));
        assert_eq!(report.hours[12].planet, Planet::Saturn);
        assert_eq!(report.active_index, Some(0));
        assert_eq!(report.active_hour().map(|h| h.planet), Some(Planet::Mars));

        let sun_hour = &report.hours[1];
        assert_eq!(sun_hour.planet, Planet::Sun);
        assert_eq!(sun_hour.sign, ZodiacSign::Leo);
        assert_eq!(sun_hour.sign_symbol, "♌");
        assert_eq!(sun_hour.dignity, Dignity::Domicile);
        assert_eq!(sun_hour.strength.score, 5);
        assert!(!sun_hour.natal_resonant);

        let saturn_hour = &report.hours[12];
        assert_eq!(saturn_hour.dignity, Dignity::Detriment);
        assert_eq!(saturn_hour.strength.tier, StrengthTier::Weak);
    }

    #[test]
    fn test_idempotent() {
        let engine = engine(FixedLongitudes(200.0));
        let now = at("2024-03-19T12:00:00+00:00");
        let natal = NatalChart::new("1990-05-17", "08:30");
        let first = engine
            .compute_day(tuesday(), &greenwich(), Some(&natal), &now)
            .unwrap();
        let second = engine
            .compute_day(tuesday(), &greenwich(), Some(&natal), &now)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resonance_raises_strength() {
        // Constant longitude: every planet is in its natal sign
        let engine = engine(FixedLongitudes(200.0));
        let now = at("2024-03-19T12:00:00+00:00");
        let natal = NatalChart::new("1990-05-17", "08:30");

        let plain = engine.compute_day(tuesday(), &greenwich(), None, &now).unwrap();
        let resonant = engine
            .compute_day(tuesday(), &greenwich(), Some(&natal), &now)
            .unwrap();

        for (a, b) in plain.hours.iter().zip(&resonant.hours) {
            assert!(!a.natal_resonant);
            assert!(b.natal_resonant);
            assert_eq!(b.strength.score, a.strength.score + 1);
        }
    }

    #[test]
    fn test_invalid_natal_is_ignored() {
        let engine = engine(FixedLongitudes(200.0));
        let natal = NatalChart::new("not a date", "08:30");
        let report = engine
            .compute_day(
                tuesday(),
                &greenwich(),
                Some(&natal),
                &at("2024-03-19T12:00:00+00:00"),
            )
            .unwrap();
        assert!(report.hours.iter().all(|h| !h.natal_resonant));
    }

    #[test]
    fn test_invalid_coordinates_rejected_before_sun_lookup() {
        let engine = HourEngine::with_models(
            UnreachableSun,
            FixedLongitudes(0.0),
            EngineConfig::default(),
        );
        let mut location = greenwich();
        location.coordinates.latitude = 200.0;
        let result = engine.compute_day(
            tuesday(),
            &location,
            None,
            &at("2024-03-19T12:00:00+00:00"),
        );
        assert!(matches!(result, Err(HoursError::InvalidCoordinates { .. })));

        location.coordinates.latitude = f64::NAN;
        let result = engine.compute_day(
            tuesday(),
            &location,
            None,
            &at("2024-03-19T12:00:00+00:00"),
        );
        assert!(matches!(result, Err(HoursError::InvalidCoordinates { .. })));
    }

    #[test]
    fn test_placement_modes() {
        let now = at("2024-03-19T06:00:00+00:00");

        let by_evaluation = engine(DriftingLongitudes)
            .compute_day(tuesday(), &greenwich(), None, &now)
            .unwrap();
        let longitudes: Vec<f64> = by_evaluation.hours.iter().map(|h| h.longitude).collect();
        assert!(longitudes.iter().all(|l| (l - 106.0).abs() < 1e-9));

        let by_start = HourEngine::with_models(
            EquinoxSun,
            DriftingLongitudes,
            EngineConfig::default().with_placement(PlacementMode::HourStart),
        )
        .compute_day(tuesday(), &greenwich(), None, &now)
        .unwrap();
        for hour in &by_start.hours {
            let expected = 106.0 + hour.index as f64;
            assert!((hour.longitude - expected).abs() < 1e-9, "hour {}", hour.index);
        }
    }

    #[test]
    fn test_evaluation_instant_is_expressed_in_location_time() {
        let engine = engine(FixedLongitudes(10.0));
        let tokyo = Location::new("Tokyo", 35.68, 139.69, 9 * 60).unwrap();
        let utc = at("2024-03-19T00:30:00+00:00");
        let report = engine.compute_day(tuesday(), &tokyo, None, &utc).unwrap();

        assert_eq!(report.evaluated_at, utc);
        assert_eq!(report.evaluated_at.offset().local_minus_utc(), 9 * 3600);
        // 09:30 local is inside the fourth day hour
        assert_eq!(report.active_index, Some(3));
    }

    #[test]
    fn test_active_index_outside_day() {
        let engine = engine(FixedLongitudes(10.0));
        let before = at("2024-03-19T05:00:00+00:00");
        let report = engine.compute_day(tuesday(), &greenwich(), None, &before).unwrap();
        assert_eq!(report.active_index, None);

        let last = at("2024-03-20T06:00:00+00:00") - Duration::milliseconds(1);
        let report = engine.compute_day(tuesday(), &greenwich(), None, &last).unwrap();
        assert_eq!(report.active_index, Some(23));
    }

    #[test]
    fn test_current_day_before_sunrise_uses_previous_night() {
        let engine = engine(FixedLongitudes(10.0));
        let report = engine
            .compute_current(&greenwich(), None, &at("2024-03-19T03:00:00+00:00"))
            .unwrap();
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2024, 3, 18).unwrap());
        assert_eq!(report.day_ruler, Planet::Moon);
        assert_eq!(report.active_index, Some(21));

        let report = engine
            .compute_current(&greenwich(), None, &at("2024-03-19T20:15:00+00:00"))
            .unwrap();
        assert_eq!(report.date, tuesday());
        assert_eq!(report.active_index, Some(14));
    }

    /// Sunrise three minutes later each day from 06:00 on 2024-10-01, sunset 18:00
    struct LateningSun;

    impl SunTimeProvider for LateningSun {
        fn sun_times(&self, date: NaiveDate, location: &Location) -> Result<SunTimes, HoursError> {
            let offset = location.offset()?;
            let origin = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
            let drift = Duration::minutes((date - origin).num_days() * 3);
            let midnight = offset
                .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
                .unwrap();
            SunTimes::new(
                midnight + Duration::hours(6) + drift,
                midnight + Duration::hours(18),
            )
        }
    }

    #[test]
    fn test_current_day_between_previous_end_and_later_sunrise() {
        let engine =
            HourEngine::with_models(LateningSun, FixedLongitudes(10.0), EngineConfig::default());

        // Monday 14th: sunrise 06:39, so its last hour ends 06:39 on the 15th.
        // Tuesday 15th: sunrise 06:42.
        let report = engine
            .compute_current(&greenwich(), None, &at("2024-10-15T06:40:00+00:00"))
            .unwrap();
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2024, 10, 14).unwrap());
        assert_eq!(report.day_ruler, Planet::Moon);
        assert_eq!(report.active_index, Some(23));
        assert_eq!(report.active_hour().map(|h| h.planet), Some(Planet::Jupiter));

        let report = engine
            .compute_current(&greenwich(), None, &at("2024-10-15T06:38:00+00:00"))
            .unwrap();
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2024, 10, 14).unwrap());
        assert_eq!(report.active_index, Some(23));

        let report = engine
            .compute_current(&greenwich(), None, &at("2024-10-15T06:42:00+00:00"))
            .unwrap();
        assert_eq!(report.date, NaiveDate::from_ymd_opt(2024, 10, 15).unwrap());
        assert_eq!(report.day_ruler, Planet::Mars);
        assert_eq!(report.active_index, Some(0));
    }

    #[test]
    fn test_current_day_always_has_active_hour_in_autumn() {
        let engine = HourEngine::new();
        let london = Location::new("London", 51.5074, -0.1278, 60).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
        let noon = at("2024-10-14T12:00:00+01:00");
        let previous = engine.compute_day(monday, &london, None, &noon).unwrap();
        let previous_end = previous.hours[23].end;

        let report = engine
            .compute_current(&london, None, &(previous_end + Duration::seconds(30)))
            .unwrap();
        assert!(report.active_hour().is_some());
    }

    #[test]
    fn test_ruler_resolution() {
        let strict = engine(FixedLongitudes(10.0));
        assert_eq!(strict.resolve_ruler("venus").unwrap(), Planet::Venus);
        assert!(matches!(
            strict.resolve_ruler("Vulcan"),
            Err(HoursError::InvalidRuler(_))
        ));

        let lenient = HourEngine::with_models(
            EquinoxSun,
            FixedLongitudes(10.0),
            EngineConfig::default().with_ruler_fallback(Planet::Sun),
        );
        assert_eq!(lenient.resolve_ruler("Vulcan").unwrap(), Planet::Sun);

        let report = lenient
            .compute_day_named(
                tuesday(),
                &greenwich(),
                "Vulcan",
                None,
                &at("2024-03-19T12:00:00+00:00"),
            )
            .unwrap();
        assert_eq!(report.day_ruler, Planet::Sun);
        assert_eq!(report.hours[0].planet, Planet::Sun);
    }

    #[test]
    fn test_positions() {
        let engine = engine(FixedLongitudes(95.0));
        let positions = engine.positions(&at("2024-03-19T12:00:00+00:00")).unwrap();
        assert_eq!(positions.len(), 7);
        assert!(positions.iter().all(|p| p.sign == ZodiacSign::Cancer));
        let moon = positions.iter().find(|p| p.planet == Planet::Moon).unwrap();
        assert_eq!(moon.dignity, Dignity::Domicile);
        assert!((moon.degree_in_sign - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_bundled_models_end_to_end() {
        let london = Location::new("London", 51.5074, -0.1278, 60).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 21).unwrap();
        let report =
            planetary_hours_for_day(date, &london, None, &at("2024-06-21T12:00:00+01:00"))
                .unwrap();

        // 2024-06-21 is a Friday
        assert_eq!(report.day_ruler, Planet::Venus);
        assert_eq!(report.hours[0].start, report.sun_times.sunrise);
        assert_eq!(report.hours[11].end, report.sun_times.sunset);
        assert_eq!(report.hours[23].end, report.sun_times.next_sunrise());
        assert!(report.active_index.is_some());

        let json = planetary_hours_json(date, &london, None, &at("2024-06-21T12:00:00+01:00"))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["day_ruler"], "Venus");
        assert_eq!(value["hours"].as_array().unwrap().len(), 24);
    }

    #[test]
    fn test_polar_night_propagates() {
        let tromso = Location::new("Tromsø", 69.6492, 18.9553, 60).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        let result =
            planetary_hours_for_day(date, &tromso, None, &at("2024-12-21T12:00:00+01:00"));
        assert!(matches!(result, Err(HoursError::NoSunEvent(_))));
    }
}
