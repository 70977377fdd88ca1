//! Ecliptic longitude models
//!
//! The engine only depends on the [`LongitudeModel`] trait. The bundled
//! [`MeanMotionModel`] places every body on a circular orbit moving at its mean
//! rate from the J2000 epoch; the planets are then viewed from a circular Earth
//! orbit to get a geocentric longitude. Errors of a few degrees are expected,
//! which is fine for sign-level placement but not for aspects or timing.

use crate::types::Planet;
use crate::zodiac::normalize_degrees;
use chrono::{DateTime, FixedOffset};

/// J2000.0 epoch (2000-01-01T12:00:00Z) as Unix seconds
pub const J2000_UNIX_SECONDS: i64 = 946_728_000;

/// Days per Julian century
const DAYS_PER_CENTURY: f64 = 36_525.0;

/// Source of approximate geocentric ecliptic longitudes
pub trait LongitudeModel {
    /// Longitude of `body` at `at`, in degrees within [0, 360)
    fn longitude(&self, body: Planet, at: &DateTime<FixedOffset>) -> f64;
}

/// Mean orbital elements referred to J2000
#[derive(Debug, Clone, Copy)]
struct MeanOrbit {
    /// Semi-major axis (AU)
    semi_major_axis: f64,
    /// Mean longitude at J2000 (degrees)
    mean_longitude: f64,
    /// Mean motion (degrees per Julian century)
    rate: f64,
}

const MERCURY: MeanOrbit = MeanOrbit {
    semi_major_axis: 0.387_099_27,
    mean_longitude: 252.250_323_50,
    rate: 149_472.674_111_75,
};

const VENUS: MeanOrbit = MeanOrbit {
    semi_major_axis: 0.723_335_66,
    mean_longitude: 181.979_099_50,
    rate: 58_517.815_387_29,
};

const EARTH: MeanOrbit = MeanOrbit {
    semi_major_axis: 1.000_002_61,
    mean_longitude: 100.464_571_66,
    rate: 35_999.372_449_81,
};

const MARS: MeanOrbit = MeanOrbit {
    semi_major_axis: 1.523_710_34,
    mean_longitude: -4.553_432_05,
    rate: 19_140.302_684_99,
};

const JUPITER: MeanOrbit = MeanOrbit {
    semi_major_axis: 5.202_887_00,
    mean_longitude: 34.396_440_51,
    rate: 3_034.746_127_75,
};

const SATURN: MeanOrbit = MeanOrbit {
    semi_major_axis: 9.536_675_94,
    mean_longitude: 49.954_244_23,
    rate: 1_222.493_622_01,
};

/// Mean lunar longitude at J2000 and its rate (degrees per century)
const MOON_MEAN_LONGITUDE: f64 = 218.316_447_7;
const MOON_RATE: f64 = 481_267.881_234_21;

impl MeanOrbit {
    fn mean_longitude_at(&self, centuries: f64) -> f64 {
        self.mean_longitude + self.rate * centuries
    }

    /// Heliocentric ecliptic (x, y) in AU
    fn position(&self, centuries: f64) -> (f64, f64) {
        let l = self.mean_longitude_at(centuries).to_radians();
        (self.semi_major_axis * l.cos(), self.semi_major_axis * l.sin())
    }
}

/// Circular mean-motion approximation of the seven classical bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanMotionModel;

impl MeanMotionModel {
    pub fn new() -> Self {
        Self
    }

    fn raw_longitude(body: Planet, centuries: f64) -> f64 {
        match body {
            Planet::Sun => EARTH.mean_longitude_at(centuries) + 180.0,
            Planet::Moon => MOON_MEAN_LONGITUDE + MOON_RATE * centuries,
            Planet::Mercury => geocentric(&MERCURY, centuries),
            Planet::Venus => geocentric(&VENUS, centuries),
            Planet::Mars => geocentric(&MARS, centuries),
            Planet::Jupiter => geocentric(&JUPITER, centuries),
            Planet::Saturn => geocentric(&SATURN, centuries),
        }
    }
}

impl LongitudeModel for MeanMotionModel {
    fn longitude(&self, body: Planet, at: &DateTime<FixedOffset>) -> f64 {
        let raw = Self::raw_longitude(body, julian_centuries(at));
        // Inputs are finite for any representable instant
        normalize_degrees(raw).unwrap_or(0.0)
    }
}

/// Geocentric longitude of a planet seen from the mean Earth
fn geocentric(orbit: &MeanOrbit, centuries: f64) -> f64 {
    let (px, py) = orbit.position(centuries);
    let (ex, ey) = EARTH.position(centuries);
    (py - ey).atan2(px - ex).to_degrees()
}

/// Julian centuries elapsed since J2000
pub fn julian_centuries(at: &DateTime<FixedOffset>) -> f64 {
    let seconds = (at.timestamp_millis() - J2000_UNIX_SECONDS * 1000) as f64 / 1000.0;
    seconds / 86_400.0 / DAYS_PER_CENTURY
}
