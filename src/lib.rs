//! Planetary Hours - deterministic engine for planetary hours and their rulers
//!
//! For a civil day and a location the engine splits daylight and night into
//! twelve unequal hours each, assigns rulers in Chaldean order and enriches each
//! hour with the ruler's zodiac sign, essential dignity, strength and natal
//! resonance: sun times → sequencing → zodiac placement → dignity and
//! resonance → strength → encoding.
//!
//! ## Modules
//!
//! - **Core**: `sequencer`, `zodiac`, `dignity`, `resonance`
//! - **Models**: `sun` (sunrise/sunset) and `longitude` (ecliptic longitudes),
//!   both behind traits so callers can plug in their own sources
//! - **Orchestration**: `pipeline` ([`HourEngine`]) and `encoder`
//! - **Surfaces**: `profile` (saved settings) and `ffi` (C ABI)

pub mod config;
pub mod dignity;
pub mod encoder;
pub mod error;
pub mod longitude;
pub mod pipeline;
pub mod profile;
pub mod resonance;
pub mod sequencer;
pub mod sun;
pub mod types;
pub mod zodiac;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::{EngineConfig, PlacementMode};
pub use error::HoursError;
pub use longitude::{LongitudeModel, MeanMotionModel};
pub use pipeline::{planetary_hours_for_day, planetary_hours_json, HourEngine};
pub use profile::Profile;
pub use sequencer::{current_hour, day_ruler, generate_hours, HourSequencer};
pub use sun::{SolarCalculator, SunTimeProvider};
pub use types::{
    DayReport, Dignity, EnrichedHour, Location, NatalChart, Planet, PlanetaryHour, Strength,
    StrengthTier, SunTimes, ZodiacSign, CHALDEAN_ORDER,
};

/// Library version embedded in all payloads
pub const HOURS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for payloads
pub const PRODUCER_NAME: &str = "planetary-hours";
