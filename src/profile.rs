//! Saved location and natal data
//!
//! A [`Profile`] is the JSON document the CLI and FFI callers keep between runs.
//! The engine never reads it on its own; callers pull the location and natal
//! chart out and pass them in.

use crate::config::EngineConfig;
use crate::error::HoursError;
use crate::resonance::validate_natal;
use crate::types::{Location, NatalChart};
use serde::{Deserialize, Serialize};

/// Longest place name kept, in characters
pub const MAX_PLACE_NAME_CHARS: usize = 200;

/// Persisted user settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natal: Option<NatalChart>,

    #[serde(default)]
    pub engine: EngineConfig,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a profile, rejecting a stored location that fails validation
    pub fn from_json(json: &str) -> Result<Self, HoursError> {
        let mut profile: Profile = serde_json::from_str(json)?;
        if let Some(location) = profile.location.as_mut() {
            location.validate()?;
            location.name = sanitize_place_name(&location.name);
        }
        Ok(profile)
    }

    pub fn to_json(&self) -> Result<String, HoursError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Store a location after validating it and cleaning its name
    pub fn set_location(&mut self, mut location: Location) -> Result<(), HoursError> {
        location.validate()?;
        location.name = sanitize_place_name(&location.name);
        self.location = Some(location);
        Ok(())
    }

    /// Store natal data after validating it against the saved location's offset
    pub fn set_natal(&mut self, natal: NatalChart) -> Result<(), HoursError> {
        let fallback = self
            .location
            .as_ref()
            .map(|l| l.utc_offset_minutes)
            .unwrap_or(0);
        validate_natal(&natal, fallback)?;
        self.natal = Some(natal);
        Ok(())
    }

    /// Forget location and natal data; engine settings are kept
    pub fn clear(&mut self) {
        self.location = None;
        self.natal = None;
    }

    pub fn is_configured(&self) -> bool {
        self.location.is_some()
    }
}

/// Trim, drop angle brackets and cap the length of a place name
pub fn sanitize_place_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_PLACE_NAME_CHARS)
        .collect()
}
