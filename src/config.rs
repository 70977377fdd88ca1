//! Engine configuration

use crate::error::HoursError;
use crate::types::Planet;
use serde::{Deserialize, Serialize};

/// Which instant each hour's ruler is placed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Every hour uses the evaluation instant
    #[default]
    EvaluationTime,
    /// Each hour uses its own start instant
    HourStart,
}

/// Tunables for [`crate::HourEngine`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub placement: PlacementMode,

    /// Ruler used when a day ruler name cannot be resolved. `None` fails instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruler_fallback: Option<Planet>,
}

impl EngineConfig {
    pub fn with_placement(mut self, placement: PlacementMode) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_ruler_fallback(mut self, fallback: Planet) -> Self {
        self.ruler_fallback = Some(fallback);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, HoursError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, HoursError> {
        Ok(serde_json::to_string(self)?)
    }
}
