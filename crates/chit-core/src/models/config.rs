//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{ChitError, Result};

/// Main configuration for the chit pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChitConfig {
    /// Deterministic engine configuration.
    pub engine: EngineConfig,

    /// Fallback collaborator configuration.
    pub fallback: FallbackConfig,
}

/// Deterministic engine thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum confidence to keep a deterministic match (0.0 - 1.0).
    /// Lines below it are demoted to the fallback path.
    pub min_confidence: f32,

    /// Acceptance floor for the numeric disambiguator (0.0 - 1.0).
    pub disambiguation_floor: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            disambiguation_floor: 0.85,
        }
    }
}

/// Fallback collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Endpoint URL of the external parsing service, if one is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Bounded wait for the batched fallback call, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: 10_000,
        }
    }
}

impl ChitConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> std::result::Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }

    /// Check that thresholds are in range. Out-of-range values are a
    /// construction error, not a data-quality outcome.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.engine.min_confidence) {
            return Err(ChitError::Config(format!(
                "min_confidence {} is out of [0, 1]",
                self.engine.min_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.engine.disambiguation_floor) {
            return Err(ChitError::Config(format!(
                "disambiguation_floor {} is out of [0, 1]",
                self.engine.disambiguation_floor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ChitConfig::default();
        assert_eq!(config.engine.min_confidence, 0.5);
        assert_eq!(config.engine.disambiguation_floor, 0.85);
        assert_eq!(config.fallback.timeout_ms, 10_000);
        assert!(config.fallback.endpoint.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let mut config = ChitConfig::default();
        config.engine.min_confidence = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: ChitConfig =
            serde_json::from_str(r#"{"engine": {"min_confidence": 0.7}}"#).unwrap();
        assert_eq!(config.engine.min_confidence, 0.7);
        assert_eq!(config.engine.disambiguation_floor, 0.85);
    }
}
