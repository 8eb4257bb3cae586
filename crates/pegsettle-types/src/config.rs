//! Ledger configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{constants, PegsettleError, Result};

/// How a multi-entry message behaves when one entry fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// A failing entry rolls back every entry of the message.
    #[default]
    AllOrNothing,
    /// Stop at the failing entry; earlier entries stay applied.
    BestEffort,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: constants::DEFAULT_LOG_LEVEL.to_string(),
            json: false,
        }
    }
}

/// Configuration for one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub batch_mode: BatchMode,
    pub min_feedback_score: i64,
    pub max_feedback_score: i64,
    pub max_batch_entries: usize,
    pub max_record_bytes: usize,
    /// Deny trades on pegs reserved for a different taker.
    pub enforce_taker_address: bool,
    pub telemetry: TelemetryConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            batch_mode: BatchMode::default(),
            min_feedback_score: constants::DEFAULT_MIN_FEEDBACK_SCORE,
            max_feedback_score: constants::DEFAULT_MAX_FEEDBACK_SCORE,
            max_batch_entries: constants::DEFAULT_MAX_BATCH_ENTRIES,
            max_record_bytes: constants::DEFAULT_MAX_RECORD_BYTES,
            enforce_taker_address: true,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| PegsettleError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_feedback_score > self.max_feedback_score {
            return Err(PegsettleError::Configuration(format!(
                "min_feedback_score {} exceeds max_feedback_score {}",
                self.min_feedback_score, self.max_feedback_score
            )));
        }
        if self.max_batch_entries == 0 {
            return Err(PegsettleError::Configuration(
                "max_batch_entries must be > 0".into(),
            ));
        }
        if self.max_record_bytes <= constants::RECORD_LENGTH_PREFIX {
            return Err(PegsettleError::Configuration(format!(
                "max_record_bytes must exceed {}",
                constants::RECORD_LENGTH_PREFIX
            )));
        }
        Ok(())
    }

    /// Reject a score outside the configured bounds.
    pub fn check_score(&self, score: i64) -> Result<()> {
        if score < self.min_feedback_score || score > self.max_feedback_score {
            return Err(PegsettleError::ScoreOutOfRange {
                score,
                min: self.min_feedback_score,
                max: self.max_feedback_score,
            });
        }
        Ok(())
    }

    /// Reject an empty or oversized batch.
    pub fn check_batch_len(&self, len: usize) -> Result<()> {
        if len == 0 || len > self.max_batch_entries {
            return Err(PegsettleError::BatchSize {
                got: len,
                max: self.max_batch_entries,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = LedgerConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.batch_mode, BatchMode::AllOrNothing);
        assert_eq!(cfg.max_feedback_score, 100);
        assert!(cfg.enforce_taker_address);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = LedgerConfig::from_json_str(r#"{"batch_mode":"best_effort"}"#).unwrap();
        assert_eq!(cfg.batch_mode, BatchMode::BestEffort);
        assert_eq!(cfg.max_batch_entries, constants::DEFAULT_MAX_BATCH_ENTRIES);
        assert_eq!(cfg.telemetry.level, "info");
    }

    #[test]
    fn inverted_score_bounds_rejected() {
        let err = LedgerConfig::from_json_str(r#"{"min_feedback_score":10,"max_feedback_score":5}"#)
            .unwrap_err();
        assert!(matches!(err, PegsettleError::Configuration(_)));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = LedgerConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, PegsettleError::Configuration(_)));
    }

    #[test]
    fn score_bounds_inclusive() {
        let cfg = LedgerConfig::default();
        cfg.check_score(0).unwrap();
        cfg.check_score(100).unwrap();
        assert!(matches!(
            cfg.check_score(101).unwrap_err(),
            PegsettleError::ScoreOutOfRange { .. }
        ));
        assert!(cfg.check_score(-1).is_err());
    }

    #[test]
    fn batch_len_bounds() {
        let cfg = LedgerConfig::default();
        assert!(cfg.check_batch_len(0).is_err());
        cfg.check_batch_len(1).unwrap();
        assert!(cfg.check_batch_len(cfg.max_batch_entries + 1).is_err());
    }
}
