//! Configuration for the recall engine.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub assessment: AssessmentConfig,
}

impl Config {
    /// Load from the user config file, falling back to defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default()
    }

    /// Load from `path`. A missing or invalid file gives defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match Self::from_toml_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                Self::default()
            }
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the scheduler cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate()
    }

    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "parlons")
            .map(|d| d.config_dir().join("config.toml"))
    }

    pub fn db_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "parlons")
            .map(|d| d.data_dir().join("parlons.db"))
    }
}

/// Longest recall tier accepted: ten years.
pub const MAX_TIER_SECS: i64 = 10 * 365 * 86_400;

/// Graduated-interval tiers (seconds) and performance bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_immediate")]
    pub immediate: i64,
    #[serde(default = "default_short_term")]
    pub short_term: i64,
    #[serde(default = "default_medium_term")]
    pub medium_term: i64,
    #[serde(default = "default_long_term")]
    pub long_term: i64,
    #[serde(default = "default_extended")]
    pub extended: i64,
    #[serde(default = "default_deep_memory")]
    pub deep_memory: i64,
    /// Scores at or above this advance one phase.
    #[serde(default = "default_advance_threshold")]
    pub advance_threshold: f64,
    /// Scores at or above this (and below advance) hold the phase.
    #[serde(default = "default_hold_threshold")]
    pub hold_threshold: f64,
    /// Review priority weight for hard items.
    #[serde(default = "default_hard_multiplier")]
    pub hard_multiplier: f64,
}

fn default_immediate() -> i64 { 5 }
fn default_short_term() -> i64 { 30 }
fn default_medium_term() -> i64 { 120 }
fn default_long_term() -> i64 { 600 }
fn default_extended() -> i64 { 86_400 }
fn default_deep_memory() -> i64 { 604_800 }
fn default_advance_threshold() -> f64 { 90.0 }
fn default_hold_threshold() -> f64 { 70.0 }
fn default_hard_multiplier() -> f64 { 1.5 }

impl SchedulerConfig {
    /// Tiers must lie in `1..=MAX_TIER_SECS`; thresholds in 0-100 with hold <= advance.
    pub fn validate(&self) -> Result<()> {
        let tiers = [
            ("immediate", self.immediate),
            ("short_term", self.short_term),
            ("medium_term", self.medium_term),
            ("long_term", self.long_term),
            ("extended", self.extended),
            ("deep_memory", self.deep_memory),
        ];
        for (name, secs) in tiers {
            if !(1..=MAX_TIER_SECS).contains(&secs) {
                return Err(Error::InvalidConfig(format!(
                    "scheduler.{name} = {secs} is outside 1..={MAX_TIER_SECS} seconds"
                )));
            }
        }

        let percent = 0.0..=100.0;
        if !percent.contains(&self.hold_threshold) || !percent.contains(&self.advance_threshold) {
            return Err(Error::InvalidConfig("scheduler thresholds must lie in 0-100".to_string()));
        }
        if self.hold_threshold > self.advance_threshold {
            return Err(Error::InvalidConfig(format!(
                "scheduler.hold_threshold {} exceeds advance_threshold {}",
                self.hold_threshold, self.advance_threshold
            )));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            immediate: 5,
            short_term: 30,
            medium_term: 120,
            long_term: 600,
            extended: 86_400,
            deep_memory: 604_800,
            advance_threshold: 90.0,
            hold_threshold: 70.0,
            hard_multiplier: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Hard cap on items per session.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// New items per new-content session.
    #[serde(default = "default_new_items")]
    pub new_items: usize,
    #[serde(default = "default_integration_new")]
    pub integration_new: usize,
    #[serde(default = "default_integration_review")]
    pub integration_review: usize,
    /// Overall progress gained per completed session.
    #[serde(default = "default_progress_step")]
    pub progress_step: f64,
}

fn default_max_items() -> usize { 10 }
fn default_new_items() -> usize { 5 }
fn default_integration_new() -> usize { 3 }
fn default_integration_review() -> usize { 7 }
fn default_progress_step() -> f64 { 2.0 }

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_items: 10,
            new_items: 5,
            integration_new: 3,
            integration_review: 7,
            progress_step: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Responses slower than this are flagged as hesitant.
    #[serde(default = "default_hesitation_threshold")]
    pub hesitation_threshold_ms: u64,
    /// Score pronunciation against the phonetic guide instead of the text.
    #[serde(default)]
    pub use_phonetic_guide: bool,
    #[serde(default = "default_continue_threshold")]
    pub continue_threshold: f64,
    #[serde(default = "default_explain_threshold")]
    pub explain_threshold: f64,
}

fn default_hesitation_threshold() -> u64 { 3000 }
fn default_continue_threshold() -> f64 { 70.0 }
fn default_explain_threshold() -> f64 { 50.0 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            hesitation_threshold_ms: 3000,
            use_phonetic_guide: false,
            continue_threshold: 70.0,
            explain_threshold: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_rate")]
    pub rate: f64,
    /// Listening gives up after this long.
    #[serde(default = "default_capture_timeout")]
    pub capture_timeout_ms: u64,
}

fn default_locale() -> String { "fr-FR".to_string() }
fn default_rate() -> f64 { 1.0 }
fn default_capture_timeout() -> u64 { 10_000 }

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            locale: "fr-FR".to_string(),
            rate: 1.0,
            capture_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentConfig {
    /// Categories averaging below this are weak.
    #[serde(default = "default_weak_below")]
    pub weak_below: f64,
    /// Categories averaging above this are strong.
    #[serde(default = "default_strong_above")]
    pub strong_above: f64,
}

fn default_weak_below() -> f64 { 60.0 }
fn default_strong_above() -> f64 { 80.0 }

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            weak_below: 60.0,
            strong_above: 80.0,
        }
    }
}
