//! Loading workshop configuration from TOML.
//!
//! Every section is optional; missing keys fall back to the defaults below.
//! `POEMS_PATH` overrides `data_path` regardless of what the file says.

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_DATA_PATH: &str = "data/poems.json";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WorkshopConfig {
  pub data_path: String,
  /// Seeds every session RNG as `rng_seed + session ordinal` when set.
  pub rng_seed: Option<u64>,
  pub grading: GradingCfg,
  pub history: HistoryCfg,
  pub creation: CreationCfg,
  pub sessions: SessionsCfg,
}

impl Default for WorkshopConfig {
  fn default() -> Self {
    Self {
      data_path: DEFAULT_DATA_PATH.into(),
      rng_seed: None,
      grading: GradingCfg::default(),
      history: HistoryCfg::default(),
      creation: CreationCfg::default(),
      sessions: SessionsCfg::default(),
    }
  }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GradingCfg {
  /// Ignore whitespace and trailing punctuation when comparing answers.
  pub lenient: bool,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct HistoryCfg {
  pub challenge_recent: usize,
  pub report_recent: usize,
}

impl Default for HistoryCfg {
  fn default() -> Self {
    Self { challenge_recent: 5, report_recent: 3 }
  }
}

/// Pacing of the simulated creation progress stream.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct CreationCfg {
  pub steps: u32,
  pub tick_ms: u64,
  pub settle_ms: u64,
}

impl Default for CreationCfg {
  fn default() -> Self {
    Self { steps: 100, tick_ms: 30, settle_ms: 500 }
  }
}

/// Session lifetime. Sessions untouched for `idle_secs` are dropped the next
/// time a session opens.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SessionsCfg {
  pub idle_secs: u64,
}

impl Default for SessionsCfg {
  fn default() -> Self {
    Self { idle_secs: 30 * 60 }
  }
}

/// Parse a TOML document into a config.
pub fn parse_config(s: &str) -> Result<WorkshopConfig, toml::de::Error> {
  toml::from_str::<WorkshopConfig>(s)
}

/// Read WORKSHOP_CONFIG_PATH (if set) and apply env overrides.
/// IO and parse errors are logged and the defaults are used instead.
pub fn load_config_from_env() -> WorkshopConfig {
  let mut cfg = match std::env::var("WORKSHOP_CONFIG_PATH") {
    Ok(path) => match std::fs::read_to_string(&path) {
      Ok(s) => match parse_config(&s) {
        Ok(cfg) => {
          info!(target: "tangshi_workshop", %path, "Loaded workshop config (TOML)");
          cfg
        }
        Err(e) => {
          error!(target: "tangshi_workshop", %path, error = %e, "Failed to parse TOML config");
          WorkshopConfig::default()
        }
      },
      Err(e) => {
        error!(target: "tangshi_workshop", %path, error = %e, "Failed to read TOML config file");
        WorkshopConfig::default()
      }
    },
    Err(_) => WorkshopConfig::default(),
  };

  if let Ok(p) = std::env::var("POEMS_PATH") {
    if !p.trim().is_empty() {
      cfg.data_path = p;
    }
  }
  cfg
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_document_yields_defaults() {
    let cfg = parse_config("").expect("parse");
    assert_eq!(cfg.data_path, DEFAULT_DATA_PATH);
    assert_eq!(cfg.rng_seed, None);
    assert!(!cfg.grading.lenient);
    assert_eq!(cfg.history.challenge_recent, 5);
    assert_eq!(cfg.history.report_recent, 3);
    assert_eq!(cfg.creation.steps, 100);
    assert_eq!(cfg.sessions.idle_secs, 1800);
  }

  #[test]
  fn partial_sections_keep_other_defaults() {
    let cfg = parse_config(
      r#"
        rng_seed = 7
        [grading]
        lenient = true
        [creation]
        tick_ms = 0
        [sessions]
        idle_secs = 60
      "#,
    )
    .expect("parse");
    assert_eq!(cfg.rng_seed, Some(7));
    assert!(cfg.grading.lenient);
    assert_eq!(cfg.creation.tick_ms, 0);
    assert_eq!(cfg.creation.settle_ms, 500);
    assert_eq!(cfg.sessions.idle_secs, 60);
    assert_eq!(cfg.data_path, DEFAULT_DATA_PATH);
  }

  #[test]
  fn malformed_document_is_an_error() {
    assert!(parse_config("rng_seed = \"abc\"").is_err());
  }
}
