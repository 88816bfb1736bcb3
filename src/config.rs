//! Service configuration: optional TOML file plus a few env overrides.
//!
//! File path comes from QUIZCRAFT_CONFIG_PATH. Missing keys take defaults:
//!
//! ```toml
//! api_base_url = "http://localhost:8000"
//! port = 3000
//! static_dir = "./static"
//! request_timeout_secs = 60
//! max_upload_bytes = 26214400
//! display_offset_minutes = 120     # omit to use the server's local zone
//!
//! [defaults.initial_group]
//! type = "True or False"
//! difficulty = "Medium"
//! count = 1
//!
//! [defaults.appended_group]
//! type = "Multiple choice"
//! difficulty = "Medium"
//! count = 1
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::QuestionGroupConfig;
use crate::history::{fixed_offset_minutes, DisplayZone};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  pub api_base_url: String,
  pub port: u16,
  pub static_dir: String,
  pub request_timeout_secs: u64,
  pub max_upload_bytes: usize,
  pub display_offset_minutes: Option<i32>,
  pub defaults: GroupDefaults,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      api_base_url: "http://localhost:8000".into(),
      port: 3000,
      static_dir: "./static".into(),
      request_timeout_secs: 60,
      max_upload_bytes: 25 * 1024 * 1024,
      display_offset_minutes: None,
      defaults: GroupDefaults::default(),
    }
  }
}

/// Groups used when a form mounts and when a group is appended without fields.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct GroupDefaults {
  pub initial_group: QuestionGroupConfig,
  pub appended_group: QuestionGroupConfig,
}

impl Default for GroupDefaults {
  fn default() -> Self {
    Self {
      initial_group: QuestionGroupConfig::initial(),
      appended_group: QuestionGroupConfig::appended(),
    }
  }
}

impl AppConfig {
  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  pub fn display_zone(&self) -> DisplayZone { DisplayZone::from_offset_minutes(self.display_offset_minutes) }

  /// The configured display offset, if set and not a valid UTC offset.
  pub fn invalid_display_offset(&self) -> Option<i32> {
    self.display_offset_minutes.filter(|m| fixed_offset_minutes(*m).is_none())
  }

  pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> { toml::from_str(s) }

  /// Load from QUIZCRAFT_CONFIG_PATH (defaults on any IO/parse error), then apply env overrides.
  pub fn load_from_env() -> Self {
    let mut cfg = match std::env::var("QUIZCRAFT_CONFIG_PATH") {
      Ok(path) => match std::fs::read_to_string(&path) {
        Ok(s) => match Self::from_toml(&s) {
          Ok(cfg) => {
            info!(target: "quizcraft", %path, "Loaded config (TOML)");
            cfg
          }
          Err(e) => {
            error!(target: "quizcraft", %path, error = %e, "Failed to parse TOML config; using defaults");
            Self::default()
          }
        },
        Err(e) => {
          error!(target: "quizcraft", %path, error = %e, "Failed to read TOML config file; using defaults");
          Self::default()
        }
      },
      Err(_) => Self::default(),
    };

    if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
      cfg.port = port;
    }
    if let Ok(url) = std::env::var("QUIZCRAFT_API_BASE_URL") {
      cfg.api_base_url = url;
    }
    if let Ok(dir) = std::env::var("QUIZCRAFT_STATIC_DIR") {
      cfg.static_dir = dir;
    }
    if let Some(minutes) = cfg.invalid_display_offset() {
      warn!(target: "quizcraft", minutes, "display_offset_minutes is not a valid UTC offset; showing times in the server's local zone");
    }
    cfg
  }
}
