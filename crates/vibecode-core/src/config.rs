//! Configuration types for the Vibecode interviewer.
//!
//! Configuration is optional: every field has a default, and a missing file
//! means the defaults below.
//!
//! ```yaml
//! api:
//!   base_url: "http://localhost:8000/api"
//!   request_timeout_secs: 30
//! session:
//!   level: "Senior"
//!   topic: "Graphs"
//! recording:
//!   path: "interview.jsonl"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Candidate levels the task generator knows about.
const KNOWN_LEVELS: &[&str] = &["Junior", "Middle", "Senior"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterviewConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub recording: RecordingConfig,

    /// Verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Suppress all warnings (for CI environments).
    #[serde(default, rename = "_suppress_warnings")]
    pub suppress_warnings: bool,
}

/// External service endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL all endpoint paths are appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. Requests wait indefinitely when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Parameters sent when creating an interview session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default = "default_topic")]
    pub topic: String,
}

fn default_level() -> String {
    "Middle".to_string()
}

fn default_topic() -> String {
    "Algorithms".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            topic: default_topic(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// JSONL transcript file. No recording when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl InterviewConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        debug!(path = %path_ref.display(), "Loading configuration from file");
        let content = std::fs::read_to_string(path_ref)?;
        let config: Self = serde_yaml::from_str(&content)?;
        debug!(
            base_url = %config.api.base_url,
            level = %config.session.level,
            topic = %config.session.topic,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads the file when it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        if path_ref.exists() {
            Self::from_file(path_ref)
        } else {
            debug!(path = %path_ref.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Validates the configuration.
    ///
    /// Returns warnings for values the services may not understand, or an
    /// error when the configuration cannot work at all.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.api.base_url.clone()));
        }

        let mut warnings = Vec::new();
        if self.suppress_warnings {
            return Ok(warnings);
        }

        if !KNOWN_LEVELS.contains(&self.session.level.as_str()) {
            warnings.push(ConfigWarning::InvalidValue {
                field: "session.level".to_string(),
                message: format!(
                    "Unknown level '{}'; expected one of {}",
                    self.session.level,
                    KNOWN_LEVELS.join(", ")
                ),
            });
        }

        if self.session.topic.trim().is_empty() {
            warnings.push(ConfigWarning::InvalidValue {
                field: "session.topic".to_string(),
                message: "Topic is empty; the task generator will pick one".to_string(),
            });
        }

        if self.api.request_timeout_secs == Some(0) {
            warnings.push(ConfigWarning::InvalidValue {
                field: "api.request_timeout_secs".to_string(),
                message: "A zero timeout fails every request".to_string(),
            });
        }

        Ok(warnings)
    }
}

/// Configuration warnings emitted during validation.
#[derive(Debug, Clone)]
pub enum ConfigWarning {
    /// Field has a suspicious value.
    InvalidValue { field: String, message: String },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::InvalidValue { field, message } => {
                write!(f, "Warning [{}]: {}", field, message)
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid base URL '{0}': must start with http:// or https://")]
    InvalidBaseUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = InterviewConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert!(config.api.request_timeout().is_none());
        assert_eq!(config.session.level, "Middle");
        assert_eq!(config.session.topic, "Algorithms");
        assert!(config.recording.path.is_none());
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
session:
  topic: "Graphs"
api:
  request_timeout_secs: 15
"#;
        let config: InterviewConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.session.level, "Middle");
        assert_eq!(config.session.topic, "Graphs");
        assert_eq!(config.api.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
    }

    #[test]
    fn test_validate_warns_on_unknown_level_and_empty_topic() {
        let yaml = r#"
session:
  level: "Principal"
  topic: "  "
"#;
        let config: InterviewConfig = serde_yaml::from_str(yaml).unwrap();
        let warnings = config.validate().unwrap();

        assert_eq!(warnings.len(), 2);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ConfigWarning::InvalidValue { field, .. } if field == "session.level")));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ConfigWarning::InvalidValue { field, .. } if field == "session.topic")));
    }

    #[test]
    fn test_suppress_warnings() {
        let yaml = r#"
_suppress_warnings: true
session:
  level: "Principal"
"#;
        let config: InterviewConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_base_url_is_error_even_when_suppressed() {
        let yaml = r#"
_suppress_warnings: true
api:
  base_url: "localhost:8000"
"#;
        let config: InterviewConfig = serde_yaml::from_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl(url) if url == "localhost:8000"));
    }

    #[test]
    fn test_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "recording:\n  path: out.jsonl\nverbose: true").unwrap();

        let config = InterviewConfig::from_file(file.path()).unwrap();
        assert_eq!(config.recording.path, Some(PathBuf::from("out.jsonl")));
        assert!(config.verbose);

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("vibecode.yml");
        assert!(matches!(InterviewConfig::from_file(&missing), Err(ConfigError::Io(_))));
        let defaults = InterviewConfig::load_or_default(&missing).unwrap();
        assert_eq!(defaults.session.level, "Middle");
    }

    #[test]
    fn test_warning_display() {
        let warning = ConfigWarning::InvalidValue {
            field: "session.level".to_string(),
            message: "bad".to_string(),
        };
        assert_eq!(warning.to_string(), "Warning [session.level]: bad");
    }
}
