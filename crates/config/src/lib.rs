//! Configuration loading and validation for OpenPaw.
//!
//! Loads configuration from `~/.openpaw/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.openpaw/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key. Usually supplied via `GEMINI_API_KEY` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model to use for generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum model/tool cycles per user turn.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// How many recent log rows are replayed as context.
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// Human-in-the-loop approval settings.
    #[serde(default)]
    pub hitl: HitlConfig,

    /// Long-term memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Tool settings.
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_max_turns() -> u32 {
    5
}
fn default_history_limit() -> u32 {
    40
}
fn default_true() -> bool {
    true
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "api_key",
                &match self.api_key {
                    Some(_) => "[REDACTED]",
                    None => "None",
                },
            )
            .field("model", &self.model)
            .field("max_turns", &self.max_turns)
            .field("history_limit", &self.history_limit)
            .field("hitl", &self.hitl)
            .field("memory", &self.memory)
            .field("tools", &self.tools)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitlConfig {
    /// When true, tools marked unsafe require approval before running.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for HitlConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// SQLite database path. Defaults to `~/.openpaw/openpaw.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,

    /// How many memories are recalled per turn.
    #[serde(default = "default_recall_limit")]
    pub recall_limit: u32,
}

fn default_recall_limit() -> u32 {
    5
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            db_path: None,
            recall_limit: default_recall_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Directory the file tools are confined to. Defaults to
    /// `~/.openpaw/workspace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_dir: Option<String>,

    /// If non-empty, only these base commands may run via the shell tool.
    #[serde(default = "default_shell_allowlist")]
    pub shell_allowlist: Vec<String>,

    #[serde(default = "default_shell_timeout")]
    pub shell_timeout_secs: u64,
}

fn default_shell_allowlist() -> Vec<String> {
    vec![
        "ls".into(),
        "cat".into(),
        "grep".into(),
        "git".into(),
        "echo".into(),
        "date".into(),
    ]
}
fn default_shell_timeout() -> u64 {
    30
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            workspace_dir: None,
            shell_allowlist: default_shell_allowlist(),
            shell_timeout_secs: default_shell_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.openpaw/config.toml).
    ///
    /// Environment overrides, highest priority first:
    /// - `GEMINI_API_KEY` or `OPENPAW_API_KEY` for the API key
    /// - `OPENPAW_MODEL` for the model
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(key) = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("OPENPAW_API_KEY"))
        {
            config.api_key = Some(key);
        }
        if let Ok(model) = std::env::var("OPENPAW_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".openpaw")
    }

    /// Directory file tools operate in.
    pub fn workspace_dir(&self) -> PathBuf {
        self.tools
            .workspace_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::config_dir().join("workspace"))
    }

    /// SQLite database path for the message log and memories.
    pub fn db_path(&self) -> PathBuf {
        self.memory
            .db_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::config_dir().join("openpaw.db"))
    }

    /// Path to the optional system prompt guide file.
    pub fn guide_path() -> PathBuf {
        Self::config_dir().join("guide.md")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "max_turns must be at least 1".into(),
            ));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "history_limit must be at least 1".into(),
            ));
        }
        if self.tools.shell_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "shell_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_turns: default_max_turns(),
            history_limit: default_history_limit(),
            hitl: HitlConfig::default(),
            memory: MemoryConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.max_turns, 5);
        assert!(config.hitl.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.history_limit, 40);
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "gemini-2.5-pro"
max_turns = 8

[hitl]
enabled = false
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.max_turns, 8);
        assert!(!config.hitl.enabled);
        assert_eq!(config.history_limit, 40);
        assert!(config.memory.enabled);
    }

    #[test]
    fn zero_max_turns_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_turns = 0").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = [not toml").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let config = AppConfig {
            api_key: Some("super-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn explicit_paths_override_defaults() {
        let config = AppConfig {
            memory: MemoryConfig {
                db_path: Some("/data/paw.db".into()),
                ..MemoryConfig::default()
            },
            tools: ToolsConfig {
                workspace_dir: Some("/data/ws".into()),
                ..ToolsConfig::default()
            },
            ..AppConfig::default()
        };
        assert_eq!(config.db_path(), PathBuf::from("/data/paw.db"));
        assert_eq!(config.workspace_dir(), PathBuf::from("/data/ws"));
    }
}
