//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$NOTEMIME_CONFIG` (environment variable)
//! 2. `~/.config/notemime/config.toml` (Linux/macOS)
//!    `%APPDATA%\notemime\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{NoteError, Result};
use crate::model::note::Classification;
use crate::note::encode::EncodeOptions;
use crate::note::DEFAULT_TITLE;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Defaults applied to notes created from the command line.
    pub note: NoteConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteConfig {
    /// Subject used for notes without a title.
    pub default_title: String,
    /// Author written into new notes.
    pub default_from: String,
    /// Classification of new notes: "public", "private" or "confidential".
    pub classification: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Indent JSON output.
    pub pretty_json: bool,
    /// Where `new` writes notes when no directory is given.
    pub directory: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cache_dir: None,
        }
    }
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
            default_from: String::new(),
            classification: "public".to_string(),
        }
    }
}

impl Config {
    /// Encoder options derived from the `[note]` section.
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            default_title: self.note.default_title.clone(),
        }
    }

    /// The configured classification for new notes.
    pub fn classification(&self) -> Result<Classification> {
        self.note
            .classification
            .parse()
            .map_err(NoteError::Config)
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load the configuration file, falling back to defaults if it is missing
/// or unreadable.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match parse_config(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Parse TOML configuration text.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| NoteError::Config(e.to_string()))
}

/// Get the config file path.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("NOTEMIME_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("notemime").join("config.toml"))
}

/// Get the cache directory, respecting config override.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notemime")
}

/// Get the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("notemime.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.note.default_title, "New Note");
        assert_eq!(cfg.classification().unwrap(), Classification::Public);
        assert!(!cfg.output.pretty_json);
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed = parse_config(&toml_str).expect("deserialize");
        assert_eq!(parsed.note.default_title, cfg.note.default_title);
        assert_eq!(parsed.general.log_level, cfg.general.log_level);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[note]
default_title = "Scratch"
classification = "Confidential"

[output]
pretty_json = true
"#;
        let cfg = parse_config(partial).expect("parse partial");
        assert_eq!(cfg.encode_options().default_title, "Scratch");
        assert_eq!(cfg.classification().unwrap(), Classification::Confidential);
        assert!(cfg.output.pretty_json);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        assert!(matches!(parse_config("[note]\ndefault_title = 3"), Err(NoteError::Config(_))));

        let mut cfg = Config::default();
        cfg.note.classification = "secret".into();
        assert!(matches!(cfg.classification(), Err(NoteError::Config(_))));
    }

    #[test]
    fn test_log_file_in_cache_dir() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/nm-cache"));
        assert_eq!(log_file_path(&cfg), PathBuf::from("/tmp/nm-cache/notemime.log"));
    }
}
