//! Configuration loading.
//!
//! Settings come from an optional TOML file, then environment overrides.
//! Lookup order for the file: explicit path, `./agendex.toml`,
//! `<config dir>/agendex/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::extract::PopplerBackend;
use crate::llm::LlmConfig;

/// Config file name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "agendex.toml";

/// Default input document.
pub const DEFAULT_INPUT: &str = "Board-of-Supervisors-Agenda.pdf";

/// Default output file.
pub const DEFAULT_OUTPUT: &str = "extracted_document.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Text extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Preserve physical layout (pdftotext `-layout`)
    #[serde(default = "default_layout")]
    pub layout: bool,
}

fn default_layout() -> bool {
    true
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
        }
    }
}

impl ExtractionConfig {
    pub fn backend(&self) -> PopplerBackend {
        PopplerBackend::new().with_layout(self.layout)
    }
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_input")]
    pub input: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_input() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT)
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            extraction: ExtractionConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from `explicit` or the first discovered config file,
    /// then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match explicit {
            Some(path) => Self::from_file(&expand_path(path))?,
            None => match discover_config_file() {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        Ok(settings.with_env_overrides())
    }

    /// Parse a config file without environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.input = expand_path(&settings.input);
        settings.output = expand_path(&settings.output);
        Ok(settings)
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.llm = self.llm.with_env_overrides();
        self
    }
}

/// First existing config file in the lookup order.
fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("agendex").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Expand `~` and environment variables in a path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmProvider;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.input, PathBuf::from("Board-of-Supervisors-Agenda.pdf"));
        assert_eq!(settings.output, PathBuf::from("extracted_document.json"));
        assert!(settings.extraction.layout);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agendex.toml");
        std::fs::write(
            &path,
            r#"
input = "agendas/2024-01-05.pdf"

[extraction]
layout = false

[llm]
provider = "anthropic"
model = "claude-3-5-haiku-20241022"
max_content_bytes = 200000
"#,
        )
        .unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.input, PathBuf::from("agendas/2024-01-05.pdf"));
        assert_eq!(settings.output, PathBuf::from(DEFAULT_OUTPUT));
        assert!(!settings.extraction.layout);
        assert_eq!(settings.llm.provider, LlmProvider::Anthropic);
        assert_eq!(settings.llm.model_id(), "claude-3-5-haiku-20241022");
        assert_eq!(settings.llm.max_content_bytes, Some(200_000));
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[llm]\nmax_tokens = \"lots\"\n").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/agendex.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_expand_plain_path_unchanged() {
        assert_eq!(
            expand_path(Path::new("agenda.pdf")),
            PathBuf::from("agenda.pdf")
        );
    }
}
