use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::normalizer::FormattingOptions;
use crate::transport::{DEFAULT_ACCEPT_LANGUAGE, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_USER_AGENT};

/// Config file looked up in the working directory before the user config dir
const LOCAL_CONFIG: &str = "tubescript.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP client settings
    pub http: HttpConfig,

    /// Default transcript formatting
    pub formatting: FormattingOptions,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Browser identity sent with every request
    pub user_agent: String,

    /// Accept-Language used when no caption language is requested
    pub accept_language: String,

    /// Retries after a failed request
    pub max_retries: u32,

    /// Pause between attempts in milliseconds
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default output format
    pub default_output_format: String,

    /// Default caption language (platform default track if unset)
    pub default_language: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_output_format: "text".to_string(),
            default_language: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, the default locations, or built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => Self::config_path().filter(|candidate| candidate.exists()),
        };

        let Some(path) = path else {
            tracing::debug!("No config file found, using defaults");
            return Ok(Self::default());
        };

        let content = fs_err::read_to_string(&path).context("Failed to read config file")?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration to `path` or the user config directory
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(explicit) => explicit.to_path_buf(),
            None => Self::user_config_path()?,
        };

        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs_err::write(&path, content).context("Failed to write config file")?;

        Ok(path)
    }

    /// First existing default location: working directory, then user config dir
    fn config_path() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            return Some(local_config);
        }
        Self::user_config_path().ok()
    }

    fn user_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("tubescript").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            anyhow::bail!("http.user_agent must not be empty");
        }
        if !(self.formatting.time_gap_threshold >= 0.0) {
            anyhow::bail!("formatting.timeGapThreshold must be a non-negative number");
        }
        if self.formatting.max_sentences_per_paragraph == 0 {
            anyhow::bail!("formatting.maxSentencesPerParagraph must be at least 1");
        }
        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  User Agent: {}", self.http.user_agent);
        println!("  Accept-Language: {}", self.http.accept_language);
        println!(
            "  Retries: {} ({} ms apart)",
            self.http.max_retries, self.http.retry_delay_ms
        );
        println!("  Paragraphs: {}", self.formatting.enable_paragraphs);
        println!("  Paragraph Gap: {}s", self.formatting.time_gap_threshold);
        println!(
            "  Max Fragments Per Paragraph: {}",
            self.formatting.max_sentences_per_paragraph
        );
        println!("  Default Format: {}", self.app.default_output_format);
        if let Some(language) = &self.app.default_language {
            println!("  Default Language: {}", language);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.http.retry_delay_ms, 1000);
        assert_eq!(config.http.accept_language, "en-US,en;q=0.9");
        assert!(!config.formatting.enable_paragraphs);
        assert_eq!(config.app.default_output_format, "text");
    }

    #[test]
    fn test_load_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "http:\n  max_retries: 1\nformatting:\n  enableParagraphs: true\n  timeGapThreshold: 3.5\napp:\n  default_language: fr"
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.http.max_retries, 1);
        assert_eq!(config.http.user_agent, DEFAULT_USER_AGENT);
        assert!(config.formatting.enable_paragraphs);
        assert_eq!(config.formatting.time_gap_threshold, 3.5);
        assert_eq!(config.formatting.max_sentences_per_paragraph, 5);
        assert_eq!(config.app.default_language.as_deref(), Some("fr"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "formatting:\n  maxSentencesPerParagraph: 0").unwrap();
        assert!(Config::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.http.max_retries = 5;
        let written = config.save(Some(&path)).unwrap();
        assert_eq!(written, path);

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.http.max_retries, 5);
    }
}
