//! Configuration management.

use crate::lexicon::store::DEFAULT_MAX_FILE_BYTES;
use crate::observability::{LogFormat, LoggingConfig};
use crate::security::obscure::DEFAULT_MAX_TERM_BYTES;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the lexicon path.
pub const ENV_LEXICON_PATH: &str = "REDFLAG_LEXICON";

/// Default lexicon file location, relative to the working directory.
pub const DEFAULT_LEXICON_PATH: &str = "data/lexicon_b64.txt";

/// Main configuration for redflag.
#[derive(Debug, Clone)]
pub struct RedflagConfig {
    /// Path to the obscured lexicon file.
    pub lexicon_path: PathBuf,
    /// Maximum accepted lexicon file size in bytes.
    pub max_lexicon_bytes: u64,
    /// Maximum decoded size of a single term in bytes.
    pub max_term_bytes: usize,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Logging settings from the config file.
#[derive(Debug, Clone, Default)]
pub struct LoggingSettings {
    /// Output format.
    pub format: LogFormat,
    /// Filter directive (e.g. `info`, `redflag=debug`).
    pub level: Option<String>,
    /// Optional log file; stderr when unset.
    pub file: Option<PathBuf>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Lexicon file path.
    pub lexicon_path: Option<String>,
    /// Maximum lexicon file size.
    pub max_lexicon_bytes: Option<u64>,
    /// Maximum decoded term size.
    pub max_term_bytes: Option<usize>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileLogging {
    /// `pretty` or `json`.
    pub format: Option<String>,
    /// Filter directive.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl Default for RedflagConfig {
    fn default() -> Self {
        Self {
            lexicon_path: PathBuf::from(DEFAULT_LEXICON_PATH),
            max_lexicon_bytes: DEFAULT_MAX_FILE_BYTES,
            max_term_bytes: DEFAULT_MAX_TERM_BYTES,
            logging: LoggingSettings::default(),
        }
    }
}

impl RedflagConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;
        Self::from_toml(&contents).map_err(|e| match e {
            crate::Error::OperationFailed { operation, cause } => crate::Error::OperationFailed {
                operation,
                cause: format!("{}: {cause}", path.display()),
            },
            other => other,
        })
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/redflag/` on macOS)
    /// 2. XDG config dir (`~/.config/redflag/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load_default() -> crate::Result<Self> {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Ok(Self::default());
        };

        Self::load_first_existing(&[
            base_dirs.config_dir().join("redflag").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("redflag")
                .join("config.toml"),
        ])
    }

    /// Loads the first of `candidates` that exists, or the defaults if none do.
    ///
    /// # Errors
    ///
    /// Returns an error if the first existing file cannot be read or parsed.
    pub fn load_first_existing(candidates: &[PathBuf]) -> crate::Result<Self> {
        candidates
            .iter()
            .find(|p| p.exists())
            .map_or_else(|| Ok(Self::default()), |path| Self::load_from_file(path))
    }

    /// Applies environment variable overrides.
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if let Some(path) = std::env::var_os(ENV_LEXICON_PATH).filter(|v| !v.is_empty()) {
            self.lexicon_path = PathBuf::from(path);
        }
        self
    }

    /// Converts a `ConfigFile` to `RedflagConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(path) = file.lexicon_path {
            config.lexicon_path = PathBuf::from(path);
        }
        if let Some(limit) = file.max_lexicon_bytes {
            config.max_lexicon_bytes = limit;
        }
        if let Some(limit) = file.max_term_bytes {
            config.max_term_bytes = limit;
        }
        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            config.logging.level = logging.level;
            config.logging.file = logging.file.map(PathBuf::from);
        }

        config
    }

    /// Sets the lexicon path.
    #[must_use]
    pub fn with_lexicon_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lexicon_path = path.into();
        self
    }

    /// Returns a store for the configured lexicon, honoring the size limits.
    #[must_use]
    pub fn lexicon_store(&self) -> crate::LexiconStore {
        let codec = crate::ObscuringCodec::new().with_max_term_bytes(self.max_term_bytes);
        crate::LexiconStore::with_codec(&self.lexicon_path, codec)
            .with_max_file_bytes(self.max_lexicon_bytes)
    }

    /// Builds the logging configuration, preferring `verbose` over the file.
    #[must_use]
    pub fn logging_config(&self, verbose: bool) -> LoggingConfig {
        let default_level = if verbose { "debug" } else { "warn" };
        let level = if verbose {
            default_level
        } else {
            self.logging.level.as_deref().unwrap_or(default_level)
        };
        LoggingConfig::new(level)
            .with_format(self.logging.format)
            .with_file(self.logging.file.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RedflagConfig::new();
        assert_eq!(config.lexicon_path, PathBuf::from(DEFAULT_LEXICON_PATH));
        assert_eq!(config.max_lexicon_bytes, DEFAULT_MAX_FILE_BYTES);
        assert_eq!(config.max_term_bytes, DEFAULT_MAX_TERM_BYTES);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_from_toml_overlays_defaults() {
        let config = RedflagConfig::from_toml(
            r#"
            lexicon_path = "/srv/redflag/lexicon.txt"
            max_term_bytes = 512

            [logging]
            format = "json"
            level = "redflag=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.lexicon_path, PathBuf::from("/srv/redflag/lexicon.txt"));
        assert_eq!(config.max_term_bytes, 512);
        assert_eq!(config.max_lexicon_bytes, DEFAULT_MAX_FILE_BYTES);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level.as_deref(), Some("redflag=debug"));
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = RedflagConfig::from_toml("lexicon = \"x\"").unwrap_err();
        assert!(err.to_string().contains("parse_config_file"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = RedflagConfig::load_from_file(Path::new("/nonexistent/redflag.toml"))
            .unwrap_err();
        assert!(err.to_string().contains("read_config_file"));
    }

    #[test]
    fn test_unknown_key_in_default_config_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "lexicon_path = \"/tmp/custom.txt\"\nmax_term_byte = 10\n",
        )
        .unwrap();

        let err = RedflagConfig::load_first_existing(&[path.clone()]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("parse_config_file"));
        assert!(message.contains("max_term_byte"));
        assert!(message.contains(&path.display().to_string()));
    }

    #[test]
    fn test_first_existing_config_wins() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        let present = dir.path().join("config.toml");
        std::fs::write(&present, "lexicon_path = \"/tmp/custom.txt\"\n").unwrap();

        let config =
            RedflagConfig::load_first_existing(&[missing.clone(), present]).unwrap();
        assert_eq!(config.lexicon_path, PathBuf::from("/tmp/custom.txt"));

        let config = RedflagConfig::load_first_existing(&[missing]).unwrap();
        assert_eq!(config.lexicon_path, PathBuf::from(DEFAULT_LEXICON_PATH));
    }

    #[test]
    fn test_logging_config_verbose_wins() {
        let mut config = RedflagConfig::new();
        config.logging.level = Some("error".to_string());
        assert_eq!(config.logging_config(true).filter_directive(), "debug");
        assert_eq!(config.logging_config(false).filter_directive(), "error");
    }

    #[test]
    fn test_lexicon_store_uses_configured_path() {
        let config = RedflagConfig::new().with_lexicon_path("custom.txt");
        let store = config.lexicon_store();
        assert_eq!(store.path(), Path::new("custom.txt"));
        assert_eq!(store.codec().max_term_bytes(), DEFAULT_MAX_TERM_BYTES);
    }
}
