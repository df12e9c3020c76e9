//! Bootstrap configuration loading and secret resolution
//!
//! Configuration is read once at startup from a TOML file and is immutable
//! for the rest of the run. The file location is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `PODFLOW_CONFIG` environment variable
//! 3. `<platform config dir>/podflow/podflow.toml`
//!
//! Secrets (API keys) are resolved separately: environment variables win over
//! the TOML value so keys do not have to live in the file.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "PODFLOW_CONFIG";

/// Environment variables checked (in order) for the Gemini API key
pub const GEMINI_KEY_ENV_VARS: &[&str] = &["PODFLOW_GEMINI_API_KEY", "GEMINI_API_KEY"];

/// Environment variables checked (in order) for the Google Sheets API key
pub const SHEETS_KEY_ENV_VARS: &[&str] = &["PODFLOW_SHEETS_API_KEY"];

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodflowConfig {
    /// Folder where raw episode files are dropped
    #[serde(default)]
    pub drop_folder: Option<PathBuf>,

    /// Folder receiving the `Ep<n>_<guest>` episode folders.
    /// Defaults to the parent of the drop folder.
    #[serde(default)]
    pub output_folder: Option<PathBuf>,

    /// Show name used in prompts and document headings
    #[serde(default = "default_show_name")]
    pub show_name: String,

    #[serde(default)]
    pub roster: RosterConfig,

    #[serde(default)]
    pub files: FileConventions,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub documents: DocumentsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Defaults,
}

/// Where the episode roster is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RosterSourceKind {
    /// Google Sheets v4 values API
    #[default]
    Sheets,
    /// Local JSON export with the same `values` layout as the Sheets API
    File,
}

/// Roster (episode list) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub source: RosterSourceKind,

    /// Spreadsheet identifier (required for `sheets`)
    #[serde(default)]
    pub sheet_id: Option<String>,

    /// Tab name inside the spreadsheet
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// Roster export path (required for `file`)
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Episode number column, 1-based (column A = 1)
    #[serde(default = "default_episode_column")]
    pub episode_column: usize,

    /// Guest name column, 1-based
    #[serde(default = "default_guest_column")]
    pub guest_column: usize,

    /// Leading rows skipped as headers
    #[serde(default = "default_header_rows")]
    pub header_rows: usize,

    /// Sheets API base URL
    #[serde(default = "default_sheets_endpoint")]
    pub sheets_endpoint: String,

    /// Sheets API key (env `PODFLOW_SHEETS_API_KEY` takes precedence)
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Naming conventions applied to dropped files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConventions {
    /// Name prefix marking an object as already processed
    #[serde(default = "default_processed_prefix")]
    pub processed_prefix: String,

    /// Mime type that starts episode processing
    #[serde(default = "default_video_mime_type")]
    pub video_mime_type: String,

    /// Extension of primary media files, without the dot
    #[serde(default = "default_media_extension")]
    pub media_extension: String,

    /// Suffix appended to the canonical name for the moved transcript
    #[serde(default = "default_transcript_suffix")]
    pub transcript_suffix: String,

    /// Suffix appended to the canonical name for the show-notes document
    #[serde(default = "default_document_suffix")]
    pub document_suffix: String,
}

/// Text-generation (Gemini) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// API key (env `PODFLOW_GEMINI_API_KEY` / `GEMINI_API_KEY` take precedence)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    /// Transcript characters embedded in the prompt
    #[serde(default = "default_max_transcript_chars")]
    pub max_transcript_chars: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts for transient failures (0 = single attempt)
    #[serde(default)]
    pub retry_attempts: u32,
}

/// Generated document configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DocumentsConfig {
    /// Folder where documents are created before being moved next to the media.
    /// Defaults to `<tmp>/podflow-documents`.
    #[serde(default)]
    pub staging_folder: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_show_name() -> String {
    "Crazy Wisdom".to_string()
}

fn default_sheet_name() -> String {
    "Episodes".to_string()
}

fn default_episode_column() -> usize {
    1
}

fn default_guest_column() -> usize {
    2
}

fn default_header_rows() -> usize {
    1
}

fn default_sheets_endpoint() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_processed_prefix() -> String {
    "Ep".to_string()
}

fn default_video_mime_type() -> String {
    "video/mp4".to_string()
}

fn default_media_extension() -> String {
    "mp4".to_string()
}

fn default_transcript_suffix() -> String {
    "_Transcript.txt".to_string()
}

fn default_document_suffix() -> String {
    "_ShowNotes".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_generation_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_max_transcript_chars() -> usize {
    30_000
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for PodflowConfig {
    fn default() -> Self {
        Self {
            drop_folder: None,
            output_folder: None,
            show_name: default_show_name(),
            roster: RosterConfig::default(),
            files: FileConventions::default(),
            generation: GenerationConfig::default(),
            documents: DocumentsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            source: RosterSourceKind::default(),
            sheet_id: None,
            sheet_name: default_sheet_name(),
            file: None,
            episode_column: default_episode_column(),
            guest_column: default_guest_column(),
            header_rows: default_header_rows(),
            sheets_endpoint: default_sheets_endpoint(),
            api_key: None,
        }
    }
}

impl Default for FileConventions {
    fn default() -> Self {
        Self {
            processed_prefix: default_processed_prefix(),
            video_mime_type: default_video_mime_type(),
            media_extension: default_media_extension(),
            transcript_suffix: default_transcript_suffix(),
            document_suffix: default_document_suffix(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_generation_endpoint(),
            max_transcript_chars: default_max_transcript_chars(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl PodflowConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Load from the resolved config path, or fall back to built-in defaults
    /// when no file exists anywhere.
    pub fn load_or_default(cli_path: Option<&Path>) -> Result<(Self, ConfigOrigin)> {
        match resolve_config_path(cli_path) {
            Some(path) => {
                let config = Self::load(&path)?;
                Ok((config, ConfigOrigin::File(path)))
            }
            None => Ok((Self::default(), ConfigOrigin::Defaults)),
        }
    }

    /// Startup validation. Any error here aborts the run before a single
    /// dropped object is touched.
    pub fn validate(&self) -> Result<()> {
        let drop_folder = self
            .drop_folder
            .as_ref()
            .ok_or_else(|| Error::Config("drop_folder is not configured".to_string()))?;

        if !drop_folder.is_dir() {
            return Err(Error::Config(format!(
                "drop_folder does not exist or is not a directory: {}",
                drop_folder.display()
            )));
        }

        match self.roster.source {
            RosterSourceKind::Sheets => {
                if !self.roster.sheet_id.as_deref().is_some_and(is_valid_key) {
                    return Err(Error::Config(
                        "roster.sheet_id is required for the sheets roster source".to_string(),
                    ));
                }
            }
            RosterSourceKind::File => {
                if self.roster.file.is_none() {
                    return Err(Error::Config(
                        "roster.file is required for the file roster source".to_string(),
                    ));
                }
            }
        }

        if self.roster.episode_column == 0 || self.roster.guest_column == 0 {
            return Err(Error::Config(
                "roster column indices are 1-based and must be at least 1".to_string(),
            ));
        }

        if self.files.processed_prefix.is_empty() {
            return Err(Error::Config(
                "files.processed_prefix must not be empty".to_string(),
            ));
        }

        if self.generation.max_transcript_chars == 0 {
            return Err(Error::Config(
                "generation.max_transcript_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Resolve the configuration file path
///
/// **Priority:** CLI → ENV → platform config dir. Returns `None` when no
/// candidate exists.
pub fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|path| path.exists())
}

/// Platform configuration file location (`~/.config/podflow/podflow.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("podflow").join("podflow.toml"))
}

/// Resolve a secret from environment variables first, then the TOML value
///
/// Warns when the secret is configured in more than one place.
pub fn resolve_secret(name: &str, env_vars: &[&str], toml_value: Option<&str>) -> Option<String> {
    let env_value = env_vars
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| is_valid_key(v)).map(|v| (*var, v)));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            secret = name,
            "Secret found in both environment and TOML. Using environment (highest priority)."
        );
    }

    if let Some((var, value)) = env_value {
        info!(secret = name, source = var, "Secret loaded from environment variable");
        return Some(value.trim().to_string());
    }

    toml_value.map(|value| {
        info!(secret = name, "Secret loaded from TOML config");
        value.trim().to_string()
    })
}

/// Validate a key or identifier (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_layout() {
        let config = PodflowConfig::default();
        assert_eq!(config.roster.sheet_name, "Episodes");
        assert_eq!(config.roster.episode_column, 1);
        assert_eq!(config.roster.guest_column, 2);
        assert_eq!(config.roster.header_rows, 1);
        assert_eq!(config.files.processed_prefix, "Ep");
        assert_eq!(config.files.video_mime_type, "video/mp4");
        assert_eq!(config.generation.model, "gemini-1.5-flash");
        assert_eq!(config.generation.max_transcript_chars, 30_000);
        assert_eq!(config.generation.retry_attempts, 0);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = PodflowConfig::from_toml_str(
            r#"
            drop_folder = "/srv/drop"

            [roster]
            sheet_id = "abc"
            guest_column = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.drop_folder, Some(PathBuf::from("/srv/drop")));
        assert_eq!(config.roster.sheet_id.as_deref(), Some("abc"));
        assert_eq!(config.roster.guest_column, 3);
        assert_eq!(config.roster.episode_column, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = PodflowConfig::from_toml_str("drop_folder = [");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }
}
