//! Collaborator wiring from the bootstrap configuration
//!
//! Turns a validated [`PodflowConfig`] into pipeline settings and concrete
//! backends. API keys are resolved here: environment first, then TOML.

use crate::backends::{
    FileRosterSource, GeminiClient, LocalDocumentStore, RosterSource, SheetsRosterSource,
};
use crate::models::RosterLayout;
use crate::services::PipelineSettings;
use crate::IngestResult;
use podflow_common::config::{
    resolve_secret, RosterSourceKind, GEMINI_KEY_ENV_VARS, SHEETS_KEY_ENV_VARS,
};
use podflow_common::{Error, PodflowConfig, Result};
use std::time::Duration;

/// Gemini API key, required for a real run
pub fn resolve_gemini_api_key(config: &PodflowConfig) -> Result<String> {
    resolve_secret(
        "gemini_api_key",
        GEMINI_KEY_ENV_VARS,
        config.generation.api_key.as_deref(),
    )
    .ok_or_else(|| {
        Error::Config(format!(
            "Gemini API key not configured. Set one of:\n\
             - Environment: {}\n\
             - TOML: [generation] api_key = \"...\"",
            GEMINI_KEY_ENV_VARS.join(" or ")
        ))
    })
}

/// Optional Sheets API key (public sheets can be read without one)
pub fn resolve_sheets_api_key(config: &PodflowConfig) -> Option<String> {
    resolve_secret("sheets_api_key", SHEETS_KEY_ENV_VARS, config.roster.api_key.as_deref())
}

pub fn roster_layout(config: &PodflowConfig) -> RosterLayout {
    RosterLayout::from_one_based(
        config.roster.episode_column,
        config.roster.guest_column,
        config.roster.header_rows,
    )
}

/// Settings handed to the orchestrator
pub fn pipeline_settings(config: &PodflowConfig) -> Result<PipelineSettings> {
    let drop_folder = config
        .drop_folder
        .as_ref()
        .ok_or_else(|| Error::Config("drop_folder is not configured".to_string()))?;

    Ok(PipelineSettings {
        drop_folder_id: drop_folder.to_string_lossy().to_string(),
        output_folder_id: config
            .output_folder
            .as_ref()
            .map(|p| p.to_string_lossy().to_string()),
        show_name: config.show_name.clone(),
        conventions: config.files.clone(),
        max_transcript_chars: config.generation.max_transcript_chars,
    })
}

/// Configured roster source plus the identifier to pass to it
pub fn roster_source(config: &PodflowConfig) -> IngestResult<(Box<dyn RosterSource>, String)> {
    match config.roster.source {
        RosterSourceKind::Sheets => {
            let sheet_id = config
                .roster
                .sheet_id
                .clone()
                .ok_or_else(|| Error::Config("roster.sheet_id is not configured".to_string()))?;
            let source = SheetsRosterSource::new(
                config.roster.sheets_endpoint.clone(),
                resolve_sheets_api_key(config),
            )?;
            Ok((Box::new(source), sheet_id))
        }
        RosterSourceKind::File => {
            let path = config
                .roster
                .file
                .as_ref()
                .ok_or_else(|| Error::Config("roster.file is not configured".to_string()))?;
            Ok((Box::new(FileRosterSource::new()), path.to_string_lossy().to_string()))
        }
    }
}

pub fn gemini_client(config: &PodflowConfig, api_key: String) -> IngestResult<GeminiClient> {
    let client = GeminiClient::new(
        config.generation.endpoint.clone(),
        config.generation.model.clone(),
        api_key,
        Duration::from_secs(config.generation.timeout_secs),
    )?
    .with_retry_attempts(config.generation.retry_attempts);
    Ok(client)
}

pub fn document_store(config: &PodflowConfig) -> LocalDocumentStore {
    match &config.documents.staging_folder {
        Some(folder) => LocalDocumentStore::new(folder),
        None => LocalDocumentStore::in_temp_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::path::PathBuf;

    fn clear_key_env() {
        for var in GEMINI_KEY_ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_gemini_key_from_toml() {
        clear_key_env();
        let mut config = PodflowConfig::default();
        config.generation.api_key = Some("toml-key".to_string());

        assert_eq!(resolve_gemini_api_key(&config).unwrap(), "toml-key");
    }

    #[test]
    #[serial]
    fn test_gemini_key_env_wins() {
        clear_key_env();
        std::env::set_var("GEMINI_API_KEY", "env-key");
        let mut config = PodflowConfig::default();
        config.generation.api_key = Some("toml-key".to_string());

        assert_eq!(resolve_gemini_api_key(&config).unwrap(), "env-key");
        clear_key_env();
    }

    #[test]
    #[serial]
    fn test_missing_gemini_key_is_config_error() {
        clear_key_env();
        let config = PodflowConfig::default();
        assert!(matches!(resolve_gemini_api_key(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_pipeline_settings() {
        let mut config = PodflowConfig::default();
        config.drop_folder = Some(PathBuf::from("/shows/drop"));

        let settings = pipeline_settings(&config).unwrap();
        assert_eq!(settings.drop_folder_id, "/shows/drop");
        assert!(settings.output_folder_id.is_none());
        assert_eq!(settings.show_name, "Crazy Wisdom");
        assert_eq!(settings.max_transcript_chars, 30_000);
    }

    #[test]
    fn test_roster_layout_is_zero_based() {
        let mut config = PodflowConfig::default();
        config.roster.guest_column = 3;
        let layout = roster_layout(&config);
        assert_eq!(layout.episode_column, 0);
        assert_eq!(layout.guest_column, 2);
    }

    #[test]
    fn test_file_roster_source_uses_path_as_id() {
        let mut config = PodflowConfig::default();
        config.roster.source = RosterSourceKind::File;
        config.roster.file = Some(PathBuf::from("/data/roster.json"));

        let (_, id) = roster_source(&config).unwrap();
        assert_eq!(id, "/data/roster.json");
    }
}
