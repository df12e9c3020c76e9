//! Roster sources
//!
//! - [`SheetsRosterSource`] reads a tab through the Google Sheets v4
//!   `spreadsheets.values.get` endpoint.
//! - [`FileRosterSource`] reads a local JSON export with the same
//!   `ValueRange` shape; the "sheet id" is the file path.
//!
//! Both render cells as strings: numbers keep their integer form (`62`, not
//! `62.0`) so they can be used verbatim in folder names.

use super::{RosterError, RosterSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("podflow/", env!("CARGO_PKG_VERSION"));

/// Sheets API `ValueRange` (also the local export format)
#[derive(Debug, Clone, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect()
    }
}

/// Render one cell as display text
pub fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    f.to_string()
                }
            } else {
                n.to_string()
            }
        }
        other => other.to_string(),
    }
}

/// Google Sheets roster client
pub struct SheetsRosterSource {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SheetsRosterSource {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self, RosterError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RosterError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// `<endpoint>/spreadsheets/<id>/values/<sheet>` with path segments escaped
    fn values_url(&self, sheet_id: &str, sheet_name: &str) -> Result<reqwest::Url, RosterError> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| RosterError::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))?;

        url.path_segments_mut()
            .map_err(|_| RosterError::InvalidEndpoint(self.endpoint.clone()))?
            .pop_if_empty()
            .extend(["spreadsheets", sheet_id, "values", sheet_name]);

        url.query_pairs_mut().append_pair("majorDimension", "ROWS");
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }

        Ok(url)
    }
}

#[async_trait]
impl RosterSource for SheetsRosterSource {
    async fn read_all_rows(&self, sheet_id: &str, sheet_name: &str) -> Result<Vec<Vec<String>>, RosterError> {
        let url = self.values_url(sheet_id, sheet_name)?;

        tracing::debug!(sheet_id = %sheet_id, sheet = %sheet_name, "Querying Sheets API");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| RosterError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RosterError::ApiError(status.as_u16(), error_text));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| RosterError::ParseError(e.to_string()))?;

        let rows = range.into_rows();
        tracing::info!(sheet = %sheet_name, rows = rows.len(), "Roster rows retrieved from Sheets");

        Ok(rows)
    }
}

/// Local JSON roster export
#[derive(Debug, Default)]
pub struct FileRosterSource;

impl FileRosterSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RosterSource for FileRosterSource {
    async fn read_all_rows(&self, sheet_id: &str, sheet_name: &str) -> Result<Vec<Vec<String>>, RosterError> {
        let content = tokio::fs::read_to_string(sheet_id)
            .await
            .map_err(|e| RosterError::FileError {
                path: sheet_id.to_string(),
                message: e.to_string(),
            })?;

        let range: ValueRange =
            serde_json::from_str(&content).map_err(|e| RosterError::ParseError(e.to_string()))?;

        if let Some(exported) = range.range.as_deref() {
            let exported_sheet = exported.split('!').next().unwrap_or(exported).trim_matches('\'');
            if exported_sheet != sheet_name {
                tracing::warn!(
                    file = %sheet_id,
                    exported_sheet = %exported_sheet,
                    configured_sheet = %sheet_name,
                    "Roster export was taken from a different sheet"
                );
            }
        }

        let rows = range.into_rows();
        tracing::info!(file = %sheet_id, rows = rows.len(), "Roster rows loaded from file");

        Ok(rows)
    }
}
