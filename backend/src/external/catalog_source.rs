//! HTTP client for the remote catalog sources
//!
//! Fetches spreadsheet exports (parsed with calamine) and the JSON inventory
//! API. Every request carries the configured timeout; failures are reported
//! once and never retried here.

use std::time::Duration;

use reqwest::Client;
use shared::Table;

use crate::config::CatalogConfig;
use crate::error::{AppError, AppResult};
use crate::external::workbook::read_table;

/// Catalog source client
#[derive(Clone)]
pub struct CatalogSourceClient {
    client: Client,
}

impl CatalogSourceClient {
    /// Create a client with a request timeout.
    ///
    /// Certificates are verified unless `accept_invalid_certs` is set.
    pub fn new(timeout: Duration, accept_invalid_certs: bool) -> AppResult<Self> {
        if accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled for catalog sources");
        }
        let client = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &CatalogConfig) -> AppResult<Self> {
        Self::new(
            Duration::from_secs(config.timeout_secs),
            config.accept_invalid_certs,
        )
    }

    async fn get(&self, url: &str) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Fetch(format!("{} returned {}", url, status)));
        }
        Ok(response)
    }

    /// Download a spreadsheet export and read one sheet of it
    pub async fn fetch_spreadsheet(&self, url: &str, sheet: Option<&str>) -> AppResult<Table> {
        tracing::debug!(url, sheet, "Fetching spreadsheet");
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| AppError::Fetch(format!("reading body of {} failed: {}", url, e)))?;
        Ok(read_table(&bytes, sheet)?)
    }

    /// Download a JSON array of objects as a table
    pub async fn fetch_json_table(&self, url: &str) -> AppResult<Table> {
        tracing::debug!(url, "Fetching inventory JSON");
        let body = self
            .get(url)
            .await?
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("reading body of {} failed: {}", url, e)))?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| AppError::Parse(format!("invalid JSON from {}: {}", url, e)))?;
        Ok(Table::from_json_records(&value)?)
    }
}
