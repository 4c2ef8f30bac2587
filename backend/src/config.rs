//! Configuration management for the lot capture service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides such as `LOTCAP__CATALOG__SPREADSHEET_URL`

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{ExportMode, FlowOptions};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Catalog source configuration
    pub catalog: CatalogConfig,

    /// Capture form behaviour
    pub flow: FlowConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Where the catalog comes from
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// One hosted spreadsheet export with a named sheet
    Spreadsheet,
    /// JSON inventory API joined with the molecule master spreadsheet
    InventoryApi,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Spreadsheet => write!(f, "spreadsheet"),
            SourceKind::InventoryApi => write!(f, "inventory_api"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CatalogConfig {
    pub source: SourceKind,

    /// Spreadsheet export URL (`spreadsheet` source)
    pub spreadsheet_url: Option<String>,

    /// Sheet to read from the spreadsheet export
    pub sheet_name: String,

    /// Inventory API URL (`inventory_api` source)
    pub inventory_api_url: Option<String>,

    /// Molecule master spreadsheet URL (`inventory_api` source)
    pub molecule_master_url: Option<String>,

    /// Sheet of the molecule master; the first sheet when unset
    pub molecule_master_sheet: Option<String>,

    /// Timeout for each remote request, in seconds
    pub timeout_secs: u64,

    /// Skip TLS certificate verification for the catalog sources.
    /// Only for hosts with self-signed certificates on a trusted network.
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FlowConfig {
    pub auto_fill_from_scan: bool,
    pub quantity_required: bool,
    pub export_mode: ExportMode,

    /// Sheet name of exported workbooks
    pub sheet_name: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("LOTCAP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("catalog.source", "spreadsheet")?
            .set_default("catalog.sheet_name", "TP's GHG")?
            .set_default("catalog.timeout_secs", 30)?
            .set_default("catalog.accept_invalid_certs", false)?
            .set_default("flow.auto_fill_from_scan", false)?
            .set_default("flow.quantity_required", false)?
            .set_default("flow.export_mode", "batch")?
            .set_default("flow.sheet_name", "Consulta")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (LOTCAP__SECTION__KEY)
            .add_source(
                Environment::with_prefix("LOTCAP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.catalog.validate()?;
        Ok(config)
    }
}

impl CatalogConfig {
    /// Check that the selected source has every URL it needs
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = match self.source {
            SourceKind::Spreadsheet => vec![("catalog.spreadsheet_url", &self.spreadsheet_url)],
            SourceKind::InventoryApi => vec![
                ("catalog.inventory_api_url", &self.inventory_api_url),
                ("catalog.molecule_master_url", &self.molecule_master_url),
            ],
        };
        for (key, value) in required {
            if value.as_deref().map(str::trim).unwrap_or_default().is_empty() {
                return Err(ConfigError::Message(format!(
                    "{} is required for the {} catalog source",
                    key, self.source
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "catalog.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Identity of the remote data; a cached catalog is reused while it matches
    pub fn cache_key(&self) -> String {
        match self.source {
            SourceKind::Spreadsheet => format!(
                "{}|{}|{}",
                self.source,
                self.spreadsheet_url.as_deref().unwrap_or_default(),
                self.sheet_name
            ),
            SourceKind::InventoryApi => format!(
                "{}|{}|{}|{}",
                self.source,
                self.inventory_api_url.as_deref().unwrap_or_default(),
                self.molecule_master_url.as_deref().unwrap_or_default(),
                self.molecule_master_sheet.as_deref().unwrap_or_default()
            ),
        }
    }

    /// Spreadsheet source with default settings
    pub fn spreadsheet(url: impl Into<String>, sheet_name: impl Into<String>) -> Self {
        Self {
            source: SourceKind::Spreadsheet,
            spreadsheet_url: Some(url.into()),
            sheet_name: sheet_name.into(),
            inventory_api_url: None,
            molecule_master_url: None,
            molecule_master_sheet: None,
            timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }

    /// Inventory API source with default settings
    pub fn inventory_api(api_url: impl Into<String>, master_url: impl Into<String>) -> Self {
        Self {
            source: SourceKind::InventoryApi,
            spreadsheet_url: None,
            sheet_name: String::new(),
            inventory_api_url: Some(api_url.into()),
            molecule_master_url: Some(master_url.into()),
            molecule_master_sheet: None,
            timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

impl FlowConfig {
    pub fn options(&self) -> FlowOptions {
        FlowOptions {
            auto_fill_from_scan: self.auto_fill_from_scan,
            quantity_required: self.quantity_required,
            export_mode: self.export_mode,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            auto_fill_from_scan: false,
            quantity_required: false,
            export_mode: ExportMode::Batch,
            sheet_name: "Consulta".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_source_requires_url() {
        let mut catalog = CatalogConfig::spreadsheet("https://example.test/export", "TP's GHG");
        assert!(catalog.validate().is_ok());
        catalog.spreadsheet_url = Some("  ".into());
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_inventory_source_requires_both_urls() {
        let mut catalog =
            CatalogConfig::inventory_api("https://api.test/inventario", "https://docs.test/master");
        assert!(catalog.validate().is_ok());
        catalog.molecule_master_url = None;
        let err = catalog.validate().unwrap_err().to_string();
        assert!(err.contains("catalog.molecule_master_url"));
    }

    #[test]
    fn test_cache_key_tracks_source_identity() {
        let a = CatalogConfig::spreadsheet("https://example.test/a", "Hoja1");
        let mut b = a.clone();
        assert_eq!(a.cache_key(), b.cache_key());
        b.sheet_name = "Hoja2".into();
        assert_ne!(a.cache_key(), b.cache_key());
        b.sheet_name = "Hoja1".into();
        b.timeout_secs = 5;
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_environment_overrides_use_double_underscore() {
        std::env::set_var(
            "LOTCAP__CATALOG__SPREADSHEET_URL",
            "https://example.test/export",
        );
        std::env::set_var("LOTCAP__FLOW__EXPORT_MODE", "single");
        let loaded = Config::load();
        std::env::remove_var("LOTCAP__CATALOG__SPREADSHEET_URL");
        std::env::remove_var("LOTCAP__FLOW__EXPORT_MODE");

        let config = loaded.unwrap();
        assert_eq!(
            config.catalog.spreadsheet_url.as_deref(),
            Some("https://example.test/export")
        );
        assert_eq!(config.flow.export_mode, ExportMode::Single);
        assert_eq!(config.catalog.sheet_name, "TP's GHG");
    }
}
