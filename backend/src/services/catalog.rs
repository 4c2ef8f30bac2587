//! Catalog loading and process-wide caching
//!
//! The loader turns one of the two configured source kinds into a
//! normalized [`Catalog`]. The cache keeps the last successful load per
//! source identity until it is invalidated by hand.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{Catalog, Field};
use tokio::sync::{Mutex, RwLock};

use crate::config::{CatalogConfig, SourceKind};
use crate::error::{AppError, AppResult};
use crate::external::CatalogSourceClient;

/// Loads the catalog from its configured remote source
#[derive(Clone)]
pub struct CatalogService {
    client: CatalogSourceClient,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(config: CatalogConfig) -> AppResult<Self> {
        let client = CatalogSourceClient::from_config(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Fetch, normalize and (for the inventory API) join the catalog.
    ///
    /// Any failure aborts the whole load; no partial catalog is returned.
    pub async fn load_catalog(&self) -> AppResult<Catalog> {
        let catalog = match self.config.source {
            SourceKind::Spreadsheet => self.load_spreadsheet().await,
            SourceKind::InventoryApi => self.load_inventory().await,
        };

        match &catalog {
            Ok(catalog) => tracing::info!(
                source = %self.config.source,
                rows = catalog.len(),
                "Catalog loaded"
            ),
            Err(e) => tracing::error!(source = %self.config.source, "Catalog load failed: {}", e),
        }
        catalog
    }

    async fn load_spreadsheet(&self) -> AppResult<Catalog> {
        let url = required_url(&self.config.spreadsheet_url, "catalog.spreadsheet_url")?;
        let mut table = self
            .client
            .fetch_spreadsheet(url, Some(&self.config.sheet_name))
            .await?;
        table.normalize_columns();
        Ok(Catalog::from_table(&table)?)
    }

    async fn load_inventory(&self) -> AppResult<Catalog> {
        let api_url = required_url(&self.config.inventory_api_url, "catalog.inventory_api_url")?;
        let master_url =
            required_url(&self.config.molecule_master_url, "catalog.molecule_master_url")?;

        let mut inventory = self.client.fetch_json_table(api_url).await?;
        inventory.normalize_columns();
        inventory.rename_column_ci("codArt", Field::Codart.name());
        inventory.adopt_canonical(Field::Codart);

        let mut master = self
            .client
            .fetch_spreadsheet(master_url, self.config.molecule_master_sheet.as_deref())
            .await?;
        master.normalize_columns();
        master.adopt_canonical(Field::Codart);
        master.adopt_canonical(Field::CodBarras);

        inventory.left_join(&master, Field::Codart.name(), &[Field::CodBarras.name()])?;
        tracing::debug!(
            inventory_rows = inventory.rows.len(),
            master_rows = master.rows.len(),
            "Joined molecule master onto inventory"
        );
        Ok(Catalog::from_table(&inventory)?)
    }
}

fn required_url<'a>(value: &'a Option<String>, key: &str) -> AppResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Configuration(format!("{} is not set", key)))
}

/// Load a catalog straight from configuration, without caching
pub async fn load_catalog(config: &CatalogConfig) -> AppResult<Catalog> {
    CatalogService::new(config.clone())?.load_catalog().await
}

struct CachedCatalog {
    key: String,
    catalog: Arc<Catalog>,
    loaded_at: DateTime<Utc>,
}

/// Summary of the cached catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStatus {
    pub loaded: bool,
    pub source: String,
    pub rows: usize,
    pub columns: Vec<Field>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Process-wide catalog cache keyed by source identity.
///
/// Loads are serialized by `loading`; the cached entry is only write-locked
/// to swap in a finished load, so status readers never wait on a fetch.
#[derive(Default)]
pub struct CatalogCache {
    inner: RwLock<Option<CachedCatalog>>,
    loading: Mutex<()>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    async fn cached(&self, key: &str) -> Option<Arc<Catalog>> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|c| c.key == key)
            .map(|c| c.catalog.clone())
    }

    async fn store(&self, service: &CatalogService) -> AppResult<Arc<Catalog>> {
        let catalog = Arc::new(service.load_catalog().await?);
        *self.inner.write().await = Some(CachedCatalog {
            key: service.config().cache_key(),
            catalog: catalog.clone(),
            loaded_at: Utc::now(),
        });
        Ok(catalog)
    }

    /// Cached catalog for the service's source, loading it on first use
    pub async fn get_or_load(&self, service: &CatalogService) -> AppResult<Arc<Catalog>> {
        let key = service.config().cache_key();
        if let Some(catalog) = self.cached(&key).await {
            return Ok(catalog);
        }

        let _loading = self.loading.lock().await;
        // Another request may have loaded it while we waited for the lock
        if let Some(catalog) = self.cached(&key).await {
            return Ok(catalog);
        }
        self.store(service).await
    }

    /// Fetch the catalog again and replace the cached one.
    ///
    /// The previous catalog keeps serving until the new load succeeds; a
    /// failed refresh leaves nothing cached.
    pub async fn refresh(&self, service: &CatalogService) -> AppResult<Arc<Catalog>> {
        let _loading = self.loading.lock().await;
        let loaded = self.store(service).await;
        if loaded.is_err() {
            self.invalidate().await;
        }
        loaded
    }

    pub async fn invalidate(&self) {
        let mut cached = self.inner.write().await;
        if cached.take().is_some() {
            tracing::info!("Catalog cache invalidated");
        }
    }

    pub async fn status(&self, service: &CatalogService) -> CatalogStatus {
        let key = service.config().cache_key();
        let cached = self.inner.read().await;
        match cached.as_ref().filter(|c| c.key == key) {
            Some(entry) => CatalogStatus {
                loaded: true,
                source: service.config().source.to_string(),
                rows: entry.catalog.len(),
                columns: entry.catalog.schema().fields().collect(),
                loaded_at: Some(entry.loaded_at),
            },
            None => CatalogStatus {
                loaded: false,
                source: service.config().source.to_string(),
                rows: 0,
                columns: Vec::new(),
                loaded_at: None,
            },
        }
    }
}
