//! Catalog loader tests
//!
//! Loads the catalog from a local server standing in for the spreadsheet
//! export, the inventory API and the molecule master.

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{SourceServer, CATALOG_SHEET, SLOW_RESPONSE};
use lot_capture_backend::config::CatalogConfig;
use lot_capture_backend::services::{load_catalog, CatalogCache, CatalogService};
use lot_capture_backend::AppError;
use shared::{search, Field};

#[tokio::test]
async fn test_spreadsheet_source_loads_normalized_catalog() {
    let server = SourceServer::start().await;
    let catalog = load_catalog(&server.spreadsheet_config()).await.unwrap();

    assert_eq!(catalog.len(), 3);
    for field in Field::CATALOG_FIELDS {
        assert!(catalog.schema().contains(field), "missing {}", field);
    }

    let first = &catalog.rows()[0];
    assert_eq!(first.codart.as_deref(), Some("A100"));
    assert_eq!(first.nomart.as_deref(), Some("Ibuprofeno 400"));
    assert_eq!(
        shared::normalize_expiry(&first.fechavencelote).as_deref(),
        Some("31/05/2026")
    );
    assert_eq!(server.hits.catalog(), 1);
}

#[tokio::test]
async fn test_missing_sheet_is_parse_error() {
    let server = SourceServer::start().await;
    let config = CatalogConfig::spreadsheet(server.url("/catalog.xlsx"), "Hoja1");
    assert!(matches!(load_catalog(&config).await, Err(AppError::Parse(_))));
}

#[tokio::test]
async fn test_unreachable_source_is_fetch_error() {
    let server = SourceServer::start().await;
    let config = CatalogConfig::spreadsheet(server.url("/missing"), CATALOG_SHEET);
    assert!(matches!(load_catalog(&config).await, Err(AppError::Fetch(_))));
}

#[tokio::test]
async fn test_inventory_source_joins_barcodes() {
    let server = SourceServer::start().await;
    let catalog = load_catalog(&server.inventory_config()).await.unwrap();

    // Duplicate master rows never multiply inventory rows
    assert_eq!(catalog.len(), 3);
    assert!(catalog.schema().contains(Field::CodBarras));

    let a100 = search(&catalog, "A100");
    assert_eq!(a100.len(), 2);
    assert!(a100
        .iter()
        .all(|row| row.cod_barras.as_deref() == Some("7790001")));

    let c300 = search(&catalog, "C300");
    assert_eq!(c300.len(), 1);
    assert_eq!(c300[0].cod_barras, None);

    assert_eq!(server.hits.inventory(), 1);
    assert_eq!(server.hits.master(), 1);
}

#[tokio::test]
async fn test_inventory_master_failure_aborts_load() {
    let server = SourceServer::start().await;
    let config = CatalogConfig::inventory_api(server.url("/inventario"), server.url("/missing"));
    assert!(matches!(load_catalog(&config).await, Err(AppError::Fetch(_))));
}

#[tokio::test]
async fn test_inventory_invalid_json_is_parse_error() {
    let server = SourceServer::start().await;
    let config =
        CatalogConfig::inventory_api(server.url("/broken-json"), server.url("/master.xlsx"));
    assert!(matches!(load_catalog(&config).await, Err(AppError::Parse(_))));
}

#[tokio::test]
async fn test_cache_loads_once_until_refreshed() {
    let server = SourceServer::start().await;
    let service = CatalogService::new(server.spreadsheet_config()).unwrap();
    let cache = CatalogCache::new();

    assert!(!cache.status(&service).await.loaded);

    let first = cache.get_or_load(&service).await.unwrap();
    let second = cache.get_or_load(&service).await.unwrap();
    assert_eq!(first.len(), second.len());
    assert_eq!(server.hits.catalog(), 1);

    let status = cache.status(&service).await;
    assert!(status.loaded);
    assert_eq!(status.rows, 3);

    cache.refresh(&service).await.unwrap();
    assert_eq!(server.hits.catalog(), 2);
}

#[tokio::test]
async fn test_cache_keeps_nothing_after_failed_load() {
    let server = SourceServer::start().await;
    let service = CatalogService::new(CatalogConfig::spreadsheet(
        server.url("/missing"),
        CATALOG_SHEET,
    ))
    .unwrap();
    let cache = CatalogCache::new();

    assert!(cache.get_or_load(&service).await.is_err());
    assert!(!cache.status(&service).await.loaded);
}

#[tokio::test]
async fn test_cache_reloads_for_a_different_source() {
    let server = SourceServer::start().await;
    let cache = CatalogCache::new();

    let spreadsheet = CatalogService::new(server.spreadsheet_config()).unwrap();
    let inventory = CatalogService::new(server.inventory_config()).unwrap();

    cache.get_or_load(&spreadsheet).await.unwrap();
    let joined = cache.get_or_load(&inventory).await.unwrap();
    assert_eq!(search(&joined, "C300").len(), 1);
    assert_eq!(server.hits.catalog(), 1);
    assert_eq!(server.hits.inventory(), 1);
}

#[tokio::test]
async fn test_slow_source_hits_request_timeout() {
    let server = SourceServer::start().await;
    let mut config = CatalogConfig::spreadsheet(server.url("/slow.xlsx"), CATALOG_SHEET);
    config.timeout_secs = 1;

    let started = Instant::now();
    let result = load_catalog(&config).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(AppError::Fetch(_))));
    assert!(elapsed < SLOW_RESPONSE / 2, "gave up after {:?}", elapsed);
}

#[tokio::test]
async fn test_status_does_not_wait_for_a_load() {
    let server = SourceServer::start().await;
    let service = CatalogService::new(CatalogConfig::spreadsheet(
        server.url("/slow.xlsx"),
        CATALOG_SHEET,
    ))
    .unwrap();
    let cache = Arc::new(CatalogCache::new());

    let loading = {
        let cache = cache.clone();
        let service = service.clone();
        tokio::spawn(async move { cache.get_or_load(&service).await.map(|_| ()) })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let status = tokio::time::timeout(Duration::from_secs(1), cache.status(&service))
        .await
        .expect("status blocked behind the catalog load");
    assert!(!status.loaded);
    loading.abort();
}

#[tokio::test]
async fn test_refresh_after_failed_load_recovers() {
    let server = SourceServer::start().await;
    let service = CatalogService::new(CatalogConfig::spreadsheet(
        server.url("/flaky.xlsx"),
        CATALOG_SHEET,
    ))
    .unwrap();
    let cache = CatalogCache::new();

    assert!(matches!(cache.get_or_load(&service).await, Err(AppError::Fetch(_))));
    assert_eq!(cache.refresh(&service).await.unwrap().len(), 3);
    assert_eq!(server.hits.flaky(), 2);
}
