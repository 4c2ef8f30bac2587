//! Helpers shared by the integration tests: workbook fixtures and a local
//! HTTP server standing in for the remote catalog sources.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use lot_capture_backend::config::{CatalogConfig, Config, FlowConfig, ServerConfig};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use serde_json::json;

pub const CATALOG_SHEET: &str = "TP's GHG";

/// Catalog workbook with two lots of A100 and one of B200
pub fn catalog_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(CATALOG_SHEET).unwrap();

    let headers = [
        "CodArt",
        " NomArt ",
        "NumLote",
        "Cod_Barras",
        "Presentacion",
        "FechaVenceLote",
    ];
    for (col, name) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }

    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let rows = [
        ("A100", "Ibuprofeno 400", "L1", "7790001", "Caja x 10", (2026, 5, 31)),
        ("A100", "Ibuprofeno 400", "L2", "7790001", "Caja x 10", (2027, 1, 15)),
        ("B200", "Amoxicilina 500", "L9", "7790002", "Frasco", (2025, 12, 1)),
    ];
    for (idx, (codart, nomart, lot, barcode, presentation, (y, m, d))) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, *codart).unwrap();
        sheet.write_string(row, 1, *nomart).unwrap();
        sheet.write_string(row, 2, *lot).unwrap();
        sheet.write_string(row, 3, *barcode).unwrap();
        sheet.write_string(row, 4, *presentation).unwrap();
        let date = ExcelDateTime::from_ymd(*y, *m, *d).unwrap();
        sheet
            .write_datetime_with_format(row, 5, &date, &date_format)
            .unwrap();
    }

    workbook.save_to_buffer().unwrap()
}

/// Molecule master: one barcode per article code, a duplicate row for A100
pub fn molecule_master_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "CODART").unwrap();
    sheet.write_string(0, 1, "Cod_Barras").unwrap();
    sheet.write_string(1, 0, "A100").unwrap();
    sheet.write_string(1, 1, "7790001").unwrap();
    sheet.write_string(2, 0, "A100").unwrap();
    sheet.write_string(2, 1, "9999999").unwrap();
    sheet.write_string(3, 0, "B200").unwrap();
    sheet.write_string(3, 1, "7790002").unwrap();
    workbook.save_to_buffer().unwrap()
}

pub fn inventory_json() -> serde_json::Value {
    json!([
        {"codArt": "A100", "nomArt": "Ibuprofeno 400", "numLote": "L1",
         "presentacion": "Caja x 10", "fechaVenceLote": "2026-05-31"},
        {"codArt": "A100", "nomArt": "Ibuprofeno 400", "numLote": "L2",
         "presentacion": "Caja x 10", "fechaVenceLote": "2027-01-15"},
        {"codArt": "C300", "nomArt": "Paracetamol", "numLote": "L5",
         "presentacion": "Blister", "fechaVenceLote": null}
    ])
}

/// Request counters of the fake source server
#[derive(Clone, Default)]
pub struct Hits {
    pub catalog: Arc<AtomicUsize>,
    pub inventory: Arc<AtomicUsize>,
    pub master: Arc<AtomicUsize>,
    pub flaky: Arc<AtomicUsize>,
}

impl Hits {
    pub fn catalog(&self) -> usize {
        self.catalog.load(Ordering::SeqCst)
    }

    pub fn inventory(&self) -> usize {
        self.inventory.load(Ordering::SeqCst)
    }

    pub fn master(&self) -> usize {
        self.master.load(Ordering::SeqCst)
    }

    pub fn flaky(&self) -> usize {
        self.flaky.load(Ordering::SeqCst)
    }
}

fn xlsx(bytes: Vec<u8>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        )],
        bytes,
    )
}

async fn serve_catalog(State(hits): State<Hits>) -> impl IntoResponse {
    hits.catalog.fetch_add(1, Ordering::SeqCst);
    xlsx(catalog_workbook())
}

async fn serve_master(State(hits): State<Hits>) -> impl IntoResponse {
    hits.master.fetch_add(1, Ordering::SeqCst);
    xlsx(molecule_master_workbook())
}

async fn serve_inventory(State(hits): State<Hits>) -> impl IntoResponse {
    hits.inventory.fetch_add(1, Ordering::SeqCst);
    axum::Json(inventory_json())
}

async fn serve_not_json() -> impl IntoResponse {
    "<html>maintenance</html>"
}

async fn serve_missing() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}

/// Fails the first request, then serves the catalog
async fn serve_flaky(State(hits): State<Hits>) -> axum::response::Response {
    if hits.flaky.fetch_add(1, Ordering::SeqCst) == 0 {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    xlsx(catalog_workbook()).into_response()
}

/// Answers long after any sane client timeout
async fn serve_slow() -> impl IntoResponse {
    tokio::time::sleep(SLOW_RESPONSE).await;
    xlsx(catalog_workbook())
}

pub const SLOW_RESPONSE: Duration = Duration::from_secs(10);

/// Fake remote sources bound to an ephemeral local port
pub struct SourceServer {
    pub addr: SocketAddr,
    pub hits: Hits,
}

impl SourceServer {
    pub async fn start() -> Self {
        let hits = Hits::default();
        let app = Router::new()
            .route("/catalog.xlsx", get(serve_catalog))
            .route("/master.xlsx", get(serve_master))
            .route("/inventario", get(serve_inventory))
            .route("/broken-json", get(serve_not_json))
            .route("/missing", get(serve_missing))
            .route("/flaky.xlsx", get(serve_flaky))
            .route("/slow.xlsx", get(serve_slow))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn spreadsheet_config(&self) -> CatalogConfig {
        CatalogConfig::spreadsheet(self.url("/catalog.xlsx"), CATALOG_SHEET)
    }

    pub fn inventory_config(&self) -> CatalogConfig {
        CatalogConfig::inventory_api(self.url("/inventario"), self.url("/master.xlsx"))
    }
}

pub fn app_config(catalog: CatalogConfig, flow: FlowConfig) -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        catalog,
        flow,
    }
}
