//! WebAssembly module for the Lot Capture front end
//!
//! Provides client-side computation for:
//! - Article search and lot options over a downloaded catalog
//! - Barcode scan normalization
//! - Offline form validation before an entry is submitted

use rust_decimal::prelude::ToPrimitive;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{distinct_lots, search_rows, QuantityInput};

fn to_js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn parse_rows(rows_json: &str) -> Result<Vec<CatalogRow>, String> {
    serde_json::from_str(rows_json).map_err(|e| format!("Invalid catalog JSON: {}", e))
}

fn search_json(rows_json: &str, code: &str) -> Result<String, String> {
    let rows = parse_rows(rows_json)?;
    serde_json::to_string(&search_rows(&rows, code)).map_err(|e| e.to_string())
}

fn lot_options(rows_json: &str) -> Result<Vec<String>, String> {
    Ok(distinct_lots(&parse_rows(rows_json)?))
}

fn quantity_value(text: &str, required: bool) -> Result<Option<f64>, String> {
    let input = QuantityInput::Text(text.to_string());
    resolve_quantity(Some(&input), required)
        .map(|q| q.and_then(|q| q.to_f64()))
        .map_err(|e| e.to_string())
}

/// Rows whose article code contains `code`, as a JSON array
#[wasm_bindgen]
pub fn search_catalog(rows_json: &str, code: &str) -> Result<String, JsValue> {
    search_json(rows_json, code).map_err(to_js_error)
}

/// Lot options for a set of matched rows, ending with "Other"
#[wasm_bindgen]
pub fn lot_choices(matches_json: &str) -> Result<js_sys::Array, JsValue> {
    let lots = lot_options(matches_json).map_err(to_js_error)?;
    Ok(lots.into_iter().map(JsValue::from).collect())
}

/// Clean a value decoded by the camera barcode reader
#[wasm_bindgen]
pub fn normalize_scan(raw: &str) -> String {
    normalize_scanned_code(raw)
}

/// Whether a typed lot number is acceptable
#[wasm_bindgen]
pub fn check_lot(lot: &str) -> bool {
    validate_lot(lot).is_ok()
}

/// Parse the quantity field; `undefined` when it is left blank
#[wasm_bindgen]
pub fn check_quantity(text: &str, required: bool) -> Result<Option<f64>, JsValue> {
    quantity_value(text, required).map_err(to_js_error)
}

/// Expiry date as `dd/mm/yyyy`, or `undefined` when it cannot be read
#[wasm_bindgen]
pub fn format_expiry(value: &str) -> Option<String> {
    normalize_expiry(&CellValue::Text(value.to_string()))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_lot_choices_array() {
        let lots = lot_choices("[]").unwrap();
        assert_eq!(lots.length(), 1);
        assert_eq!(lots.get(0).as_string().as_deref(), Some("Other"));
    }
}
