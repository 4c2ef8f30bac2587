//! Validation and normalization of operator input
//!
//! Covers lot codes, quantities, expiry dates in the assorted formats the
//! catalog sources use, and values handed over by a barcode scanner.

use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{CellValue, QuantityInput};

// ============================================================================
// Lot and quantity
// ============================================================================

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validate a lot code, returning it trimmed
pub fn validate_lot(lot: &str) -> Result<&str, ValidationError> {
    let lot = lot.trim();
    if lot.is_empty() {
        return Err(ValidationError::MissingLot);
    }
    Ok(lot)
}

/// Validate a numeric quantity (zero allowed, negatives rejected)
pub fn validate_quantity(quantity: Decimal) -> Result<Decimal, ValidationError> {
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(ValidationError::InvalidQuantity(quantity.to_string()));
    }
    Ok(quantity)
}

/// Turn the form's quantity into an optional number.
///
/// Blank text counts as omitted. Text accepts a decimal comma (`2,5`).
pub fn resolve_quantity(
    input: Option<&QuantityInput>,
    required: bool,
) -> Result<Option<Decimal>, ValidationError> {
    let quantity = match input {
        None => None,
        Some(QuantityInput::Number(n)) => Some(validate_quantity(*n)?),
        Some(QuantityInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                let parsed = Decimal::from_str(&text.replace(',', "."))
                    .map_err(|_| ValidationError::InvalidQuantity(text.to_string()))?;
                Some(validate_quantity(parsed)?)
            }
        }
    };

    match quantity {
        None if required => Err(ValidationError::MissingQuantity),
        other => Ok(other),
    }
}

// ============================================================================
// Expiry dates
// ============================================================================

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%Y%m%d",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Largest serial Excel accepts (31/12/9999)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    use chrono::Datelike;
    (1900..=9999).contains(&date.year()).then_some(date)
}

/// Convert an Excel serial day number (1900 date system) to a datetime
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Permissive date parser for free-text expiry values.
///
/// Day-first for slash, dash and dot separated dates. Two-digit years are
/// tried last.
pub fn parse_date_permissive(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok().and_then(plausible))
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|fmt| {
                NaiveDateTime::parse_from_str(text, fmt)
                    .ok()
                    .and_then(|dt| plausible(dt.date()))
            })
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .and_then(|dt| plausible(dt.date_naive()))
        })
        .or_else(|| NaiveDate::parse_from_str(text, "%d/%m/%y").ok())
}

/// Resolve any cell to a date: native dates, Excel serials, `yyyymmdd`
/// integers and text
pub fn cell_to_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(dt) => Some(dt.date()),
        CellValue::Number(n) if *n > MAX_EXCEL_SERIAL && n.fract() == 0.0 => {
            parse_date_permissive(&format!("{}", *n as i64))
        }
        CellValue::Number(n) => excel_serial_to_datetime(*n).map(|dt| dt.date()),
        CellValue::Text(s) => parse_date_permissive(s),
        CellValue::Bool(_) | CellValue::Empty => None,
    }
}

/// Normalize an expiry cell to `dd/mm/yyyy`; unparseable values become `None`
pub fn normalize_expiry(cell: &CellValue) -> Option<String> {
    cell_to_date(cell).map(|d| d.format("%d/%m/%Y").to_string())
}

// ============================================================================
// Scanner input
// ============================================================================

/// Clean a value handed over by a barcode/QR decoder.
///
/// Strips surrounding whitespace and byte-order marks and drops control
/// characters (scanners often terminate reads with CR/LF or TAB).
pub fn normalize_scanned_code(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
        .chars()
        .filter(|c| !c.is_control())
        .collect()
}
