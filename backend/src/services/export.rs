//! Spreadsheet export of captured records

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Workbook};
use shared::{Field, OutputRecord};

use crate::error::AppResult;

/// Sheet name used when none is configured
pub const DEFAULT_SHEET_NAME: &str = "Consulta";

/// Content type sent with exported workbooks
pub const EXPORT_MIME: &str = "application/vnd.ms-excel";

/// Serialize records to an in-memory xlsx workbook.
///
/// One sheet, a header row with the field names, then one row per record in
/// the given order. The document creation time is pinned so identical input
/// produces identical bytes. Nothing is written to disk.
pub fn to_spreadsheet_bytes(records: &[OutputRecord], sheet_name: &str) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    for (col, field) in Field::OUTPUT_ORDER.iter().enumerate() {
        worksheet.write_string(0, col as u16, field.name())?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, field) in Field::OUTPUT_ORDER.iter().enumerate() {
            let col = col as u16;
            match field {
                Field::Cantidad => {
                    if let Some(quantity) = record.cantidad.and_then(|q| q.to_f64()) {
                        worksheet.write_number(row, col, quantity)?;
                    }
                }
                _ => {
                    if let Some(value) = record.text(*field) {
                        worksheet.write_string(row, col, value)?;
                    }
                }
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    tracing::debug!(records = records.len(), bytes = buffer.len(), "Built export workbook");
    Ok(buffer)
}
