//! Reading xlsx workbooks fetched from remote sources

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use shared::{excel_serial_to_datetime, CatalogError, CellValue, Table};

/// Parse an in-memory xlsx workbook into a table.
///
/// The first row of the sheet is the header. `sheet_name` selects the
/// sheet; the first sheet is used when it is `None`. Column names are
/// returned exactly as written; normalization is up to the caller.
pub fn read_table(bytes: &[u8], sheet_name: Option<&str>) -> Result<Table, CatalogError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| CatalogError::UnreadableWorkbook(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let sheet = match sheet_name {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| CatalogError::SheetNotFound(name.to_string()))?,
        None => sheet_names.first().cloned().ok_or(CatalogError::NoSheets)?,
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| CatalogError::UnreadableWorkbook(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| CatalogError::EmptySheet(sheet.clone()))?;

    let mut table = Table::new(header.iter().map(|cell| cell.to_string()).collect());
    for row in rows {
        table.push_row(row.iter().map(cell_value).collect());
    }

    tracing::debug!(
        sheet = %sheet,
        columns = table.columns.len(),
        rows = table.rows.len(),
        "Read workbook sheet"
    );
    Ok(table)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("TP's GHG").unwrap();
        sheet.write_string(0, 0, " CodArt ").unwrap();
        sheet.write_string(0, 1, "NumLote").unwrap();
        sheet.write_string(0, 2, "FechaVenceLote").unwrap();
        sheet.write_number(1, 0, 12345.0).unwrap();
        sheet.write_string(1, 1, "L1").unwrap();
        let date = ExcelDateTime::from_ymd(2026, 5, 31).unwrap();
        let format = Format::new().set_num_format("dd/mm/yyyy");
        sheet.write_datetime_with_format(1, 2, &date, &format).unwrap();

        let other = workbook.add_worksheet();
        other.set_name("Otra").unwrap();
        other.write_string(0, 0, "x").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_named_sheet() {
        let table = read_table(&workbook_bytes(), Some("TP's GHG")).unwrap();
        assert_eq!(table.columns, vec![" CodArt ", "NumLote", "FechaVenceLote"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][0], CellValue::Number(12345.0));
        assert_eq!(table.rows[0][1], CellValue::Text("L1".into()));
        assert_eq!(
            shared::normalize_expiry(&table.rows[0][2]).as_deref(),
            Some("31/05/2026")
        );
    }

    #[test]
    fn test_first_sheet_by_default() {
        let table = read_table(&workbook_bytes(), None).unwrap();
        assert_eq!(table.columns.len(), 3);
    }

    #[test]
    fn test_missing_sheet() {
        assert_eq!(
            read_table(&workbook_bytes(), Some("Hoja1")),
            Err(CatalogError::SheetNotFound("Hoja1".into()))
        );
    }

    #[test]
    fn test_not_a_workbook() {
        assert!(matches!(
            read_table(b"<html>login required</html>", None),
            Err(CatalogError::UnreadableWorkbook(_))
        ));
    }
}
