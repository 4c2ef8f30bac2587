//! Catalog models: raw tabular cells, canonical fields and typed catalog rows

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::table::Table;

/// A single cell as read from a spreadsheet or a JSON inventory payload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl CellValue {
    /// Convert a JSON scalar into a cell; nested values are kept as their JSON text
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Empty,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(n.to_string())),
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Trimmed text form of the cell, `None` for empty cells.
    ///
    /// Whole numbers drop the fractional part so that numeric article codes
    /// read from a spreadsheet (`12345.0`) compare equal to their text form.
    pub fn as_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_string())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s.trim()),
            CellValue::Date(d) if d.time() == chrono::NaiveTime::MIN => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Canonical catalog and output fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Codart,
    Nomart,
    Numlote,
    CodBarras,
    Presentacion,
    Fechavencelote,
    Cantidad,
}

impl Field {
    /// Export column order
    pub const OUTPUT_ORDER: [Field; 7] = [
        Field::Codart,
        Field::Nomart,
        Field::Numlote,
        Field::CodBarras,
        Field::Presentacion,
        Field::Fechavencelote,
        Field::Cantidad,
    ];

    /// Fields a catalog source may provide (quantity is always user supplied)
    pub const CATALOG_FIELDS: [Field; 6] = [
        Field::Codart,
        Field::Nomart,
        Field::Numlote,
        Field::CodBarras,
        Field::Presentacion,
        Field::Fechavencelote,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Codart => "codart",
            Field::Nomart => "nomart",
            Field::Numlote => "numlote",
            Field::CodBarras => "cod_barras",
            Field::Presentacion => "presentacion",
            Field::Fechavencelote => "fechavencelote",
            Field::Cantidad => "cantidad",
        }
    }

    /// Normalized column names accepted for this field, preferred first
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Codart => &["codart", "codarticulo"],
            Field::Nomart => &["nomart", "articulo"],
            Field::Numlote => &["numlote", "lote"],
            Field::CodBarras => &["cod_barras", "codbarras"],
            Field::Presentacion => &["presentacion"],
            Field::Fechavencelote => &["fechavencelote", "vencimiento"],
            Field::Cantidad => &["cantidad"],
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of canonical fields a loaded catalog actually provides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSchema {
    fields: BTreeSet<Field>,
}

impl CatalogSchema {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// Schema with every catalog field present
    pub fn complete() -> Self {
        Self::new(Field::CATALOG_FIELDS)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }
}

/// One article/lot entry of the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub codart: Option<String>,
    pub numlote: Option<String>,
    pub nomart: Option<String>,
    pub presentacion: Option<String>,
    pub cod_barras: Option<String>,
    #[serde(default)]
    pub fechavencelote: CellValue,
}

/// The normalized, read-only catalog produced by the loader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    schema: CatalogSchema,
    rows: Vec<CatalogRow>,
}

impl Catalog {
    pub fn new(schema: CatalogSchema, rows: Vec<CatalogRow>) -> Self {
        Self { schema, rows }
    }

    /// Build typed rows from a table whose column names are already normalized.
    ///
    /// The article code column is mandatory; every other field is optional and
    /// recorded in the schema only when a matching column exists.
    pub fn from_table(table: &Table) -> Result<Self, CatalogError> {
        let index_of = |field: Field| {
            field
                .aliases()
                .iter()
                .find_map(|alias| table.column_index(alias))
        };

        let codart = index_of(Field::Codart)
            .ok_or_else(|| CatalogError::MissingColumn(Field::Codart.name().to_string()))?;
        let numlote = index_of(Field::Numlote);
        let nomart = index_of(Field::Nomart);
        let presentacion = index_of(Field::Presentacion);
        let cod_barras = index_of(Field::CodBarras);
        let fechavencelote = index_of(Field::Fechavencelote);

        let schema = CatalogSchema::new(
            Field::CATALOG_FIELDS
                .into_iter()
                .filter(|field| index_of(*field).is_some()),
        );

        let text_at = |row: &[CellValue], idx: Option<usize>| {
            idx.and_then(|i| row.get(i)).and_then(CellValue::as_text)
        };

        let rows = table
            .rows
            .iter()
            .filter(|row| !row.iter().all(CellValue::is_empty))
            .map(|row| CatalogRow {
                codart: text_at(row, Some(codart)),
                numlote: text_at(row, numlote),
                nomart: text_at(row, nomart),
                presentacion: text_at(row, presentacion),
                cod_barras: text_at(row, cod_barras),
                fechavencelote: fechavencelote
                    .and_then(|i| row.get(i).cloned())
                    .unwrap_or_default(),
            })
            .collect();

        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> &CatalogSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_numeric_codes_render_without_fraction() {
        assert_eq!(CellValue::Number(12345.0).as_text().as_deref(), Some("12345"));
        assert_eq!(CellValue::Number(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(text("  A100 ").as_text().as_deref(), Some("A100"));
        assert_eq!(text("   ").as_text(), None);
        assert_eq!(CellValue::Empty.as_text(), None);
    }

    #[test]
    fn test_from_table_accepts_original_column_names() {
        let mut table = Table::new(vec![
            "codarticulo".into(),
            "articulo".into(),
            "lote".into(),
            "vencimiento".into(),
        ]);
        table.push_row(vec![text("A100"), text("Paracetamol"), text("L1"), text("2025-01-31")]);

        let catalog = Catalog::from_table(&table).unwrap();
        assert_eq!(catalog.len(), 1);
        let row = &catalog.rows()[0];
        assert_eq!(row.codart.as_deref(), Some("A100"));
        assert_eq!(row.nomart.as_deref(), Some("Paracetamol"));
        assert_eq!(row.numlote.as_deref(), Some("L1"));
        assert!(catalog.schema().contains(Field::Fechavencelote));
        assert!(!catalog.schema().contains(Field::CodBarras));
        assert!(!catalog.schema().contains(Field::Presentacion));
    }

    #[test]
    fn test_from_table_requires_article_code() {
        let table = Table::new(vec!["nomart".into(), "numlote".into()]);
        assert!(matches!(
            Catalog::from_table(&table),
            Err(CatalogError::MissingColumn(col)) if col == "codart"
        ));
    }

    #[test]
    fn test_from_table_skips_blank_rows() {
        let mut table = Table::new(vec!["codart".into(), "numlote".into()]);
        table.push_row(vec![CellValue::Empty, text(" ")]);
        table.push_row(vec![text("B200"), CellValue::Empty]);

        let catalog = Catalog::from_table(&table).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.rows()[0].numlote, None);
    }
}
