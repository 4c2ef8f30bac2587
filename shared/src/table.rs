//! Loosely-typed tables as fetched from remote sources, plus the column
//! normalization and join steps applied before rows become a [`Catalog`].
//!
//! [`Catalog`]: crate::models::Catalog

use std::collections::HashMap;

use serde::Serialize;

use crate::error::CatalogError;
use crate::models::{CellValue, Field};

/// Header plus rows of cells; every row has exactly `columns.len()` cells
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the header width
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Lower-case and trim every column name
    pub fn normalize_columns(&mut self) {
        for column in &mut self.columns {
            *column = column.trim().to_lowercase();
        }
    }

    /// Rename a column matched case-insensitively, unless `to` already exists
    pub fn rename_column_ci(&mut self, from: &str, to: &str) -> bool {
        if self.has_column(to) {
            return false;
        }
        match self
            .columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(from))
        {
            Some(idx) => {
                self.columns[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Rename the first alias column of `field` to its canonical name
    pub fn adopt_canonical(&mut self, field: Field) -> bool {
        let canonical = field.name();
        if self.has_column(canonical) {
            return false;
        }
        field
            .aliases()
            .iter()
            .any(|alias| self.rename_column_ci(alias, canonical))
    }

    /// Build a table from a JSON array of objects.
    ///
    /// Columns are the union of object keys in first-seen order; missing keys
    /// become empty cells.
    pub fn from_json_records(value: &serde_json::Value) -> Result<Self, CatalogError> {
        let records = value.as_array().ok_or_else(|| {
            CatalogError::UnexpectedShape("expected a JSON array of objects".to_string())
        })?;

        let mut columns: Vec<String> = Vec::new();
        let mut objects = Vec::with_capacity(records.len());
        for record in records {
            let object = record.as_object().ok_or_else(|| {
                CatalogError::UnexpectedShape(format!("expected an object, found {}", record))
            })?;
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
            objects.push(object);
        }

        let mut table = Table::new(columns);
        for object in objects {
            let row: Vec<CellValue> = table
                .columns
                .iter()
                .map(|c| object.get(c).map(CellValue::from_json).unwrap_or_default())
                .collect();
            table.push_row(row);
        }
        Ok(table)
    }

    /// Left join `right` onto `self` on `key`, bringing in only `bring`.
    ///
    /// Keys compare on their trimmed text form. The first right row per key
    /// wins, so the left side never gains rows. A left row without a match
    /// keeps whatever it already had in the brought column (empty when the
    /// column is new).
    pub fn left_join(
        &mut self,
        right: &Table,
        key: &str,
        bring: &[&str],
    ) -> Result<(), CatalogError> {
        let left_key = self
            .column_index(key)
            .ok_or_else(|| CatalogError::MissingColumn(key.to_string()))?;
        let right_key = right
            .column_index(key)
            .ok_or_else(|| CatalogError::MissingColumn(key.to_string()))?;

        let mut lookup: HashMap<String, &Vec<CellValue>> = HashMap::new();
        for row in &right.rows {
            if let Some(k) = row.get(right_key).and_then(CellValue::as_text) {
                lookup.entry(k).or_insert(row);
            }
        }

        for column in bring {
            let source = right
                .column_index(column)
                .ok_or_else(|| CatalogError::MissingColumn(column.to_string()))?;
            let target = match self.column_index(column) {
                Some(idx) => idx,
                None => {
                    self.columns.push(column.to_string());
                    for row in &mut self.rows {
                        row.push(CellValue::Empty);
                    }
                    self.columns.len() - 1
                }
            };

            for row in &mut self.rows {
                let matched = row
                    .get(left_key)
                    .and_then(CellValue::as_text)
                    .and_then(|k| lookup.get(&k));
                if let Some(right_row) = matched {
                    row[target] = right_row.get(source).cloned().unwrap_or_default();
                }
            }
        }
        Ok(())
    }
}
