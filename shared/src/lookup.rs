//! Article lookup and lot selection

use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::models::{Catalog, CatalogRow};

/// Synthetic lot choice meaning "type a new lot number"
pub const OTHER_LOT: &str = "Other";

/// Rows whose article code contains `code`, case-insensitively.
///
/// The code is matched as given. A blank or whitespace-only code means no
/// search was performed and yields no rows.
pub fn search(catalog: &Catalog, code: &str) -> Vec<CatalogRow> {
    search_rows(catalog.rows(), code)
}

pub fn search_rows(rows: &[CatalogRow], code: &str) -> Vec<CatalogRow> {
    if code.trim().is_empty() {
        return Vec::new();
    }
    let needle = code.to_lowercase();
    rows.iter()
        .filter(|row| {
            row.codart
                .as_ref()
                .map(|c| c.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Distinct lot codes in first-seen order, always followed by [`OTHER_LOT`]
pub fn distinct_lots(matches: &[CatalogRow]) -> Vec<String> {
    let mut lots: Vec<String> = Vec::new();
    for lot in matches.iter().filter_map(|row| row.numlote.as_deref()) {
        if lot != OTHER_LOT && !lots.iter().any(|l| l == lot) {
            lots.push(lot.to_string());
        }
    }
    lots.push(OTHER_LOT.to_string());
    lots
}

/// Row that supplies the non-lot fields of a new record.
///
/// For an existing lot that is the first row carrying it. For a new lot the
/// first match serves as template; with no matches there is nothing to
/// template from.
pub fn resolve_selected_row<'a>(
    matches: &'a [CatalogRow],
    chosen_lot: &str,
    is_new_lot: bool,
) -> Option<&'a CatalogRow> {
    if is_new_lot {
        return matches.first();
    }
    matches
        .iter()
        .find(|row| row.numlote.as_deref() == Some(chosen_lot))
}

/// Lot picked by the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "lot", rename_all = "snake_case")]
pub enum LotChoice {
    Existing(String),
    New(String),
}

impl LotChoice {
    /// Interpret a select-box value; the "Other" marker takes the typed lot
    pub fn from_form(chosen: &str, new_lot: Option<&str>) -> Self {
        if chosen.trim() == OTHER_LOT {
            LotChoice::New(new_lot.unwrap_or_default().trim().to_string())
        } else {
            LotChoice::Existing(chosen.trim().to_string())
        }
    }

    pub fn lot(&self) -> &str {
        match self {
            LotChoice::Existing(lot) | LotChoice::New(lot) => lot,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, LotChoice::New(_))
    }
}

/// Result of a lookup: the code searched, its matches and the lot options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub code: String,
    pub matches: Vec<CatalogRow>,
    pub lots: Vec<String>,
}

impl Selection {
    pub fn lookup(catalog: &Catalog, code: &str) -> Result<Self, LookupError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(LookupError::EmptyCode);
        }
        let matches = search(catalog, code);
        if matches.is_empty() {
            return Err(LookupError::NotFound(code.to_string()));
        }
        let lots = distinct_lots(&matches);
        Ok(Self {
            code: code.to_string(),
            matches,
            lots,
        })
    }

    pub fn resolve(&self, choice: &LotChoice) -> Option<&CatalogRow> {
        resolve_selected_row(&self.matches, choice.lot(), choice.is_new())
    }
}
