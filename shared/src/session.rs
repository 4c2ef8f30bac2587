//! Per-operator session state: the current code, the last scan and the
//! entries saved so far

use serde::{Deserialize, Serialize};

use crate::error::{EntryError, LookupError, ValidationError};
use crate::lookup::{LotChoice, Selection};
use crate::models::{Catalog, OutputRecord, QuantityInput};
use crate::record_builder::build_record;
use crate::types::FlowOptions;
use crate::validation::{normalize_scanned_code, resolve_quantity, validate_lot};

/// What happened to a value handed over by the scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Nothing usable after normalization
    Ignored,
    /// Same value as the previous scan
    Unchanged(String),
    /// New value, now the active article code
    CodeUpdated(String),
    /// New value kept aside; auto-fill is off
    Stored(String),
}

/// One entry submitted from the capture form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryRequest {
    /// Article code; the session's active code is used when omitted
    pub code: Option<String>,
    pub chosen_lot: String,
    pub new_lot: Option<String>,
    pub quantity: Option<QuantityInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    options: FlowOptions,
    typed_code: Option<String>,
    scanned_code: Option<String>,
    entries: Vec<OutputRecord>,
}

impl Session {
    pub fn new(options: FlowOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    pub fn set_code(&mut self, code: &str) {
        let code = code.trim();
        self.typed_code = (!code.is_empty()).then(|| code.to_string());
    }

    /// Accept a decoded barcode. Repeating the last value changes nothing.
    pub fn accept_scan(&mut self, raw: &str) -> ScanOutcome {
        let code = normalize_scanned_code(raw);
        if code.is_empty() {
            return ScanOutcome::Ignored;
        }
        if self.scanned_code.as_deref() == Some(code.as_str()) {
            return ScanOutcome::Unchanged(code);
        }
        self.scanned_code = Some(code.clone());
        if self.options.auto_fill_from_scan {
            ScanOutcome::CodeUpdated(code)
        } else {
            ScanOutcome::Stored(code)
        }
    }

    /// Code the next lookup uses: a scan overrides typing when auto-fill is on
    pub fn active_code(&self) -> Option<&str> {
        match (&self.scanned_code, self.options.auto_fill_from_scan) {
            (Some(scanned), true) => Some(scanned.as_str()),
            _ => self.typed_code.as_deref(),
        }
    }

    pub fn scanned_code(&self) -> Option<&str> {
        self.scanned_code.as_deref()
    }

    /// Look up the article, validate the form and save one record
    pub fn add_entry(
        &mut self,
        catalog: &Catalog,
        request: &EntryRequest,
    ) -> Result<&OutputRecord, EntryError> {
        let code = match request.code.as_deref() {
            Some(code) if !code.trim().is_empty() => code.to_string(),
            _ => self
                .active_code()
                .map(str::to_string)
                .ok_or(LookupError::EmptyCode)?,
        };

        let selection = Selection::lookup(catalog, &code)?;
        let choice = LotChoice::from_form(&request.chosen_lot, request.new_lot.as_deref());
        validate_lot(choice.lot())?;
        let quantity =
            resolve_quantity(request.quantity.as_ref(), self.options.quantity_required)?;

        let record = build_record(
            selection.resolve(&choice),
            catalog.schema(),
            &selection.code,
            choice.lot(),
            quantity,
        )?;

        self.entries.push(record);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[OutputRecord] {
        &self.entries
    }

    /// Records to export under the configured mode
    pub fn export_records(&self) -> Result<&[OutputRecord], ValidationError> {
        if self.entries.is_empty() {
            return Err(ValidationError::NoEntries);
        }
        Ok(match self.options.export_mode {
            crate::types::ExportMode::Single => &self.entries[self.entries.len() - 1..],
            crate::types::ExportMode::Batch => &self.entries,
        })
    }

    /// Drop saved entries and the last scan, keeping the options
    pub fn clear(&mut self) {
        self.entries.clear();
        self.typed_code = None;
        self.scanned_code = None;
    }
}
