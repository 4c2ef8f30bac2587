//! Flow options shared by the server and browser bindings

use serde::{Deserialize, Serialize};

/// Export file shape: the latest entry only, or every saved entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    Single,
    #[default]
    Batch,
}

impl ExportMode {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportMode::Single => "consulta_guardada.xlsx",
            ExportMode::Batch => "consultas_guardadas.xlsx",
        }
    }
}

/// Switches that unify the variants of the capture form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowOptions {
    /// A scanned value replaces the typed article code
    pub auto_fill_from_scan: bool,
    /// Reject entries without a quantity
    pub quantity_required: bool,
    pub export_mode: ExportMode,
}
