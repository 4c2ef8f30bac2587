//! Output records captured by the operator

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Field;

/// One persisted entry, in export column order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub codart: String,
    pub nomart: Option<String>,
    pub numlote: String,
    pub cod_barras: Option<String>,
    pub presentacion: Option<String>,
    /// Expiry formatted as `dd/mm/yyyy`, `None` when it could not be parsed
    pub fechavencelote: Option<String>,
    pub cantidad: Option<Decimal>,
}

impl OutputRecord {
    /// Text value of a field; the quantity is rendered with its decimal form
    pub fn text(&self, field: Field) -> Option<String> {
        match field {
            Field::Codart => Some(self.codart.clone()),
            Field::Nomart => self.nomart.clone(),
            Field::Numlote => Some(self.numlote.clone()),
            Field::CodBarras => self.cod_barras.clone(),
            Field::Presentacion => self.presentacion.clone(),
            Field::Fechavencelote => self.fechavencelote.clone(),
            Field::Cantidad => self.cantidad.map(|q| q.normalize().to_string()),
        }
    }
}

/// Quantity as typed in the form: either a JSON number or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(Decimal),
    Text(String),
}

impl From<Decimal> for QuantityInput {
    fn from(value: Decimal) -> Self {
        QuantityInput::Number(value)
    }
}

impl From<&str> for QuantityInput {
    fn from(value: &str) -> Self {
        QuantityInput::Text(value.to_string())
    }
}
