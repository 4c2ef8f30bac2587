//! Assembly of output records from a selected catalog row

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{CatalogRow, CatalogSchema, Field, OutputRecord};
use crate::validation::{normalize_expiry, validate_lot, validate_quantity};

/// Fields the record cannot be built without when the catalog lacks them.
/// `cod_barras`, `presentacion` and `fechavencelote` default to null instead.
const TEMPLATE_REQUIRED: [Field; 1] = [Field::Nomart];

/// Build one record from a template row plus the operator's lot and quantity.
///
/// The lot is checked first, so a blank lot is always reported as such. The
/// article code comes from the template row, falling back to the entered
/// code.
pub fn build_record(
    template: Option<&CatalogRow>,
    schema: &CatalogSchema,
    code: &str,
    lot: &str,
    quantity: Option<Decimal>,
) -> Result<OutputRecord, ValidationError> {
    let lot = validate_lot(lot)?;
    let template = template.ok_or(ValidationError::NoValidLot)?;

    let missing: Vec<Field> = TEMPLATE_REQUIRED
        .into_iter()
        .filter(|field| !schema.contains(*field))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns(missing));
    }

    let cantidad = quantity.map(validate_quantity).transpose()?;

    Ok(OutputRecord {
        codart: template
            .codart
            .clone()
            .unwrap_or_else(|| code.trim().to_string()),
        nomart: template.nomart.clone(),
        numlote: lot.to_string(),
        cod_barras: template.cod_barras.clone(),
        presentacion: template.presentacion.clone(),
        fechavencelote: normalize_expiry(&template.fechavencelote),
        cantidad,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn template() -> CatalogRow {
        CatalogRow {
            codart: Some("A100".into()),
            numlote: Some("L2".into()),
            nomart: Some("Ibuprofeno 400".into()),
            presentacion: Some("Caja x 10".into()),
            cod_barras: Some("7790001".into()),
            fechavencelote: CellValue::Text("2026-05-31 00:00:00".into()),
        }
    }

    #[test]
    fn test_build_record_copies_template() {
        let record = build_record(
            Some(&template()),
            &CatalogSchema::complete(),
            "a100",
            "L2",
            Some(Decimal::from(5)),
        )
        .unwrap();

        assert_eq!(record.codart, "A100");
        assert_eq!(record.numlote, "L2");
        assert_eq!(record.nomart.as_deref(), Some("Ibuprofeno 400"));
        assert_eq!(record.cod_barras.as_deref(), Some("7790001"));
        assert_eq!(record.fechavencelote.as_deref(), Some("31/05/2026"));
        assert_eq!(record.cantidad, Some(Decimal::from(5)));
    }

    #[test]
    fn test_blank_lot_wins_over_other_errors() {
        let schema = CatalogSchema::new([Field::Codart]);
        assert_eq!(
            build_record(None, &schema, "", "  ", Some(Decimal::from(-3))),
            Err(ValidationError::MissingLot)
        );
    }

    #[test]
    fn test_missing_template_is_no_valid_lot() {
        assert_eq!(
            build_record(None, &CatalogSchema::complete(), "Z999", "NEW1", None),
            Err(ValidationError::NoValidLot)
        );
    }

    #[test]
    fn test_optional_columns_default_to_null() {
        let schema = CatalogSchema::new([Field::Codart, Field::Nomart, Field::Numlote]);
        let row = CatalogRow {
            codart: Some("A100".into()),
            nomart: Some("Ibuprofeno".into()),
            ..Default::default()
        };
        let record = build_record(Some(&row), &schema, "A100", "NEW1", None).unwrap();
        assert_eq!(record.cod_barras, None);
        assert_eq!(record.presentacion, None);
        assert_eq!(record.fechavencelote, None);
        assert_eq!(record.cantidad, None);
    }

    #[test]
    fn test_catalog_without_article_name_fails() {
        let schema = CatalogSchema::new([Field::Codart, Field::Numlote]);
        assert_eq!(
            build_record(Some(&template()), &schema, "A100", "L2", None),
            Err(ValidationError::MissingColumns(vec![Field::Nomart]))
        );
    }

    #[test]
    fn test_unparseable_expiry_is_null() {
        let mut row = template();
        row.fechavencelote = CellValue::Text("consultar".into());
        let record =
            build_record(Some(&row), &CatalogSchema::complete(), "A100", "L2", None).unwrap();
        assert_eq!(record.fechavencelote, None);
    }

    #[test]
    fn test_code_falls_back_to_entered_value() {
        let mut row = template();
        row.codart = None;
        let record =
            build_record(Some(&row), &CatalogSchema::complete(), " A100 ", "L2", None).unwrap();
        assert_eq!(record.codart, "A100");
    }
}
