//! Schema inference: per-field type and mandatory flag from extracted rows

use crate::types::{CellValue, ExtractedSheet, FieldSchema, FieldType, SheetSchema};

/// Infer the type of a field from all of its values.
///
/// Rules are checked in order and the first match wins, so a column of 0/1
/// numbers is a `number`, never a `boolean`. Null and empty-text values carry
/// no type information and are ignored.
pub fn infer_field_type<'a, I>(values: I) -> FieldType
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let observed: Vec<&CellValue> = values.into_iter().filter(|v| !v.is_blank()).collect();

    if observed.is_empty() {
        return FieldType::String;
    }

    if observed.iter().all(|v| v.is_numeric()) {
        return FieldType::Number;
    }

    if observed.iter().all(|v| is_boolean_like(v)) {
        return FieldType::Boolean;
    }

    if observed.iter().all(|v| matches!(v, CellValue::Date(_))) {
        return FieldType::Date;
    }

    FieldType::String
}

fn is_boolean_like(value: &CellValue) -> bool {
    match value {
        CellValue::Boolean(_) => true,
        CellValue::Text(s) => s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false"),
        _ => false,
    }
}

/// A field is mandatory when no row leaves it null or empty
pub fn is_mandatory<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a CellValue>,
{
    values.into_iter().all(|v| !v.is_blank())
}

/// Build the schema of a sheet, one entry per header in header order
pub fn infer_schema(sheet: &ExtractedSheet) -> SheetSchema {
    let fields = sheet
        .header_names()
        .map(|name| {
            let schema = FieldSchema {
                field_type: infer_field_type(sheet.column_values(name)),
                mandatory: is_mandatory(sheet.column_values(name)),
            };
            (name.to_string(), schema)
        })
        .collect();

    SheetSchema { fields }
}
