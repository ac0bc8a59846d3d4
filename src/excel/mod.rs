//! Excel ↔ JSON conversion engine
//!
//! This module provides bidirectional conversion:
//! - Import: workbook bytes → `{data, schema}` with per-field type inference
//! - Export: `{sheet: [rows]}` JSON (+ optional column order) → .xlsx bytes
//!
//! Every call builds its own reader/writer; nothing is shared between calls.

pub mod codec;
mod exporter;
mod extractor;
mod importer;
mod schema;

pub use codec::{decode, decode_as_text, encode, RawCell};
pub use exporter::ExcelExporter;
pub use extractor::extract;
pub use importer::ExcelImporter;
pub use schema::{infer_field_type, infer_schema, is_mandatory};

use crate::error::ConvertResult;
use crate::types::{ConversionResponse, SheetFormat};
use serde_json::Value;

/// Convert a workbook to JSON data and schema.
///
/// Never fails outright: errors are reported in the response's `error` field.
pub fn convert_to_json(bytes: &[u8]) -> ConversionResponse {
    match ExcelImporter::new(bytes).import() {
        Ok(workbook) => ConversionResponse::ok(workbook),
        Err(e) => ConversionResponse::err(e.to_string()),
    }
}

/// Convert a JSON object of sheet arrays to .xlsx bytes
pub fn convert_from_json(json: &Value, format: Option<&SheetFormat>) -> ConvertResult<Vec<u8>> {
    ExcelExporter::new(format).export(json)
}
