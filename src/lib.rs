//! sheetjson - Excel ↔ JSON conversion with schema inference
//!
//! This library converts spreadsheet workbooks to a JSON tabular representation
//! (one array of row objects per sheet) together with an inferred per-field
//! schema, and converts such JSON back into an .xlsx workbook.
//!
//! # Features
//!
//! - Typed cell decoding (text, integer, real, boolean, date, formula text)
//! - Schema inference: `string` / `number` / `boolean` / `date` + mandatory flag
//! - JSON → Excel with optional explicit column order per sheet
//! - Stateless: safe to call concurrently from any number of threads
//!
//! # Example
//!
//! ```no_run
//! use sheetjson::excel::{convert_from_json, convert_to_json};
//! use serde_json::json;
//!
//! let rows = json!({"Sheet1": [{"Name": "John Doe", "Age": 30}]});
//! let bytes = convert_from_json(&rows, None)?;
//!
//! let response = convert_to_json(&bytes);
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod cli;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use error::{ConvertError, ConvertResult};
pub use excel::{convert_from_json, convert_to_json};
pub use types::{CellValue, ConversionResponse, FieldSchema, FieldType, SheetFormat};
