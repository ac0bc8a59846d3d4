use crate::error::{ConvertError, ConvertResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Textual rendering of `CellValue::Date` in JSON output and header text.
/// Fractional seconds are only printed when present.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

//==============================================================================
// Cell Values
//==============================================================================

/// A single decoded spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing, blank or error cell
    Null,
    Text(String),
    /// Numeric cell with no fractional part
    Integer(i64),
    Real(f64),
    Boolean(bool),
    /// Numeric cell carrying a date format
    Date(NaiveDateTime),
    /// Literal formula source, never the cached result
    FormulaText(String),
}

impl CellValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Real(_))
    }

    /// Null or empty text: the two values that make a field optional
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Map to the JSON value model.
    ///
    /// Dates become ISO-8601 strings (see [`DATE_FORMAT`]), formulas become their
    /// source text, and non-finite reals become `null`.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Text(s) | CellValue::FormulaText(s) => Value::String(s.clone()),
            CellValue::Integer(i) => Value::from(*i),
            CellValue::Real(f) => Value::from(*f),
            CellValue::Boolean(b) => Value::Bool(*b),
            CellValue::Date(dt) => Value::String(dt.format(DATE_FORMAT).to_string()),
        }
    }
}

//==============================================================================
// Extracted Sheet Model
//==============================================================================

/// A header name bound to the source column it was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub column: u32,
}

impl Header {
    pub fn new(name: impl Into<String>, column: u32) -> Self {
        Self {
            name: name.into(),
            column,
        }
    }
}

/// One data row: exactly one value per header, in header order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: String, value: CellValue) {
        self.cells.push((name, value));
    }

    /// Value bound to `name`; `None` if the header is not in scope
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// JSON object keyed in header order
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = self
            .cells
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(object)
    }
}

/// Headers and rows read from one worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedSheet {
    pub headers: Vec<Header>,
    pub rows: Vec<Row>,
}

impl ExtractedSheet {
    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|h| h.name.as_str())
    }

    /// All values of one field, one per row
    pub fn column_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CellValue> {
        self.rows.iter().filter_map(move |row| row.get(name))
    }

    /// JSON array of row objects
    pub fn to_json(&self) -> Value {
        Value::Array(self.rows.iter().map(Row::to_json).collect())
    }
}

//==============================================================================
// Schema Types
//==============================================================================

/// Inferred type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
}

/// Schema entry for one field of one sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub mandatory: bool,
}

/// Per-field schemas of one sheet, in header order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSchema {
    pub fields: Vec<(String, FieldSchema)>,
}

impl SheetSchema {
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, schema)| schema)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON object of `{type, mandatory}` entries in header order
    pub fn to_json(&self) -> ConvertResult<Value> {
        serde_json::to_value(self).map_err(ConvertError::from)
    }
}

impl Serialize for SheetSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(name, schema)| (name, schema)))
    }
}

//==============================================================================
// Conversion Results
//==============================================================================

/// Explicit header order per sheet name, used when writing workbooks.
/// Sheets missing from the map take their headers from their first row.
pub type SheetFormat = HashMap<String, Vec<String>>;

/// Combined JSON data and schema for a whole workbook, keyed by sheet name
/// in workbook order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookJson {
    pub data: Map<String, Value>,
    pub schema: Map<String, Value>,
}

impl WorkbookJson {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(
        &mut self,
        name: &str,
        sheet: &ExtractedSheet,
        schema: &SheetSchema,
    ) -> ConvertResult<()> {
        self.data.insert(name.to_string(), sheet.to_json());
        self.schema.insert(name.to_string(), schema.to_json()?);
        Ok(())
    }

    pub fn sheet_count(&self) -> usize {
        self.data.len()
    }
}

/// Result of a workbook → JSON conversion.
///
/// Either `data` and `schema` are populated, or `error` is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionResponse {
    pub fn ok(workbook: WorkbookJson) -> Self {
        Self {
            data: Some(Value::Object(workbook.data)),
            schema: Some(Value::Object(workbook.schema)),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            data: None,
            schema: None,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
