//! Excel exporter implementation - JSON sheet object → .xlsx bytes

use crate::error::{ConvertError, ConvertResult};
use crate::excel::codec::encode;
use crate::types::SheetFormat;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::{Map, Value};
use tracing::debug;

/// Excel exporter for JSON objects of the form `{ sheet name: [row objects] }`
pub struct ExcelExporter<'a> {
    /// Explicit header order per sheet name
    format: Option<&'a SheetFormat>,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new exporter, optionally with an explicit column order per sheet
    pub fn new(format: Option<&'a SheetFormat>) -> Self {
        Self { format }
    }

    /// Build a workbook from `json` and return the serialized .xlsx bytes.
    ///
    /// Only entries holding a non-empty array become sheets, in object order.
    /// Fails as a whole: no bytes are returned if any cell cannot be written.
    pub fn export(&self, json: &Value) -> ConvertResult<Vec<u8>> {
        let sheets = json.as_object().ok_or_else(|| {
            ConvertError::Write(format!(
                "Expected a JSON object of sheets, found {}",
                json_kind(json)
            ))
        })?;

        let mut workbook = Workbook::new();
        let mut sheet_count = 0usize;

        for (sheet_name, sheet_data) in sheets {
            let rows = match sheet_data {
                Value::Array(rows) if !rows.is_empty() => rows,
                _ => {
                    debug!(sheet = %sheet_name, "skipping entry without rows");
                    continue;
                }
            };

            let worksheet = workbook.add_worksheet();
            self.export_sheet(worksheet, sheet_name, rows)?;
            sheet_count += 1;
        }

        if sheet_count == 0 {
            return Err(ConvertError::EmptyInput(
                "No non-empty sheet arrays to write".to_string(),
            ));
        }

        workbook
            .save_to_buffer()
            .map_err(|e| ConvertError::Write(format!("Failed to serialize workbook: {}", e)))
    }

    /// Header order for a sheet: the format's list if given, otherwise the
    /// keys of the first row in their own order
    fn headers_for(&self, sheet_name: &str, rows: &[Value]) -> Vec<String> {
        if let Some(headers) = self.format.and_then(|f| f.get(sheet_name)) {
            return headers.clone();
        }
        rows.first()
            .and_then(Value::as_object)
            .map(|first| first.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Write a single sheet: header row, then one row per array element
    fn export_sheet(
        &self,
        worksheet: &mut Worksheet,
        sheet_name: &str,
        rows: &[Value],
    ) -> ConvertResult<()> {
        worksheet.set_name(sheet_name).map_err(|e| {
            ConvertError::Write(format!("Invalid sheet name '{}': {}", sheet_name, e))
        })?;

        let headers = self.headers_for(sheet_name, rows);

        for (col_idx, header) in headers.iter().enumerate() {
            let col = column_index(col_idx, sheet_name)?;
            worksheet.write_string(0, col, header).map_err(|e| {
                ConvertError::Write(format!(
                    "Failed to write header '{}' in sheet '{}': {}",
                    header, sheet_name, e
                ))
            })?;
        }

        for (row_idx, row_data) in rows.iter().enumerate() {
            let row = row_index(row_idx + 1, sheet_name)?;
            // Non-object elements have no fields, so their row stays untouched
            let Some(fields) = row_data.as_object() else {
                continue;
            };
            self.write_row(worksheet, sheet_name, row, &headers, fields)?;
        }

        worksheet.autofit();

        debug!(
            sheet = %sheet_name,
            headers = headers.len(),
            rows = rows.len(),
            "exported sheet"
        );

        Ok(())
    }

    fn write_row(
        &self,
        worksheet: &mut Worksheet,
        sheet_name: &str,
        row: u32,
        headers: &[String],
        fields: &Map<String, Value>,
    ) -> ConvertResult<()> {
        for (col_idx, header) in headers.iter().enumerate() {
            if let Some(value) = fields.get(header) {
                let col = column_index(col_idx, sheet_name)?;
                encode(worksheet, row, col, value).map_err(|e| match e {
                    ConvertError::Write(msg) => {
                        ConvertError::Write(format!("Sheet '{}': {}", sheet_name, msg))
                    }
                    other => other,
                })?;
            }
        }
        Ok(())
    }
}

fn column_index(idx: usize, sheet_name: &str) -> ConvertResult<u16> {
    u16::try_from(idx).map_err(|_| {
        ConvertError::Write(format!(
            "Sheet '{}' has too many columns ({})",
            sheet_name,
            idx + 1
        ))
    })
}

fn row_index(idx: usize, sheet_name: &str) -> ConvertResult<u32> {
    u32::try_from(idx).map_err(|_| {
        ConvertError::Write(format!(
            "Sheet '{}' has too many rows ({})",
            sheet_name,
            idx + 1
        ))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
