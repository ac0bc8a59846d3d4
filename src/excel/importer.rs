//! Excel importer implementation - workbook bytes → JSON data + schema

use crate::error::{ConvertError, ConvertResult};
use crate::excel::extractor::extract;
use crate::excel::schema::infer_schema;
use crate::types::WorkbookJson;
use calamine::{open_workbook_auto_from_rs, Reader};
use std::io::Cursor;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::debug;

/// Excel importer for converting in-memory workbooks to JSON.
///
/// Accepts any container calamine recognizes (xlsx, xlsm, xlsb, xls, ods).
pub struct ExcelImporter<'a> {
    bytes: &'a [u8],
}

impl<'a> ExcelImporter<'a> {
    /// Create a new importer over the raw workbook bytes
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Import every sheet, in workbook order.
    ///
    /// Any failure aborts the whole import; no partial result is returned.
    pub fn import(&self) -> ConvertResult<WorkbookJson> {
        // calamine can panic on some malformed containers; surface that as a parse error
        catch_unwind(AssertUnwindSafe(|| self.import_sheets())).unwrap_or_else(|panic| {
            let detail = panic
                .downcast_ref::<String>()
                .map(String::as_str)
                .or_else(|| panic.downcast_ref::<&str>().copied())
                .unwrap_or("unknown cause");
            Err(ConvertError::Parse(format!(
                "Workbook reader panicked: {}",
                detail
            )))
        })
    }

    fn import_sheets(&self) -> ConvertResult<WorkbookJson> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(self.bytes))
            .map_err(|e| ConvertError::Parse(format!("Failed to open workbook: {}", e)))?;

        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(ConvertError::EmptyInput(
                "Workbook contains no sheets".to_string(),
            ));
        }

        let mut result = WorkbookJson::new();

        for sheet_name in &sheet_names {
            let range = workbook.worksheet_range(sheet_name).map_err(|e| {
                ConvertError::Parse(format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;

            let formulas = workbook.worksheet_formula(sheet_name).map_err(|e| {
                ConvertError::Parse(format!(
                    "Failed to read formulas of sheet '{}': {}",
                    sheet_name, e
                ))
            })?;

            let sheet = extract(&range, Some(&formulas)).map_err(|e| match e {
                ConvertError::Parse(msg) => {
                    ConvertError::Parse(format!("Sheet '{}': {}", sheet_name, msg))
                }
                other => other,
            })?;
            let schema = infer_schema(&sheet);

            debug!(
                sheet = %sheet_name,
                headers = sheet.headers.len(),
                rows = sheet.rows.len(),
                "imported sheet"
            );

            result.add_sheet(sheet_name, &sheet, &schema)?;
        }

        Ok(result)
    }
}
