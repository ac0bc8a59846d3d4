//! Cell value codec: spreadsheet cell ↔ `CellValue`, JSON value → written cell

use crate::error::{ConvertError, ConvertResult};
use crate::types::{CellValue, DATE_FORMAT};
use calamine::{Data, ExcelDateTime};
use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Formula, Worksheet};
use serde_json::Value;

/// Formula stored for an empty string.
///
/// An xlsx string cell cannot be empty, so `""` is written as this constant
/// formula with an empty cached text result and read back as `Text("")`.
pub const EMPTY_TEXT_FORMULA: &str = "\"\"";

/// A cell as read from a worksheet: its cached value and, if any, its formula text
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCell<'a> {
    pub value: Option<&'a Data>,
    pub formula: Option<&'a str>,
}

impl<'a> RawCell<'a> {
    pub fn new(value: Option<&'a Data>, formula: Option<&'a str>) -> Self {
        Self { value, formula }
    }

    /// Formula source, if the cell holds a non-empty formula
    fn formula_text(&self) -> Option<&'a str> {
        self.formula.filter(|f| !f.is_empty())
    }

    /// True if the cell exists in the source (has a value or a formula)
    pub fn is_present(&self) -> bool {
        self.formula_text().is_some() || !matches!(self.value, None | Some(Data::Empty))
    }
}

/// Decode a cell into a typed value.
///
/// Formulas win over cached values, except the empty-text constant
/// [`EMPTY_TEXT_FORMULA`], which decodes as empty text. Whole-valued numbers become `Integer`,
/// date-formatted numbers become `Date`, blanks and error cells become `Null`.
pub fn decode(cell: RawCell<'_>) -> ConvertResult<CellValue> {
    if let Some(formula) = cell.formula_text() {
        if formula == EMPTY_TEXT_FORMULA {
            return Ok(CellValue::Text(String::new()));
        }
        return Ok(CellValue::FormulaText(formula.to_string()));
    }

    let value = match cell.value {
        Some(value) => value,
        None => return Ok(CellValue::Null),
    };

    match value {
        Data::String(s) => Ok(CellValue::Text(s.clone())),
        Data::Float(f) => Ok(decode_number(*f)),
        Data::Int(i) => Ok(CellValue::Integer(*i)),
        Data::Bool(b) => Ok(CellValue::Boolean(*b)),
        Data::DateTime(dt) => decode_datetime(dt),
        Data::DateTimeIso(s) => parse_iso_datetime(s).map(CellValue::Date),
        Data::DurationIso(s) => Ok(CellValue::Text(s.clone())),
        Data::Error(_) | Data::Empty => Ok(CellValue::Null),
    }
}

/// Decode a cell and render it as text. Only used for header cells.
pub fn decode_as_text(cell: RawCell<'_>) -> ConvertResult<String> {
    let text = match decode(cell)? {
        CellValue::Null => String::new(),
        CellValue::Text(s) | CellValue::FormulaText(s) => s,
        CellValue::Integer(i) => i.to_string(),
        CellValue::Real(f) => f.to_string(),
        CellValue::Boolean(b) => b.to_string(),
        CellValue::Date(dt) => dt.format(DATE_FORMAT).to_string(),
    };
    Ok(text)
}

/// Normalize a float: whole values that fit in `i64` become `Integer`
fn decode_number(value: f64) -> CellValue {
    if value.is_finite()
        && value == value.floor()
        && value >= i64::MIN as f64
        && value < i64::MAX as f64
    {
        CellValue::Integer(value as i64)
    } else {
        CellValue::Real(value)
    }
}

fn decode_datetime(dt: &ExcelDateTime) -> ConvertResult<CellValue> {
    // Durations ([h]:mm etc.) carry no calendar date; keep the raw serial.
    if dt.is_duration() {
        return Ok(decode_number(dt.as_f64()));
    }
    dt.as_datetime().map(CellValue::Date).ok_or_else(|| {
        ConvertError::Parse(format!(
            "Date serial {} is outside the representable range",
            dt.as_f64()
        ))
    })
}

fn parse_iso_datetime(s: &str) -> ConvertResult<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ConvertError::Parse(format!("Unrecognized ISO date value '{}'", s)))
}

/// Write a JSON value into a worksheet cell.
///
/// No date detection is attempted: every JSON number becomes a plain numeric cell.
/// An empty string becomes [`EMPTY_TEXT_FORMULA`] so the cell stays present.
pub fn encode(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> ConvertResult<()> {
    let written = match value {
        Value::Null => worksheet.write_blank(row, col, &Format::new()),
        // An empty cached result would otherwise be replaced by the sheet default of 0
        Value::String(s) if s.is_empty() => worksheet
            .set_formula_result_default("")
            .write_formula(row, col, Formula::new(EMPTY_TEXT_FORMULA)),
        Value::String(s) => worksheet.write_string(row, col, s),
        Value::Number(n) => {
            let number = n.as_f64().ok_or_else(|| {
                ConvertError::Write(format!("Number {} cannot be represented as f64", n))
            })?;
            worksheet.write_number(row, col, number)
        }
        Value::Bool(b) => worksheet.write_boolean(row, col, *b),
        Value::Array(_) | Value::Object(_) => worksheet.write_string(row, col, value.to_string()),
    };

    written.map(|_| ()).map_err(|e| {
        ConvertError::Write(format!(
            "Failed to write cell at row {}, column {}: {}",
            row, col, e
        ))
    })
}
