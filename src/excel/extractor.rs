//! Sheet extractor: one worksheet → ordered headers + row records

use crate::error::ConvertResult;
use crate::excel::codec::{decode, decode_as_text, RawCell};
use crate::types::{ExtractedSheet, Header, Row};
use calamine::{Data, Range};

/// Value and formula ranges of one worksheet, addressed by absolute position
struct SheetCells<'a> {
    values: &'a Range<Data>,
    formulas: Option<&'a Range<String>>,
}

impl<'a> SheetCells<'a> {
    fn cell(&self, row: u32, col: u32) -> RawCell<'a> {
        RawCell::new(
            self.values.get_value((row, col)),
            self.formulas
                .and_then(|f| f.get_value((row, col)))
                .map(String::as_str),
        )
    }

    /// Last used (row, column), or `None` for a sheet with no cells
    fn last_cell(&self) -> Option<(u32, u32)> {
        let value_end = self.values.end();
        let formula_end = self.formulas.and_then(|f| f.end());
        match (value_end, formula_end) {
            (Some(v), Some(f)) => Some((v.0.max(f.0), v.1.max(f.1))),
            (end, None) | (None, end) => end,
        }
    }

    fn row_is_absent(&self, row: u32, last_col: u32) -> bool {
        (0..=last_col).all(|col| !self.cell(row, col).is_present())
    }
}

/// Read headers from row 0 and one `Row` per following non-empty row.
///
/// Coordinates are absolute, so a used range that does not start at A1 is
/// read relative to A1. Blank header cells are skipped and each header stays
/// bound to its own column. A repeated header name keeps its first position
/// but takes its values from the last column carrying that name.
pub fn extract(values: &Range<Data>, formulas: Option<&Range<String>>) -> ConvertResult<ExtractedSheet> {
    let cells = SheetCells { values, formulas };

    let (last_row, last_col) = match cells.last_cell() {
        Some(end) => end,
        None => return Ok(ExtractedSheet::default()),
    };

    let mut headers: Vec<Header> = Vec::new();
    for col in 0..=last_col {
        let cell = cells.cell(0, col);
        if !cell.is_present() {
            continue;
        }
        let name = decode_as_text(cell)?;
        match headers.iter_mut().find(|h| h.name == name) {
            Some(existing) => existing.column = col,
            None => headers.push(Header::new(name, col)),
        }
    }

    let mut rows = Vec::new();
    for row_idx in 1..=last_row {
        if cells.row_is_absent(row_idx, last_col) {
            continue;
        }
        let mut row = Row::new();
        for header in &headers {
            let value = decode(cells.cell(row_idx, header.column))?;
            row.push(header.name.clone(), value);
        }
        rows.push(row);
    }

    Ok(ExtractedSheet { headers, rows })
}
