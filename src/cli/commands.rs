//! CLI command handlers

use crate::error::{ConvertError, ConvertResult};
use crate::excel::{ExcelExporter, ExcelImporter};
use crate::types::{ConversionResponse, SheetFormat};
use colored::Colorize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Execute the to-json command
///
/// Without `output` the JSON document is the only thing printed, so the
/// command can be piped.
pub fn to_json(
    input: PathBuf,
    output: Option<PathBuf>,
    compact: bool,
    verbose: bool,
) -> ConvertResult<()> {
    if verbose {
        eprintln!("{}", "📖 Reading workbook...".cyan());
    }

    let bytes = fs::read(&input)?;
    let workbook = ExcelImporter::new(&bytes).import()?;

    if verbose {
        eprintln!("   Found {} sheets", workbook.sheet_count());
        for (sheet_name, rows) in &workbook.data {
            let row_count = rows.as_array().map_or(0, Vec::len);
            eprintln!("   📊 Sheet: {} ({} rows)", sheet_name.bright_blue(), row_count);
        }
        eprintln!();
    }

    let response = ConversionResponse::ok(workbook);
    let text = if compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };

    match output {
        Some(path) => {
            fs::write(&path, text)?;
            println!("{}", "✅ Conversion Complete!".bold().green());
            println!("   Input:  {}", input.display());
            println!("   Output: {}\n", path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}

/// Execute the to-excel command
pub fn to_excel(
    input: PathBuf,
    output: PathBuf,
    format: Option<PathBuf>,
    verbose: bool,
) -> ConvertResult<()> {
    println!("{}", "📊 sheetjson - JSON → Excel".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    if verbose {
        println!("{}", "📖 Parsing JSON file...".cyan());
    }

    let document: Value = serde_json::from_str(&fs::read_to_string(&input)?)?;
    let (json, embedded_format) = split_request_document(document)?;

    // An explicit --format file wins over a format embedded in the input
    let format = match format {
        Some(path) => Some(read_format(&path)?),
        None => embedded_format,
    };

    if verbose {
        let sheet_count = json.as_object().map_or(0, |o| o.len());
        println!("   Found {} entries", sheet_count);
        if let Some(format) = &format {
            println!("   Column order given for {} sheets", format.len());
        }
        println!();
    }

    let bytes = ExcelExporter::new(format.as_ref()).export(&json)?;
    fs::write(&output, bytes)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Excel file: {}\n", output.display());

    Ok(())
}

/// Accept either a bare `{sheet: [rows]}` object or a request document of
/// the form `{"json": {...}, "format": {...}}` (`data` is an alias of `json`)
pub fn split_request_document(document: Value) -> ConvertResult<(Value, Option<SheetFormat>)> {
    let is_request = document.as_object().is_some_and(|object| {
        object.keys().all(|k| matches!(k.as_str(), "json" | "data" | "format"))
            && ["json", "data"]
                .iter()
                .filter_map(|key| object.get(*key))
                .any(Value::is_object)
    });

    if !is_request {
        return Ok((document, None));
    }

    let mut object = match document {
        Value::Object(object) => object,
        other => return Ok((other, None)),
    };

    let json = object
        .remove("json")
        .or_else(|| object.remove("data"))
        .unwrap_or(Value::Null);
    let format = match object.remove("format") {
        None | Some(Value::Null) => None,
        Some(value) => Some(serde_json::from_value(value)?),
    };

    Ok((json, format))
}

fn read_format(path: &Path) -> ConvertResult<SheetFormat> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(ConvertError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_object_is_passed_through() {
        let doc = json!({"Sheet1": [{"a": 1}]});
        let (json, format) = split_request_document(doc.clone()).unwrap();
        assert_eq!(json, doc);
        assert!(format.is_none());
    }

    #[test]
    fn test_request_document_is_split() {
        let doc = json!({
            "json": {"Sheet1": [{"a": 1, "b": 2}]},
            "format": {"Sheet1": ["b", "a"]}
        });
        let (json, format) = split_request_document(doc).unwrap();
        assert_eq!(json, json!({"Sheet1": [{"a": 1, "b": 2}]}));
        assert_eq!(format.unwrap()["Sheet1"], vec!["b", "a"]);
    }

    #[test]
    fn test_sheet_named_data_is_not_a_request() {
        // "data" holds an array, so this is a sheet, not a request wrapper
        let doc = json!({"data": [{"a": 1}]});
        let (json, format) = split_request_document(doc.clone()).unwrap();
        assert_eq!(json, doc);
        assert!(format.is_none());
    }

    #[test]
    fn test_bad_format_shape_is_json_error() {
        let doc = json!({"json": {"S": [{"a": 1}]}, "format": {"S": "a"}});
        assert!(matches!(
            split_request_document(doc),
            Err(ConvertError::Json(_))
        ));
    }
}
