use clap::{Parser, Subcommand};
use sheetjson::api::{run_api_server, server::ApiConfig};
use sheetjson::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetjson")]
#[command(about = "Convert Excel workbooks to JSON (with inferred schema) and back.")]
#[command(long_about = "sheetjson - Excel ↔ JSON conversion with schema inference

COMMANDS:
  to-json   - Workbook (.xlsx/.xls/.ods) to {data, schema} JSON
  to-excel  - {sheet: [rows]} JSON to .xlsx
  serve     - Run the HTTP API server

SCHEMA:
  Every field gets a type (string, number, boolean, date) and a
  mandatory flag (true when no row leaves it empty).

EXAMPLES:
  sheetjson to-json people.xlsx                      # Print JSON to stdout
  sheetjson to-json people.xlsx -o people.json
  sheetjson to-excel people.json people.xlsx -f order.json
  sheetjson serve --port 3000")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Convert a workbook to JSON data plus an inferred schema.

Row 0 of every sheet is the header row; each following row becomes one
JSON object keyed by header. Output shape:

  {
    \"data\":   { \"Sheet1\": [ {\"Name\": \"John Doe\", \"Age\": 30}, ... ] },
    \"schema\": { \"Sheet1\": { \"Age\": {\"type\": \"number\", \"mandatory\": true} } }
  }

Dates are written as ISO-8601 text, formulas as their source text.")]
    /// Convert a workbook to JSON data and schema
    ToJson {
        /// Path to workbook (.xlsx, .xlsm, .xlsb, .xls, .ods)
        input: PathBuf,

        /// Write JSON to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit compact JSON instead of pretty-printed
        #[arg(short, long)]
        compact: bool,

        /// Show verbose conversion steps (on stderr)
        #[arg(short, long)]
        verbose: bool,
    },

    #[command(long_about = "Convert JSON rows to an .xlsx workbook.

INPUT:
  Either a bare object of sheets:
    {\"Sheet1\": [{\"Name\": \"John\", \"Age\": 30}]}
  or a request document:
    {\"json\": {...}, \"format\": {\"Sheet1\": [\"Name\", \"Age\"]}}

Only entries holding a non-empty array become sheets. Columns follow the
format list for that sheet if given, otherwise the first row's key order.")]
    /// Convert JSON rows to an .xlsx workbook
    ToExcel {
        /// Path to JSON file
        input: PathBuf,

        /// Output Excel file path (.xlsx)
        output: PathBuf,

        /// JSON file mapping sheet name → ordered header list
        #[arg(short, long)]
        format: Option<PathBuf>,

        /// Show verbose conversion steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the HTTP API server
    Serve {
        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETJSON_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "SHEETJSON_PORT")]
        port: u16,

        /// Maximum upload size in megabytes
        #[arg(long, default_value = "10", env = "SHEETJSON_MAX_UPLOAD_MB")]
        max_upload_mb: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::ToJson {
            input,
            output,
            compact,
            verbose,
        } => cli::to_json(input, output, compact, verbose)?,

        Commands::ToExcel {
            input,
            output,
            format,
            verbose,
        } => cli::to_excel(input, output, format, verbose)?,

        Commands::Serve {
            host,
            port,
            max_upload_mb,
        } => {
            let config = ApiConfig {
                host,
                port,
                max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            };
            tokio::runtime::Runtime::new()?.block_on(run_api_server(config))?;
        }
    }

    Ok(())
}
