//! sheetjson API Server binary
//!
//! HTTP REST API for Excel ↔ JSON conversion.

use clap::Parser;
use sheetjson::api::{run_api_server, server::ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "sheetjson-server")]
#[command(version)]
#[command(about = "sheetjson API Server - HTTP REST API for Excel ↔ JSON conversion")]
#[command(long_about = r#"
sheetjson API Server - HTTP REST API

Conversion endpoints:
  - POST /api/excel-to-json - Upload a workbook (multipart field "file"),
                              get {data, schema} JSON back
  - POST /api/json-to-excel - Send {"json": {...}, "format": {...}},
                              get converted.xlsx back

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - Tracing and structured logging (RUST_LOG)

Example usage:
  sheetjson-server                           # Start on localhost:8080
  sheetjson-server --host 0.0.0.0 --port 3000

  curl -F "file=@people.xlsx" http://localhost:8080/api/excel-to-json
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETJSON_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SHEETJSON_PORT")]
    port: u16,

    /// Maximum upload size in megabytes
    #[arg(long, default_value = "10", env = "SHEETJSON_MAX_UPLOAD_MB")]
    max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        max_upload_bytes: args.max_upload_mb.saturating_mul(1024 * 1024),
    };

    run_api_server(config).await
}
