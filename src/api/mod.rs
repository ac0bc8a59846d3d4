//! sheetjson API Server module
//!
//! HTTP transport for the conversion engine.
//! Run with `sheetjson serve` or `sheetjson-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server};
