//! API request handlers
//!
//! Handlers for all REST API endpoints. The conversion engine itself knows
//! nothing about HTTP; upload validation and status mapping live here.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ConvertError;
use crate::excel::{convert_from_json, ExcelImporter};
use crate::types::{ConversionResponse, SheetFormat};

use super::server::AppState;

/// Content type of generated workbooks
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Download name of generated workbooks
pub const XLSX_CONTENT_DISPOSITION: &str = "attachment; filename=converted.xlsx";

/// File extensions accepted by the upload endpoint
pub const ACCEPTED_EXTENSIONS: [&str; 2] = [".xlsx", ".xls"];

/// Standard API response wrapper for the info endpoints
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "sheetjson API Server".to_string(),
        version: state.version.clone(),
        description: "Excel ↔ JSON conversion with schema inference".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/api/excel-to-json",
                "POST",
                "Convert an uploaded workbook (multipart field 'file') to JSON data and schema",
            ),
            EndpointInfo::new(
                "/api/json-to-excel",
                "POST",
                "Convert {json, format} to a downloadable .xlsx workbook",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["excel-to-json".to_string(), "json-to-excel".to_string()],
    }))
}

/// HTTP status for a conversion failure: bad input is a client error,
/// anything else is a server failure
pub fn status_for(error: &ConvertError) -> StatusCode {
    match error {
        ConvertError::Parse(_) | ConvertError::EmptyInput(_) | ConvertError::Json(_) => {
            StatusCode::BAD_REQUEST
        }
        ConvertError::Write(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ConvertError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// True if the uploaded file name carries a spreadsheet extension
pub fn has_accepted_extension(file_name: &str) -> bool {
    ACCEPTED_EXTENSIONS
        .iter()
        .any(|ext| file_name.ends_with(ext))
}

fn decline(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ConversionResponse::err(message))).into_response()
}

/// An uploaded workbook: the client-side file name and its bytes
struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

/// Pull the `file` field out of a multipart body
async fn read_upload(multipart: &mut Multipart) -> Result<Option<Upload>, Response> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => {
                return Err(decline(
                    StatusCode::BAD_REQUEST,
                    format!("Malformed upload: {}", e),
                ))
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            decline(StatusCode::BAD_REQUEST, format!("Malformed upload: {}", e))
        })?;

        return Ok(Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }
}

/// POST /api/excel-to-json - Convert an uploaded workbook to JSON + schema
pub async fn excel_to_json(mut multipart: Multipart) -> Response {
    let request_id = Uuid::new_v4();

    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) if !upload.bytes.is_empty() => upload,
        Ok(_) => {
            warn!(%request_id, "excel-to-json: no file supplied");
            return decline(StatusCode::BAD_REQUEST, "File is empty");
        }
        Err(response) => return response,
    };

    let file_name = upload.file_name.unwrap_or_default();
    if !has_accepted_extension(&file_name) {
        warn!(%request_id, file = %file_name, "excel-to-json: rejected file extension");
        return decline(
            StatusCode::BAD_REQUEST,
            "Invalid file format. Only .xlsx and .xls files are supported.",
        );
    }

    match ExcelImporter::new(&upload.bytes).import() {
        Ok(workbook) => {
            info!(
                %request_id,
                file = %file_name,
                sheets = workbook.sheet_count(),
                "excel-to-json: converted"
            );
            (StatusCode::OK, Json(ConversionResponse::ok(workbook))).into_response()
        }
        Err(e) => {
            warn!(%request_id, file = %file_name, error = %e, "excel-to-json: failed");
            decline(status_for(&e), format!("Error processing file: {}", e))
        }
    }
}

/// JSON → Excel request body
#[derive(Deserialize, Default)]
pub struct JsonToExcelRequest {
    /// Sheet name → array of row objects
    #[serde(default, alias = "data")]
    pub json: Value,
    /// Optional explicit header order per sheet
    #[serde(default)]
    pub format: Option<SheetFormat>,
}

/// POST /api/json-to-excel - Convert JSON rows to a downloadable workbook
pub async fn json_to_excel(payload: Result<Json<JsonToExcelRequest>, JsonRejection>) -> Response {
    let request_id = Uuid::new_v4();

    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(%request_id, error = %rejection.body_text(), "json-to-excel: rejected body");
            return decline(
                rejection.status(),
                format!("Invalid request body: {}", rejection.body_text()),
            );
        }
    };

    if req.json.is_null() {
        warn!(%request_id, "json-to-excel: no JSON data supplied");
        return decline(StatusCode::BAD_REQUEST, "No JSON data supplied");
    }

    match convert_from_json(&req.json, req.format.as_ref()) {
        Ok(bytes) => {
            info!(%request_id, bytes = bytes.len(), "json-to-excel: converted");
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE),
                    (header::CONTENT_DISPOSITION, XLSX_CONTENT_DISPOSITION),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            warn!(%request_id, error = %e, "json-to-excel: failed");
            decline(status_for(&e), e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_ok_creates_success_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test data".to_string());

        assert!(response.success);
        assert_eq!(response.data, Some("test data".to_string()));
        assert!(response.error.is_none());
        // Verify UUID format (8-4-4-4-12)
        assert_eq!(response.request_id.len(), 36);
    }

    #[test]
    fn test_accepted_extensions() {
        assert!(has_accepted_extension("report.xlsx"));
        assert!(has_accepted_extension("legacy.xls"));
        assert!(!has_accepted_extension("data.csv"));
        assert!(!has_accepted_extension("xlsx"));
        assert!(!has_accepted_extension(""));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ConvertError::Parse("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ConvertError::EmptyInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ConvertError::Write("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_json_to_excel_request_deserialize() {
        let json = r#"{"json": {"Sheet1": [{"a": 1}]}, "format": {"Sheet1": ["a"]}}"#;
        let req: JsonToExcelRequest = serde_json::from_str(json).unwrap();

        assert!(req.json.is_object());
        assert_eq!(req.format.unwrap()["Sheet1"], vec!["a".to_string()]);
    }

    #[test]
    fn test_json_to_excel_request_data_alias_and_defaults() {
        let json = r#"{"data": {"Sheet1": []}}"#;
        let req: JsonToExcelRequest = serde_json::from_str(json).unwrap();

        assert!(req.json.is_object());
        assert!(req.format.is_none());

        let empty: JsonToExcelRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.json.is_null());
    }

    #[test]
    fn test_version_response_serialize() {
        let response = VersionResponse {
            version: "1.0.0".to_string(),
            features: vec!["excel-to-json".to_string()],
        };
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(json.contains("\"features\":[\"excel-to-json\"]"));
    }
}
