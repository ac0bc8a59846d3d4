//! API integration tests
//!
//! Requests are driven through the router in-process with `tower::ServiceExt`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sheetjson::api::build_router;
use sheetjson::api::handlers::{XLSX_CONTENT_DISPOSITION, XLSX_CONTENT_TYPE};
use sheetjson::api::server::ApiConfig;
use sheetjson::excel::convert_from_json;
use sheetjson::{convert_to_json, ConversionResponse};
use tower::ServiceExt;

const BOUNDARY: &str = "sheetjson-test-boundary";

fn app() -> Router {
    build_router(&ApiConfig::default())
}

fn people() -> Value {
    json!({
        "Sheet1": [
            {"Name": "John Doe", "Age": 30, "Email": "john@example.com"},
            {"Name": "Jane Smith", "Age": 25, "Email": "jane@example.com"}
        ]
    })
}

fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/excel-to-json")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, file_name, content)))
        .unwrap()
}

fn json_request(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn send(request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

async fn send_for_conversion(request: Request<Body>) -> (StatusCode, ConversionResponse) {
    let (status, _, body) = send(request).await;
    let response: ConversionResponse = serde_json::from_slice(&body).unwrap();
    (status, response)
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _, body) = send(request).await;
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], json!(true));
    assert_eq!(json["data"]["status"], json!("healthy"));
}

#[tokio::test]
async fn test_version_lists_conversions() {
    let request = Request::builder().uri("/version").body(Body::empty()).unwrap();
    let (status, _, body) = send(request).await;
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["data"]["features"],
        json!(["excel-to-json", "json-to-excel"])
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// EXCEL → JSON
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_excel_to_json_success() {
    let bytes = convert_from_json(&people(), None).unwrap();
    let (status, response) = send_for_conversion(upload_request("file", "people.xlsx", &bytes)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(response.error.is_none());
    assert_eq!(response.data.unwrap(), people());
    assert_eq!(
        response.schema.unwrap()["Sheet1"]["Age"],
        json!({"type": "number", "mandatory": true})
    );
}

#[tokio::test]
async fn test_excel_to_json_rejects_extension() {
    let bytes = convert_from_json(&people(), None).unwrap();
    let (status, response) = send_for_conversion(upload_request("file", "people.csv", &bytes)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.data.is_none());
    assert_eq!(
        response.error.unwrap(),
        "Invalid file format. Only .xlsx and .xls files are supported."
    );
}

#[tokio::test]
async fn test_excel_to_json_empty_file() {
    let (status, response) = send_for_conversion(upload_request("file", "empty.xlsx", b"")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error.unwrap(), "File is empty");
}

#[tokio::test]
async fn test_excel_to_json_missing_file_field() {
    let (status, response) =
        send_for_conversion(upload_request("attachment", "people.xlsx", b"data")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error.unwrap(), "File is empty");
}

#[tokio::test]
async fn test_excel_to_json_malformed_workbook() {
    let (status, response) =
        send_for_conversion(upload_request("file", "broken.xlsx", b"not a workbook")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.data.is_none());
    assert!(response
        .error
        .unwrap()
        .starts_with("Error processing file: Parse error"));
}

// ═══════════════════════════════════════════════════════════════════════════
// JSON → EXCEL
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_json_to_excel_returns_workbook() {
    let payload = json!({
        "json": people(),
        "format": {"Sheet1": ["Email", "Name", "Age"]}
    });
    let (status, headers, body) = send(json_request("/api/json-to-excel", &payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
    assert_eq!(headers[header::CONTENT_DISPOSITION], XLSX_CONTENT_DISPOSITION);

    let data = convert_to_json(&body).data.unwrap();
    let first = data["Sheet1"][0].as_object().unwrap();
    let keys: Vec<&str> = first.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Email", "Name", "Age"]);
}

#[tokio::test]
async fn test_json_to_excel_missing_json() {
    let (status, response) =
        send_for_conversion(json_request("/api/json-to-excel", &json!({"format": {}}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error.unwrap(), "No JSON data supplied");
}

#[tokio::test]
async fn test_json_to_excel_malformed_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/json-to-excel")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, response) = send_for_conversion(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.data.is_none());
    assert!(response.error.unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_json_to_excel_without_json_content_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/json-to-excel")
        .body(Body::from(people().to_string()))
        .unwrap();
    let (status, response) = send_for_conversion(request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(response.error.unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_json_to_excel_no_sheets() {
    let payload = json!({"json": {"Sheet1": []}});
    let (status, response) = send_for_conversion(json_request("/api/json-to-excel", &payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.error.unwrap().starts_with("Empty input"));
}

#[tokio::test]
async fn test_json_to_excel_invalid_sheet_name() {
    let payload = json!({"json": {"bad/name": [{"a": 1}]}});
    let (status, response) = send_for_conversion(json_request("/api/json-to-excel", &payload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.error.unwrap().starts_with("Write error"));
}
