use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Instant;
use uuid::Uuid;

use crate::schemas::ErrorResponse;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_BODY_LOG_SIZE: usize = 1024; // 1KB limit for body logging
// Matches axum's default body limit.
const MAX_BUFFERED_BODY: usize = 2 * 1024 * 1024;

/// Logs every request and response, tagging both with an `x-request-id`.
/// The state flag turns on (sanitized) request body logging.
pub async fn request_logger_middleware(
    State(log_body): State<bool>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let request_id_header = HeaderValue::from_str(&request_id).ok();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    if let Some(value) = &request_id_header {
        req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
    }

    if log_body {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_BUFFERED_BODY).await {
            Ok(bytes) => bytes,
            Err(_) => {
                tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    uri = %uri,
                    "Request body too large or failed to read"
                );
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(ErrorResponse {
                        success: false,
                        message: "Request body too large".to_string(),
                        reason: "PayloadTooLarge".to_string(),
                    }),
                )
                    .into_response();
            }
        };

        let sanitized_body = if bytes.len() > MAX_BODY_LOG_SIZE {
            format!("[not logged, {} bytes]", bytes.len())
        } else {
            match serde_json::from_slice::<serde_json::Value>(&bytes) {
                Ok(json) => {
                    let sanitized = crate::utils::sanitize::sanitize_json(&json);
                    serde_json::to_string(&sanitized)
                        .unwrap_or_else(|_| "[invalid json]".to_string())
                }
                Err(_) => format!("[non-json, {} bytes]", bytes.len()),
            }
        };

        tracing::info!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            body_size = bytes.len(),
            body = %sanitized_body,
            "Incoming request"
        );

        req = Request::from_parts(parts, Body::from(bytes));
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            "Incoming request"
        );
    }

    let response = next.run(req).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = latency.as_millis(),
        "Outgoing response"
    );

    let (mut parts, body) = response.into_parts();
    if let Some(value) = request_id_header {
        parts.headers.insert(REQUEST_ID_HEADER, value);
    }

    Response::from_parts(parts, body)
}
