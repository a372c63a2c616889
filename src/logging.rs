//! Middleware for logging requests and responses.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::endpoints;

const LOG_BODY_LENGTH_LIMIT: usize = 256;

/// Log the request and response for each request.
///
/// Both are logged at the `info` level; bodies longer than
/// [LOG_BODY_LENGTH_LIMIT] bytes are truncated and logged in full at the
/// `debug` level. Bodies sent to the auth endpoints contain credentials and
/// are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = extract_parts_and_body_text_from_request(request).await;

    let is_auth_request =
        parts.uri.path() == endpoints::SIGN_UP || parts.uri.path() == endpoints::LOG_IN;

    if is_auth_request {
        tracing::info!("Received request: {} {} <credentials redacted>", parts.method, parts.uri);
    } else {
        log_body(
            &format!("Received request: {} {}", parts.method, parts.uri),
            &body_text,
        );
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = extract_parts_and_body_text_from_response(response).await;
    log_body(&format!("Sending response: {}", parts.status), &body_text);

    Response::from_parts(parts, body_text.into())
}

async fn extract_parts_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_parts_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

fn log_body(prefix: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!("{prefix}\nbody: {}...", &body[..LOG_BODY_LENGTH_LIMIT]);
        tracing::debug!("Full body: {body:?}");
    } else if body.is_empty() {
        tracing::info!("{prefix}");
    } else {
        tracing::info!("{prefix}\nbody: {body:?}");
    }
}
