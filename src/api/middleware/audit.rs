//! Audit logging middleware.
//!
//! Logs every authenticated request with username, method, path and
//! response status. Runs innermost (after auth has injected `Operator`).

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::Operator;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let user = req
        .extensions()
        .get::<Operator>()
        .map(|o| o.0.username.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16();
    if response.status().is_server_error() {
        tracing::warn!(target: "audit", %user, %method, %path, status, "request failed");
    } else {
        tracing::info!(target: "audit", %user, %method, %path, status, "request");
    }

    response
}
