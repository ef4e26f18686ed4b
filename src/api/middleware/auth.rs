//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, looks the token up in the
//! session store, and injects `SessionToken` and `Operator` into request
//! extensions for downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Operator, SessionToken};

/// Require a live session.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_session(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_session_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

/// Token from an `Authorization: Bearer` header, if present.
pub fn bearer_token<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

async fn require_session_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = bearer_token(&req).ok_or(ApiError::Unauthorized)?;

    let user = {
        let sessions = ctx.core.read_sessions()?;
        sessions
            .get(&token)
            .map(|s| s.user.clone())
            .ok_or(ApiError::Unauthorized)?
    }; // RwLockReadGuard dropped here, before any .await

    req.extensions_mut().insert(SessionToken(token));
    req.extensions_mut().insert(Operator(user));

    Ok(next.run(req).await)
}
