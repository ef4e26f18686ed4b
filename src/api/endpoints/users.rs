//! Operator accounts (administrators only).
//!
//! - `POST /api/users`: create an account
//! - `GET /api/users`: list accounts

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Operator, SessionToken};
use crate::auth;
use crate::db::repository;
use crate::models::enums::UserRole;
use crate::models::User;
use crate::session::ActiveMenu;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub expires_at: Option<NaiveDateTime>,
}

#[derive(Serialize)]
pub struct CreateUserResponse {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

/// `POST /api/users`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(operator): Extension<Operator>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    operator.require_admin()?;

    let conn = ctx.core.lock_db()?;
    let id = auth::create_user(&conn, &body.username, &body.password, body.role, body.expires_at)?;
    tracing::info!(
        created_by = %operator.0.username,
        username = %body.username.trim(),
        role = %body.role,
        "Operator account created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            id,
            username: body.username.trim().to_string(),
            role: body.role,
        }),
    ))
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

/// `GET /api/users`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(operator): Extension<Operator>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<UsersResponse>, ApiError> {
    operator.require_admin()?;
    let users = {
        let conn = ctx.core.lock_db()?;
        repository::list_users(&conn)?
    };
    ctx.with_session_mut(&token, |s| s.navigate(ActiveMenu::Settings))?;
    Ok(Json(UsersResponse { users }))
}
