//! Login, logout and the current session.
//!
//! - `POST /api/auth/login`: credentials in, bearer token out (unprotected)
//! - `POST /api/auth/logout`: destroy the session
//! - `GET /api/auth/me`: operator, selected patient, menu and wizard cursor

use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionToken};
use crate::auth::{self, AuthenticatedUser};
use crate::session::{ActiveMenu, SessionContext};
use crate::wizard::ExamStep;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: SessionView,
}

/// Client-facing snapshot of a `SessionContext`.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub user: AuthenticatedUser,
    pub selected_patient: Option<i64>,
    pub active_menu: ActiveMenu,
    pub exam_step: ExamStep,
}

impl From<&SessionContext> for SessionView {
    fn from(s: &SessionContext) -> Self {
        Self {
            session_id: s.session_id,
            user: s.user.clone(),
            selected_patient: s.selected_patient,
            active_menu: s.active_menu,
            exam_step: s.wizard.current(),
        }
    }
}

/// `POST /api/auth/login`
pub async fn login(
    State(ctx): State<ApiContext>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let now = chrono::Local::now().naive_local();
    let user = {
        let conn = ctx.core.lock_db()?;
        auth::authenticate(&conn, &body.username, &body.password, now)
    };

    let user = match user {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(username = %body.username.trim(), reason = %e, "Login rejected");
            return Err(e.into());
        }
    };

    let mut sessions = ctx.core.write_sessions()?;
    let (token, session) = sessions.create(user);
    tracing::info!(
        username = %session.user.username,
        role = %session.user.role,
        session_id = %session.session_id,
        "Operator logged in"
    );

    Ok(Json(LoginResponse {
        session: SessionView::from(session),
        token,
    }))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub status: &'static str,
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<LogoutResponse>, ApiError> {
    let removed = ctx.core.write_sessions()?.remove(&token.0);
    if let Some(session) = removed {
        tracing::info!(username = %session.user.username, "Operator logged out");
    }
    Ok(Json(LogoutResponse { status: "logged_out" }))
}

/// `GET /api/auth/me`
pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<SessionView>, ApiError> {
    ctx.with_session(&token, |s| Json(SessionView::from(s)))
}
