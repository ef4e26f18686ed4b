//! Dashboard endpoint.

use axum::extract::State;
use axum::Extension;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionToken};
use crate::dashboard::{self, DashboardData};
use crate::session::ActiveMenu;

/// `GET /api/dashboard`: headline counts, today's schedule, newest patients.
pub async fn overview(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<DashboardData>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let data = {
        let conn = ctx.core.lock_db()?;
        dashboard::fetch_dashboard(&conn, today)?
    };
    ctx.with_session_mut(&token, |s| s.navigate(ActiveMenu::Dashboard))?;
    Ok(Json(data))
}
