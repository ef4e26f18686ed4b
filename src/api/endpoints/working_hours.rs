//! Working hours endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::WorkingHours;

#[derive(Serialize)]
pub struct WorkingDay {
    pub name: &'static str,
    #[serde(flatten)]
    pub hours: WorkingHours,
}

#[derive(Serialize)]
pub struct WorkingHoursResponse {
    pub days: Vec<WorkingDay>,
}

/// `GET /api/working-hours`: the seven weekday rows, Monday first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<WorkingHoursResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let days = repository::get_working_hours(&conn)?
        .into_iter()
        .map(|hours| WorkingDay {
            name: hours.weekday_name(),
            hours,
        })
        .collect();
    Ok(Json(WorkingHoursResponse { days }))
}
