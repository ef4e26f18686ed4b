//! Appointment endpoints.
//!
//! - `POST /api/appointments`: book
//! - `GET /api/appointments?date=`: one day's schedule (default today)
//! - `POST /api/appointments/:id/status`: change status
//! - `GET /api/appointments/slots?date=`: free slots

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionToken};
use crate::db::repository;
use crate::models::enums::AppointmentStatus;
use crate::models::{Appointment, NewAppointment};
use crate::scheduling::{self, DaySlots};
use crate::session::ActiveMenu;

#[derive(Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

impl DateQuery {
    fn date_or_today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

/// `POST /api/appointments`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(form): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let conn = ctx.core.lock_db()?;
    if repository::get_patient(&conn, form.patient_id)?.is_none() {
        return Err(ApiError::NotFound(format!("patient {} not found", form.patient_id)));
    }
    let appointment = scheduling::create_appointment(&conn, &form)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub date: NaiveDate,
    pub appointments: Vec<Appointment>,
}

/// `GET /api/appointments`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Query(query): Query<DateQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let date = query.date_or_today();
    let appointments = {
        let conn = ctx.core.lock_db()?;
        repository::list_appointments_for_date(&conn, date)?
    };
    ctx.with_session_mut(&token, |s| s.navigate(ActiveMenu::Appointments))?;
    Ok(Json(AppointmentsResponse { date, appointments }))
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: AppointmentStatus,
}

/// `POST /api/appointments/:id/status`
pub async fn set_status(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(scheduling::set_appointment_status(&conn, id, body.status)?))
}

/// `GET /api/appointments/slots`
pub async fn slots(
    State(ctx): State<ApiContext>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DaySlots>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let day = scheduling::available_slots_on(&conn, query.date_or_today(), ctx.core.config.slot_minutes)?;
    Ok(Json(day))
}
