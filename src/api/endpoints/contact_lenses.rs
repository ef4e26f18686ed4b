//! Contact lens prescriptions.
//!
//! - `POST /api/contact-lenses`: prescribe for the selected patient
//! - `GET /api/patients/:id/contact-lenses`: prescriptions, newest first

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionToken};
use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::{ContactLensPrescription, NewContactLens};
use crate::session::ActiveMenu;
use crate::validation::submit;

/// `POST /api/contact-lenses`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Json(form): Json<NewContactLens>,
) -> Result<(StatusCode, Json<ContactLensPrescription>), ApiError> {
    let conn = ctx.core.lock_db()?;
    let patient_id = ctx
        .with_session_mut(&token, |s| {
            s.navigate(ActiveMenu::ContactLenses);
            s.selected_patient
        })?
        .ok_or(ApiError::NoPatientSelected)?;
    if repository::get_patient(&conn, patient_id)?.is_none() {
        return Err(ApiError::NotFound(format!("patient {patient_id} not found")));
    }

    let id = submit(&conn, &form, |c, f| repository::insert_contact_lens(c, patient_id, f))?;
    let saved = repository::get_contact_lens(&conn, id)?
        .ok_or_else(|| DatabaseError::not_found("contact_lens_prescription", id))?;
    tracing::info!(patient_id, prescription_id = id, lens_type = %form.lens_type, "Contact lens prescribed");
    Ok((StatusCode::CREATED, Json(saved)))
}

#[derive(Serialize)]
pub struct PrescriptionsResponse {
    pub patient_id: i64,
    pub prescriptions: Vec<ContactLensPrescription>,
}

/// `GET /api/patients/:id/contact-lenses`
pub async fn list_for_patient(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<PrescriptionsResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    if repository::get_patient(&conn, patient_id)?.is_none() {
        return Err(ApiError::NotFound(format!("patient {patient_id} not found")));
    }
    Ok(Json(PrescriptionsResponse {
        patient_id,
        prescriptions: repository::list_contact_lens_for_patient(&conn, patient_id)?,
    }))
}
