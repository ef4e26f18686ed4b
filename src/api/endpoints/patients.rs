//! Patient registration, lookup and selection.
//!
//! - `POST /api/patients`: register
//! - `GET /api/patients?q=&limit=&offset=`: list, or search by code/name
//! - `GET /api/patients/:id`: one patient
//! - `POST /api/patients/:id/select`: make the patient current for this session
//! - `GET /api/patients/:id/history`: every stored record for the patient

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::endpoints::auth::SessionView;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionToken};
use crate::db::repository;
use crate::models::*;
use crate::session::ActiveMenu;
use crate::validation::submit;

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 500;

fn find_patient(conn: &rusqlite::Connection, id: i64) -> Result<Patient, ApiError> {
    repository::get_patient(conn, id)?.ok_or_else(|| ApiError::NotFound(format!("patient {id} not found")))
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(form): Json<NewPatient>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let conn = ctx.core.lock_db()?;
    let id = submit(&conn, &form, repository::insert_patient)?;
    let patient = find_patient(&conn, id)?;
    tracing::info!(patient_id = id, code = %patient.patient_code, "Patient registered");
    Ok((StatusCode::CREATED, Json(patient)))
}

#[derive(Deserialize)]
pub struct PatientQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<Patient>,
    pub total: i64,
}

/// `GET /api/patients`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<PatientsResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let response = {
        let conn = ctx.core.lock_db()?;
        let patients = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => repository::search_patients(&conn, q, limit)?,
            None => repository::list_patients(&conn, limit, query.offset.unwrap_or(0))?,
        };
        PatientsResponse {
            patients,
            total: repository::count_patients(&conn)?,
        }
    };
    ctx.with_session_mut(&token, |s| s.navigate(ActiveMenu::Patients))?;
    Ok(Json(response))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(find_patient(&conn, id)?))
}

/// `POST /api/patients/:id/select`
pub async fn select(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Path(id): Path<i64>,
) -> Result<Json<SessionView>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let patient = find_patient(&conn, id)?;
    let view = ctx.with_session_mut(&token, |s| {
        s.select_patient(patient.id);
        s.navigate(ActiveMenu::Patients);
        SessionView::from(&*s)
    })?;
    tracing::debug!(patient_id = id, user = %view.user.username, "Patient selected");
    Ok(Json(view))
}

#[derive(Serialize)]
pub struct PatientHistory {
    pub patient: Patient,
    pub medical_history: Vec<MedicalHistoryEntry>,
    pub refraction: Vec<RefractionExam>,
    pub functional_tests: Vec<FunctionalTestEntry>,
    pub anterior_segment: Vec<AnteriorSegmentExam>,
    pub fundus: Vec<FundusExam>,
    pub groups: Vec<GroupAssignment>,
    pub contact_lenses: Vec<ContactLensPrescription>,
    pub appointments: Vec<Appointment>,
}

/// `GET /api/patients/:id/history`: all rows, newest first per table.
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<PatientHistory>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let patient = find_patient(&conn, id)?;
    Ok(Json(PatientHistory {
        medical_history: repository::list_medical_history_for_patient(&conn, id)?,
        refraction: repository::list_refraction_for_patient(&conn, id)?,
        functional_tests: repository::list_functional_test_for_patient(&conn, id)?,
        anterior_segment: repository::list_anterior_segment_for_patient(&conn, id)?,
        fundus: repository::list_fundus_for_patient(&conn, id)?,
        groups: repository::list_group_assignment_for_patient(&conn, id)?,
        contact_lenses: repository::list_contact_lens_for_patient(&conn, id)?,
        appointments: repository::list_appointments_for_patient(&conn, id)?,
        patient,
    }))
}
