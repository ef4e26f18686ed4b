//! Examination wizard endpoints.
//!
//! Every form screen posts to its own route; the wizard cursor lives in the
//! caller's session. All routes act on the selected patient.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionToken};
use crate::exam::{self, StepForm, StepOutcome};
use crate::models::*;
use crate::report::{self, ExamReport};
use crate::wizard::ExamStep;

#[derive(Serialize)]
pub struct ExamStatus {
    pub patient_id: Option<i64>,
    pub step: ExamStep,
    /// 1-based position among the eight wizard states.
    pub position: usize,
    pub total_steps: usize,
}

fn status_of(patient_id: Option<i64>, step: ExamStep) -> ExamStatus {
    ExamStatus {
        patient_id,
        step,
        position: step.position() + 1,
        total_steps: ExamStep::SEQUENCE.len(),
    }
}

/// `GET /api/exam`: where the wizard currently is.
pub async fn status(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<ExamStatus>, ApiError> {
    ctx.with_session(&token, |s| Json(status_of(s.selected_patient, s.wizard.current())))
}

/// `POST /api/exam/start`
pub async fn start(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<ExamStatus>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let status = ctx.with_session_mut(&token, |s| {
        exam::start_exam(&conn, s).map(|step| status_of(s.selected_patient, step))
    })??;
    Ok(Json(status))
}

fn save_step(ctx: &ApiContext, token: &SessionToken, form: StepForm) -> Result<Json<StepOutcome>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let outcome = ctx.with_session_mut(token, |s| exam::submit_step(&conn, s, &form))??;
    Ok(Json(outcome))
}

/// `POST /api/exam/medical-history`
pub async fn medical_history(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Json(form): Json<NewMedicalHistory>,
) -> Result<Json<StepOutcome>, ApiError> {
    save_step(&ctx, &token, StepForm::MedicalHistory(form))
}

/// `POST /api/exam/refraction`
pub async fn refraction(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Json(form): Json<NewRefraction>,
) -> Result<Json<StepOutcome>, ApiError> {
    save_step(&ctx, &token, StepForm::Refraction(form))
}

/// `POST /api/exam/functional-tests`
pub async fn functional_tests(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Json(form): Json<NewFunctionalTest>,
) -> Result<Json<StepOutcome>, ApiError> {
    save_step(&ctx, &token, StepForm::FunctionalTests(form))
}

/// `POST /api/exam/anterior-segment`
pub async fn anterior_segment(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Json(form): Json<NewAnteriorSegment>,
) -> Result<Json<StepOutcome>, ApiError> {
    save_step(&ctx, &token, StepForm::AnteriorSegment(form))
}

/// `POST /api/exam/fundus`
pub async fn fundus(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Json(form): Json<NewFundus>,
) -> Result<Json<StepOutcome>, ApiError> {
    save_step(&ctx, &token, StepForm::Fundus(form))
}

/// `POST /api/exam/groups`
pub async fn groups(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
    Json(form): Json<NewGroupAssignment>,
) -> Result<Json<StepOutcome>, ApiError> {
    save_step(&ctx, &token, StepForm::Groups(form))
}

fn build_report(ctx: &ApiContext, token: &SessionToken) -> Result<ExamReport, ApiError> {
    let conn = ctx.core.lock_db()?;
    let patient_id = ctx
        .with_session(token, |s| s.selected_patient)?
        .ok_or(ApiError::NoPatientSelected)?;
    Ok(report::build_exam_report(&conn, patient_id)?)
}

/// `GET /api/exam/report`: latest record of every stage for the selected patient.
pub async fn report_view(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<ExamReport>, ApiError> {
    Ok(Json(build_report(&ctx, &token)?))
}

/// `GET /api/exam/report.pdf`
pub async fn report_pdf(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
) -> Result<Response, ApiError> {
    let report = build_report(&ctx, &token)?;
    let bytes = report::render_report_pdf(&report)?;
    let file_name = format!(
        "{}_exam_{}.pdf",
        report.patient.patient_code,
        report.generated_at.format("%Y%m%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("inline; filename=\"{file_name}\"")),
        ],
        bytes,
    )
        .into_response())
}

/// `POST /api/exam/finish`: completion action of the report screen.
pub async fn finish(
    State(ctx): State<ApiContext>,
    Extension(token): Extension<SessionToken>,
) -> Result<Json<ExamStatus>, ApiError> {
    let status = ctx.with_session_mut(&token, |s| {
        exam::finish_exam(s).map(|()| status_of(s.selected_patient, s.wizard.current()))
    })??;
    Ok(Json(status))
}
