//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::core_state::CoreError;
use crate::db::DatabaseError;
use crate::exam::ExamError;
use crate::report::ReportError;
use crate::uploads::UploadError;
use crate::validation::{SaveError, ValidationError};
use crate::wizard::WizardError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Offending form field, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Account expired")]
    AccountExpired,
    #[error("Administrator role required")]
    Forbidden,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("No patient selected")]
    NoPatientSelected,
    #[error("{0}")]
    WizardState(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, code, message) = match &self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REQUIRED",
                "Authentication required".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid username or password".to_string(),
            ),
            ApiError::AccountExpired => (
                StatusCode::FORBIDDEN,
                "ACCOUNT_EXPIRED",
                "This account has expired".to_string(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Administrator role required".to_string(),
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone()),
            ApiError::Validation(e) => {
                field = Some(e.field());
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION", e.to_string())
            }
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::NoPatientSelected => (
                StatusCode::CONFLICT,
                "NO_PATIENT_SELECTED",
                "Select a patient first".to_string(),
            ),
            ApiError::WizardState(detail) => (StatusCode::CONFLICT, "WIZARD_STATE", detail.clone()),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message, field },
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Database(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            DatabaseError::ConstraintViolation(detail) => ApiError::Conflict(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SaveError> for ApiError {
    fn from(err: SaveError) -> Self {
        match err {
            SaveError::Validation(e) => e.into(),
            SaveError::Storage(e) => e.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::AccountExpired => ApiError::AccountExpired,
            AuthError::Storage(e) => e.into(),
        }
    }
}

impl From<WizardError> for ApiError {
    fn from(err: WizardError) -> Self {
        ApiError::WizardState(err.to_string())
    }
}

impl From<ExamError> for ApiError {
    fn from(err: ExamError) -> Self {
        match err {
            ExamError::NoPatientSelected => ApiError::NoPatientSelected,
            ExamError::PatientNotFound(id) => ApiError::NotFound(format!("patient {id} not found")),
            ExamError::Save(e) => e.into(),
            ExamError::Wizard(e) => e.into(),
            ExamError::Storage(e) => e.into(),
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::PatientNotFound(id) => ApiError::NotFound(format!("patient {id} not found")),
            ReportError::Storage(e) => e.into(),
            ReportError::Pdf(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotFound(name) => ApiError::NotFound(format!("file {name} not found")),
            UploadError::Empty => ApiError::BadRequest("Uploaded file is empty".into()),
            UploadError::InvalidPatientCode(code) => {
                ApiError::Internal(format!("patient code {code:?} cannot own uploads"))
            }
            UploadError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}
