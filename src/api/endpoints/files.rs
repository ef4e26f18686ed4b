//! Patient documents.
//!
//! - `POST /api/patients/:id/files`: multipart upload, one or more `file` fields
//! - `GET /api/patients/:id/files`: stored file names
//! - `GET /api/patients/:id/files/:name`: download

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::uploads;
use crate::validation::join_paths;

/// Largest accepted file, in bytes (25 MB).
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

fn patient_code(ctx: &ApiContext, patient_id: i64) -> Result<String, ApiError> {
    let conn = ctx.core.lock_db()?;
    repository::get_patient(&conn, patient_id)?
        .map(|p| p.patient_code)
        .ok_or_else(|| ApiError::NotFound(format!("patient {patient_id} not found")))
}

#[derive(Serialize)]
pub struct UploadResponse {
    /// Stored paths, in upload order.
    pub paths: Vec<String>,
    /// The same paths joined for a record's path-list field.
    pub joined: String,
}

/// `POST /api/patients/:id/files`
pub async fn upload(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let code = patient_code(&ctx, patient_id)?;

    let mut received = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("document").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file data: {e}")))?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::BadRequest(format!(
                "File too large. Maximum {}MB.",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        received.push((file_name, bytes));
    }

    if received.is_empty() {
        return Err(ApiError::BadRequest("No file provided".into()));
    }

    let upload_dir = ctx.core.config.upload_dir();
    let mut paths = Vec::with_capacity(received.len());
    for (file_name, bytes) in &received {
        let path = uploads::store_upload(&upload_dir, &code, file_name, bytes)?;
        paths.push(path.to_string_lossy().into_owned());
    }

    Ok(Json(UploadResponse {
        joined: join_paths(&paths),
        paths,
    }))
}

#[derive(Serialize)]
pub struct FilesResponse {
    pub patient_id: i64,
    pub files: Vec<String>,
}

/// `GET /api/patients/:id/files`
pub async fn list(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<FilesResponse>, ApiError> {
    let code = patient_code(&ctx, patient_id)?;
    let files = uploads::list_uploads(&ctx.core.config.upload_dir(), &code)?;
    Ok(Json(FilesResponse { patient_id, files }))
}

/// `GET /api/patients/:id/files/:name`: `name` is the original upload name.
pub async fn download(
    State(ctx): State<ApiContext>,
    Path((patient_id, name)): Path<(i64, String)>,
) -> Result<Response, ApiError> {
    let code = patient_code(&ctx, patient_id)?;
    let file = uploads::read_upload(&ctx.core.config.upload_dir(), &code, &name)?;
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
        .into_response())
}
