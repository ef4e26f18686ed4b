//! Form validation at the submission boundary.
//!
//! The record store accepts whatever it is given; every range and required
//! field check lives here, on the form types, and runs before the insert.
//! A save therefore fails in exactly one of two ways, captured by [`SaveError`].

use rusqlite::Connection;

use crate::db::DatabaseError;

/// Delimiter used when a list of file paths is stored in a single column.
pub const PATH_DELIMITER: char = ';';

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field } | Self::OutOfRange { field, .. } | Self::Invalid { field, .. } => {
                field
            }
        }
    }
}

/// Outcome of a failed form submission.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Implemented by every submitted form.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Validate `form`, then hand it to `insert`. Nothing is written when validation fails.
pub fn submit<F, T>(
    conn: &Connection,
    form: &F,
    insert: impl FnOnce(&Connection, &F) -> Result<T, DatabaseError>,
) -> Result<T, SaveError>
where
    F: Validate,
{
    form.validate()?;
    Ok(insert(conn, form)?)
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

pub fn check_range(
    field: &'static str,
    value: Option<f64>,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || v < min || v > max => Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value: v,
        }),
        _ => Ok(()),
    }
}

/// Cylinder axis, in degrees.
pub fn check_axis(field: &'static str, value: Option<i32>) -> Result<(), ValidationError> {
    check_range(field, value.map(f64::from), 0.0, 180.0)
}

pub fn check_sphere(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    check_range(field, value, -30.0, 30.0)
}

pub fn check_cylinder(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    check_range(field, value, -15.0, 15.0)
}

/// Patient codes are ASCII letters, digits and '-'. Uploads are stored as
/// `<code>_<name>`, so a code can never contain the separator.
pub fn is_patient_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

pub fn check_patient_code(field: &'static str, code: &str) -> Result<(), ValidationError> {
    require(field, code)?;
    if !is_patient_code(code) {
        return Err(ValidationError::Invalid {
            field,
            reason: "only letters, digits and '-' are allowed".into(),
        });
    }
    Ok(())
}

/// Stored paths are joined with [`PATH_DELIMITER`], so none may contain it.
pub fn check_paths(field: &'static str, paths: &[String]) -> Result<(), ValidationError> {
    for path in paths {
        if path.trim().is_empty() {
            return Err(ValidationError::Invalid {
                field,
                reason: "empty path".into(),
            });
        }
        if path.contains(PATH_DELIMITER) {
            return Err(ValidationError::Invalid {
                field,
                reason: format!("path may not contain '{PATH_DELIMITER}'"),
            });
        }
    }
    Ok(())
}

/// Join paths for storage in a single column.
pub fn join_paths(paths: &[String]) -> String {
    paths.join(&PATH_DELIMITER.to_string())
}

/// Inverse of [`join_paths`]. An empty column yields no paths.
pub fn split_paths(stored: &str) -> Vec<String> {
    stored
        .split(PATH_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
