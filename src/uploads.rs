//! Patient document storage on the local filesystem.
//!
//! Files land in the upload directory as `<patient_code>_<file_name>`. Patient
//! codes never contain '_' (see `validation::is_patient_code`), so the first
//! '_' always ends the owner prefix. The same name uploaded twice for the same
//! patient overwrites the earlier file.
//! Records refer to uploads by stored path (see `validation::join_paths`).

use std::path::{Path, PathBuf};

use crate::validation::is_patient_code;

const MAX_NAME_CHARS: usize = 100;
const FALLBACK_NAME: &str = "document";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Empty upload")]
    Empty,

    #[error("Patient code {0:?} cannot own uploads")]
    InvalidPatientCode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloaded file with its guessed content type.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Reduces a client-supplied name to a safe final path component.
pub fn sanitize_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let sanitized: String = last
        .chars()
        .filter(|&c| c != '\0')
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_CHARS)
        .collect();

    let sanitized = sanitized.replace("..", "");
    if sanitized.is_empty() || sanitized == "." {
        FALLBACK_NAME.into()
    } else {
        sanitized
    }
}

fn owner_prefix(patient_code: &str) -> Result<String, UploadError> {
    if !is_patient_code(patient_code) {
        return Err(UploadError::InvalidPatientCode(patient_code.to_string()));
    }
    Ok(format!("{patient_code}_"))
}

/// On-disk name for a patient's upload.
pub fn stored_file_name(patient_code: &str, file_name: &str) -> Result<String, UploadError> {
    Ok(format!("{}{}", owner_prefix(patient_code)?, sanitize_filename(file_name)))
}

pub fn store_upload(
    upload_dir: &Path,
    patient_code: &str,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, UploadError> {
    let stored = stored_file_name(patient_code, file_name)?;
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    std::fs::create_dir_all(upload_dir)?;

    let path = upload_dir.join(stored);
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), size = bytes.len(), "Upload stored");
    Ok(path)
}

/// Reads back a file stored for `patient_code` under its original name.
pub fn read_upload(upload_dir: &Path, patient_code: &str, file_name: &str) -> Result<StoredFile, UploadError> {
    let stored = stored_file_name(patient_code, file_name)?;
    let path = upload_dir.join(&stored);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(UploadError::NotFound(stored));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(StoredFile {
        content_type: mime_guess::from_path(&path).first_or_octet_stream().to_string(),
        file_name: stored,
        bytes,
    })
}

/// Stored file names belonging to `patient_code`, sorted.
pub fn list_uploads(upload_dir: &Path, patient_code: &str) -> Result<Vec<String>, UploadError> {
    let prefix = owner_prefix(patient_code)?;
    let entries = match std::fs::read_dir(upload_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(&prefix) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_under_patient_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_upload(dir.path(), "P-0001", "scan.pdf", b"%PDF-1.4").unwrap();
        assert_eq!(path, dir.path().join("P-0001_scan.pdf"));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn same_name_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        store_upload(dir.path(), "P-0001", "fundus.jpg", b"first").unwrap();
        let path = store_upload(dir.path(), "P-0001", "fundus.jpg", b"second").unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"second");
        assert_eq!(list_uploads(dir.path(), "P-0001").unwrap(), vec!["P-0001_fundus.jpg"]);
    }

    #[test]
    fn path_components_are_stripped() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\scans\\left eye.png"), "left_eye.png");
        assert_eq!(sanitize_filename("reports/"), "document");
        assert_eq!(sanitize_filename(".."), "document");
    }

    #[test]
    fn long_names_truncated() {
        let name = format!("{}.pdf", "a".repeat(300));
        assert_eq!(sanitize_filename(&name).chars().count(), MAX_NAME_CHARS);
    }

    #[test]
    fn read_guesses_content_type() {
        let dir = tempfile::tempdir().unwrap();
        store_upload(dir.path(), "P-0001", "report.pdf", b"%PDF").unwrap();

        let file = read_upload(dir.path(), "P-0001", "report.pdf").unwrap();
        assert_eq!(file.content_type, "application/pdf");
        assert_eq!(file.bytes, b"%PDF");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_upload(dir.path(), "P-0001", "nope.png").unwrap_err();
        assert!(matches!(err, UploadError::NotFound(_)));
    }

    #[test]
    fn empty_upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            store_upload(dir.path(), "P-0001", "x.txt", b"").unwrap_err(),
            UploadError::Empty
        ));
    }

    #[test]
    fn listing_is_scoped_to_patient() {
        let dir = tempfile::tempdir().unwrap();
        store_upload(dir.path(), "P-0001", "a.pdf", b"1").unwrap();
        store_upload(dir.path(), "P-0002", "b.pdf", b"2").unwrap();
        assert_eq!(list_uploads(dir.path(), "P-0002").unwrap(), vec!["P-0002_b.pdf"]);
        assert!(list_uploads(&dir.path().join("missing"), "P-0001").unwrap().is_empty());
    }

    #[test]
    fn codes_sharing_a_prefix_stay_separate() {
        let dir = tempfile::tempdir().unwrap();
        store_upload(dir.path(), "P-1", "a.pdf", b"one").unwrap();
        store_upload(dir.path(), "P-12", "x.pdf", b"twelve").unwrap();
        assert_eq!(list_uploads(dir.path(), "P-1").unwrap(), vec!["P-1_a.pdf"]);
        assert!(matches!(
            read_upload(dir.path(), "P-1", "2_x.pdf").unwrap_err(),
            UploadError::NotFound(_)
        ));
    }

    #[test]
    fn codes_that_could_collide_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        for code in ["A/1", "B\\1", "P-1_2", ""] {
            assert!(matches!(
                store_upload(dir.path(), code, "scan.pdf", b"x").unwrap_err(),
                UploadError::InvalidPatientCode(_)
            ));
            assert!(matches!(
                list_uploads(dir.path(), code).unwrap_err(),
                UploadError::InvalidPatientCode(_)
            ));
        }
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
