use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::validation::{check_paths, Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalHistoryEntry {
    pub id: i64,
    pub patient_id: i64,
    pub general_health: Option<String>,
    pub medications: Option<String>,
    pub allergies: Option<String>,
    pub family_history: Option<String>,
    pub previous_eye_surgery: Option<String>,
    pub ocular_history: Option<String>,
    /// Uploaded earlier reports, as stored file paths.
    pub previous_reports: Vec<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMedicalHistory {
    pub general_health: Option<String>,
    pub medications: Option<String>,
    pub allergies: Option<String>,
    pub family_history: Option<String>,
    pub previous_eye_surgery: Option<String>,
    pub ocular_history: Option<String>,
    #[serde(default)]
    pub previous_reports: Vec<String>,
    pub notes: Option<String>,
}

impl Validate for NewMedicalHistory {
    fn validate(&self) -> Result<(), ValidationError> {
        check_paths("previous_reports", &self.previous_reports)
    }
}
