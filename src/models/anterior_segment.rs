use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::validation::{Validate, ValidationError};

/// Slit-lamp findings, per eye.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnteriorSegmentExam {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub values: NewAnteriorSegment,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAnteriorSegment {
    pub lids_od: Option<String>,
    pub lids_os: Option<String>,
    pub conjunctiva_od: Option<String>,
    pub conjunctiva_os: Option<String>,
    pub cornea_od: Option<String>,
    pub cornea_os: Option<String>,
    pub anterior_chamber_od: Option<String>,
    pub anterior_chamber_os: Option<String>,
    pub iris_od: Option<String>,
    pub iris_os: Option<String>,
    pub lens_od: Option<String>,
    pub lens_os: Option<String>,
    pub notes: Option<String>,
}

// Free-text findings only.
impl Validate for NewAnteriorSegment {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
