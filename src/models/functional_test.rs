use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::validation::{check_range, Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionalTestEntry {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub values: NewFunctionalTest,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewFunctionalTest {
    /// Intraocular pressure, mmHg.
    pub iop_od: Option<f64>,
    pub iop_os: Option<f64>,
    pub tonometry_method: Option<String>,
    pub color_vision: Option<String>,
    pub stereopsis: Option<String>,
    pub visual_field: Option<String>,
    pub cover_test: Option<String>,
    pub notes: Option<String>,
}

impl Validate for NewFunctionalTest {
    fn validate(&self) -> Result<(), ValidationError> {
        check_range("iop_od", self.iop_od, 0.0, 80.0)?;
        check_range("iop_os", self.iop_os, 0.0, 80.0)
    }
}
