use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::validation::{check_paths, check_range, Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundusExam {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub values: NewFundus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewFundus {
    pub optic_disc_od: Option<String>,
    pub optic_disc_os: Option<String>,
    pub cup_disc_ratio_od: Option<f64>,
    pub cup_disc_ratio_os: Option<f64>,
    pub macula_od: Option<String>,
    pub macula_os: Option<String>,
    pub vessels_od: Option<String>,
    pub vessels_os: Option<String>,
    pub periphery_od: Option<String>,
    pub periphery_os: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub notes: Option<String>,
}

impl Validate for NewFundus {
    fn validate(&self) -> Result<(), ValidationError> {
        check_range("cup_disc_ratio_od", self.cup_disc_ratio_od, 0.0, 1.0)?;
        check_range("cup_disc_ratio_os", self.cup_disc_ratio_os, 0.0, 1.0)?;
        check_paths("images", &self.images)
    }
}
