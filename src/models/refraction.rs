use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::validation::{check_axis, check_cylinder, check_range, check_sphere, Validate, ValidationError};

/// Refraction stage of the examination. `_od` = right eye, `_os` = left eye.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefractionExam {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub values: NewRefraction,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewRefraction {
    pub va_uncorrected_od: Option<String>,
    pub va_uncorrected_os: Option<String>,
    pub va_corrected_od: Option<String>,
    pub va_corrected_os: Option<String>,
    pub auto_sphere_od: Option<f64>,
    pub auto_cylinder_od: Option<f64>,
    pub auto_axis_od: Option<i32>,
    pub auto_sphere_os: Option<f64>,
    pub auto_cylinder_os: Option<f64>,
    pub auto_axis_os: Option<i32>,
    pub subj_sphere_od: Option<f64>,
    pub subj_cylinder_od: Option<f64>,
    pub subj_axis_od: Option<i32>,
    pub subj_sphere_os: Option<f64>,
    pub subj_cylinder_os: Option<f64>,
    pub subj_axis_os: Option<i32>,
    pub addition: Option<f64>,
    pub pupillary_distance: Option<f64>,
    pub notes: Option<String>,
}

impl Validate for NewRefraction {
    fn validate(&self) -> Result<(), ValidationError> {
        check_sphere("auto_sphere_od", self.auto_sphere_od)?;
        check_cylinder("auto_cylinder_od", self.auto_cylinder_od)?;
        check_axis("auto_axis_od", self.auto_axis_od)?;
        check_sphere("auto_sphere_os", self.auto_sphere_os)?;
        check_cylinder("auto_cylinder_os", self.auto_cylinder_os)?;
        check_axis("auto_axis_os", self.auto_axis_os)?;
        check_sphere("subj_sphere_od", self.subj_sphere_od)?;
        check_cylinder("subj_cylinder_od", self.subj_cylinder_od)?;
        check_axis("subj_axis_od", self.subj_axis_od)?;
        check_sphere("subj_sphere_os", self.subj_sphere_os)?;
        check_cylinder("subj_cylinder_os", self.subj_cylinder_os)?;
        check_axis("subj_axis_os", self.subj_axis_os)?;
        check_range("addition", self.addition, 0.0, 4.0)?;
        check_range("pupillary_distance", self.pupillary_distance, 40.0, 80.0)
    }
}
