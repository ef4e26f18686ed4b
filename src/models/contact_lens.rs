use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::LensType;
use crate::validation::{check_axis, check_cylinder, check_range, check_sphere, Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactLensPrescription {
    pub id: i64,
    pub patient_id: i64,
    #[serde(flatten)]
    pub values: NewContactLens,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContactLens {
    pub lens_type: LensType,
    pub brand: Option<String>,
    pub base_curve_od: Option<f64>,
    pub diameter_od: Option<f64>,
    pub sphere_od: Option<f64>,
    pub cylinder_od: Option<f64>,
    pub axis_od: Option<i32>,
    pub base_curve_os: Option<f64>,
    pub diameter_os: Option<f64>,
    pub sphere_os: Option<f64>,
    pub cylinder_os: Option<f64>,
    pub axis_os: Option<i32>,
    pub wearing_schedule: Option<String>,
    pub replacement_schedule: Option<String>,
    pub notes: Option<String>,
}

impl Validate for NewContactLens {
    fn validate(&self) -> Result<(), ValidationError> {
        check_range("base_curve_od", self.base_curve_od, 6.0, 10.0)?;
        check_range("diameter_od", self.diameter_od, 8.0, 24.0)?;
        check_sphere("sphere_od", self.sphere_od)?;
        check_cylinder("cylinder_od", self.cylinder_od)?;
        check_axis("axis_od", self.axis_od)?;
        check_range("base_curve_os", self.base_curve_os, 6.0, 10.0)?;
        check_range("diameter_os", self.diameter_os, 8.0, 24.0)?;
        check_sphere("sphere_os", self.sphere_os)?;
        check_cylinder("cylinder_os", self.cylinder_os)?;
        check_axis("axis_os", self.axis_os)
    }
}
