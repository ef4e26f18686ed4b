use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::Gender;
use crate::validation::{check_patient_code, require, Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub patient_code: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub patient_code: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl Validate for NewPatient {
    fn validate(&self) -> Result<(), ValidationError> {
        check_patient_code("patient_code", &self.patient_code)?;
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        if let Some(dob) = self.date_of_birth {
            if dob > chrono::Local::now().date_naive() {
                return Err(ValidationError::Invalid {
                    field: "date_of_birth",
                    reason: "date of birth is in the future".into(),
                });
            }
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !email.contains('@') {
                return Err(ValidationError::Invalid {
                    field: "email",
                    reason: "missing '@'".into(),
                });
            }
        }
        Ok(())
    }
}
