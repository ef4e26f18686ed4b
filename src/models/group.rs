use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::validation::{require, Validate, ValidationError};

/// Clinical grouping of a patient (e.g. myopia, glaucoma suspect, pediatric).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAssignment {
    pub id: i64,
    pub patient_id: i64,
    pub group_name: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGroupAssignment {
    pub group_name: String,
    pub notes: Option<String>,
}

impl Validate for NewGroupAssignment {
    fn validate(&self) -> Result<(), ValidationError> {
        require("group_name", &self.group_name)
    }
}
