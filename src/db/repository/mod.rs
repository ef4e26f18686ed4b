//! Repository layer: one sub-module per table.
//!
//! Clinical tables expose the same four operations: insert, list for a patient
//! (newest first), latest for a patient, and count for a patient. There is no
//! update or delete path for clinical rows.

mod anterior_segment;
mod appointment;
mod contact_lens;
mod functional_test;
mod fundus;
mod group;
mod medical_history;
mod patient;
mod refraction;
mod user;
mod working_hours;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};

use super::DatabaseError;

pub use anterior_segment::*;
pub use appointment::*;
pub use contact_lens::*;
pub use functional_test::*;
pub use fundus::*;
pub use group::*;
pub use medical_history::*;
pub use patient::*;
pub use refraction::*;
pub use user::*;
pub use working_hours::*;

/// Wall-clock timestamp recorded on every inserted row.
pub(crate) fn now_timestamp() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Rows of `table` for one patient, newest first. `limit = None` returns all rows.
fn select_for_patient<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    patient_id: i64,
    limit: Option<u32>,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, DatabaseError> {
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE patient_id = ?1
         ORDER BY created_at DESC, id DESC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id, limit.map_or(-1, i64::from)], map)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

fn count_for_patient(conn: &Connection, table: &str, patient_id: i64) -> Result<i64, DatabaseError> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE patient_id = ?1");
    Ok(conn.query_row(&sql, params![patient_id], |row| row.get(0))?)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use rusqlite::Connection;

    use super::insert_patient;
    use crate::models::enums::Gender;
    use crate::models::NewPatient;

    pub fn new_patient(code: &str) -> NewPatient {
        NewPatient {
            patient_code: code.into(),
            first_name: "Test".into(),
            last_name: "Patient".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1975, 3, 14),
            gender: Gender::Other,
            phone: Some("555-0100".into()),
            email: None,
            address: None,
        }
    }

    pub fn make_patient(conn: &Connection, code: &str) -> i64 {
        insert_patient(conn, &new_patient(code)).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::make_patient;
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;

    #[test]
    fn clinical_rows_are_append_only() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        for n in 1..=3 {
            insert_refraction(&conn, patient, &NewRefraction::default()).unwrap();
            assert_eq!(count_refraction_for_patient(&conn, patient).unwrap(), n);
        }
        assert_eq!(list_refraction_for_patient(&conn, patient).unwrap().len(), 3);
    }

    #[test]
    fn rows_are_scoped_to_their_patient() {
        let conn = open_memory_database().unwrap();
        let a = make_patient(&conn, "P-0001");
        let b = make_patient(&conn, "P-0002");
        insert_functional_test(&conn, a, &NewFunctionalTest::default()).unwrap();
        insert_functional_test(&conn, a, &NewFunctionalTest::default()).unwrap();
        insert_functional_test(&conn, b, &NewFunctionalTest::default()).unwrap();
        assert_eq!(count_functional_test_for_patient(&conn, a).unwrap(), 2);
        assert_eq!(count_functional_test_for_patient(&conn, b).unwrap(), 1);
    }

    #[test]
    fn latest_returns_newest_row() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        for name in ["myopia", "glaucoma"] {
            insert_group_assignment(
                &conn,
                patient,
                &NewGroupAssignment {
                    group_name: name.into(),
                    notes: None,
                },
            )
            .unwrap();
        }
        let latest = latest_group_assignment_for_patient(&conn, patient)
            .unwrap()
            .unwrap();
        assert_eq!(latest.group_name, "glaucoma");
    }

    #[test]
    fn insert_for_unknown_patient_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        let err = insert_anterior_segment(&conn, 999, &NewAnteriorSegment::default()).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn store_does_not_range_check() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        let form = NewRefraction {
            subj_axis_od: Some(270),
            ..Default::default()
        };
        insert_refraction(&conn, patient, &form).unwrap();
        let stored = latest_refraction_for_patient(&conn, patient).unwrap().unwrap();
        assert_eq!(stored.values.subj_axis_od, Some(270));
    }
}
