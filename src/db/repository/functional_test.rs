use rusqlite::{params, Connection, Row};

use super::{count_for_patient, now_timestamp, select_for_patient};
use crate::db::DatabaseError;
use crate::models::*;

const TABLE: &str = "functional_tests";
const COLUMNS: &str = "id, patient_id, iop_od, iop_os, tonometry_method, color_vision, stereopsis,
     visual_field, cover_test, notes, created_at";

pub fn insert_functional_test(
    conn: &Connection,
    patient_id: i64,
    test: &NewFunctionalTest,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO functional_tests (patient_id, iop_od, iop_os, tonometry_method, color_vision,
         stereopsis, visual_field, cover_test, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            patient_id,
            test.iop_od,
            test.iop_os,
            test.tonometry_method,
            test.color_vision,
            test.stereopsis,
            test.visual_field,
            test.cover_test,
            test.notes,
            now_timestamp(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn functional_test_from_row(row: &Row<'_>) -> rusqlite::Result<FunctionalTestEntry> {
    Ok(FunctionalTestEntry {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        values: NewFunctionalTest {
            iop_od: row.get(2)?,
            iop_os: row.get(3)?,
            tonometry_method: row.get(4)?,
            color_vision: row.get(5)?,
            stereopsis: row.get(6)?,
            visual_field: row.get(7)?,
            cover_test: row.get(8)?,
            notes: row.get(9)?,
        },
        created_at: row.get(10)?,
    })
}

pub fn list_functional_test_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<FunctionalTestEntry>, DatabaseError> {
    select_for_patient(conn, TABLE, COLUMNS, patient_id, None, functional_test_from_row)
}

pub fn latest_functional_test_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<FunctionalTestEntry>, DatabaseError> {
    Ok(select_for_patient(conn, TABLE, COLUMNS, patient_id, Some(1), functional_test_from_row)?
        .into_iter()
        .next())
}

pub fn count_functional_test_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<i64, DatabaseError> {
    count_for_patient(conn, TABLE, patient_id)
}
