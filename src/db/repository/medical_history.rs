use rusqlite::{params, Connection, Row};

use super::{count_for_patient, now_timestamp, select_for_patient};
use crate::db::DatabaseError;
use crate::models::*;
use crate::validation::{join_paths, split_paths};

const TABLE: &str = "medical_history";
const COLUMNS: &str = "id, patient_id, general_health, medications, allergies, family_history,
     previous_eye_surgery, ocular_history, previous_reports, notes, created_at";

pub fn insert_medical_history(
    conn: &Connection,
    patient_id: i64,
    entry: &NewMedicalHistory,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medical_history (patient_id, general_health, medications, allergies,
         family_history, previous_eye_surgery, ocular_history, previous_reports, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            patient_id,
            entry.general_health,
            entry.medications,
            entry.allergies,
            entry.family_history,
            entry.previous_eye_surgery,
            entry.ocular_history,
            join_paths(&entry.previous_reports),
            entry.notes,
            now_timestamp(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn medical_history_from_row(row: &Row<'_>) -> rusqlite::Result<MedicalHistoryEntry> {
    Ok(MedicalHistoryEntry {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        general_health: row.get(2)?,
        medications: row.get(3)?,
        allergies: row.get(4)?,
        family_history: row.get(5)?,
        previous_eye_surgery: row.get(6)?,
        ocular_history: row.get(7)?,
        previous_reports: split_paths(&row.get::<_, String>(8)?),
        notes: row.get(9)?,
        created_at: row.get(10)?,
    })
}

pub fn list_medical_history_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<MedicalHistoryEntry>, DatabaseError> {
    select_for_patient(conn, TABLE, COLUMNS, patient_id, None, medical_history_from_row)
}

pub fn latest_medical_history_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<MedicalHistoryEntry>, DatabaseError> {
    Ok(select_for_patient(conn, TABLE, COLUMNS, patient_id, Some(1), medical_history_from_row)?
        .into_iter()
        .next())
}

pub fn count_medical_history_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<i64, DatabaseError> {
    count_for_patient(conn, TABLE, patient_id)
}
