use rusqlite::{params, Connection, Row};

use super::{count_for_patient, now_timestamp, select_for_patient};
use crate::db::DatabaseError;
use crate::models::*;

const TABLE: &str = "group_assignments";
const COLUMNS: &str = "id, patient_id, group_name, notes, created_at";

pub fn insert_group_assignment(
    conn: &Connection,
    patient_id: i64,
    assignment: &NewGroupAssignment,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO group_assignments (patient_id, group_name, notes, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            patient_id,
            assignment.group_name.trim(),
            assignment.notes,
            now_timestamp(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<GroupAssignment> {
    Ok(GroupAssignment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        group_name: row.get(2)?,
        notes: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub fn list_group_assignment_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<GroupAssignment>, DatabaseError> {
    select_for_patient(conn, TABLE, COLUMNS, patient_id, None, group_from_row)
}

pub fn latest_group_assignment_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<GroupAssignment>, DatabaseError> {
    Ok(select_for_patient(conn, TABLE, COLUMNS, patient_id, Some(1), group_from_row)?
        .into_iter()
        .next())
}

pub fn count_group_assignment_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<i64, DatabaseError> {
    count_for_patient(conn, TABLE, patient_id)
}

/// Distinct group names in use, alphabetical.
pub fn list_group_names(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT group_name FROM group_assignments ORDER BY group_name")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
