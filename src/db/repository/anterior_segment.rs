use rusqlite::{params, Connection, Row};

use super::{count_for_patient, now_timestamp, select_for_patient};
use crate::db::DatabaseError;
use crate::models::*;

const TABLE: &str = "anterior_segment_exams";
const COLUMNS: &str = "id, patient_id, lids_od, lids_os, conjunctiva_od, conjunctiva_os, cornea_od,
     cornea_os, anterior_chamber_od, anterior_chamber_os, iris_od, iris_os, lens_od, lens_os,
     notes, created_at";

pub fn insert_anterior_segment(
    conn: &Connection,
    patient_id: i64,
    exam: &NewAnteriorSegment,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO anterior_segment_exams (patient_id, lids_od, lids_os, conjunctiva_od,
         conjunctiva_os, cornea_od, cornea_os, anterior_chamber_od, anterior_chamber_os,
         iris_od, iris_os, lens_od, lens_os, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            patient_id,
            exam.lids_od,
            exam.lids_os,
            exam.conjunctiva_od,
            exam.conjunctiva_os,
            exam.cornea_od,
            exam.cornea_os,
            exam.anterior_chamber_od,
            exam.anterior_chamber_os,
            exam.iris_od,
            exam.iris_os,
            exam.lens_od,
            exam.lens_os,
            exam.notes,
            now_timestamp(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn anterior_segment_from_row(row: &Row<'_>) -> rusqlite::Result<AnteriorSegmentExam> {
    Ok(AnteriorSegmentExam {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        values: NewAnteriorSegment {
            lids_od: row.get(2)?,
            lids_os: row.get(3)?,
            conjunctiva_od: row.get(4)?,
            conjunctiva_os: row.get(5)?,
            cornea_od: row.get(6)?,
            cornea_os: row.get(7)?,
            anterior_chamber_od: row.get(8)?,
            anterior_chamber_os: row.get(9)?,
            iris_od: row.get(10)?,
            iris_os: row.get(11)?,
            lens_od: row.get(12)?,
            lens_os: row.get(13)?,
            notes: row.get(14)?,
        },
        created_at: row.get(15)?,
    })
}

pub fn list_anterior_segment_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<AnteriorSegmentExam>, DatabaseError> {
    select_for_patient(conn, TABLE, COLUMNS, patient_id, None, anterior_segment_from_row)
}

pub fn latest_anterior_segment_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<AnteriorSegmentExam>, DatabaseError> {
    Ok(select_for_patient(conn, TABLE, COLUMNS, patient_id, Some(1), anterior_segment_from_row)?
        .into_iter()
        .next())
}

pub fn count_anterior_segment_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<i64, DatabaseError> {
    count_for_patient(conn, TABLE, patient_id)
}
