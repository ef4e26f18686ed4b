use rusqlite::{params, Connection, Row};

use super::{count_for_patient, now_timestamp, select_for_patient};
use crate::db::DatabaseError;
use crate::models::*;

const TABLE: &str = "refraction_exams";
const COLUMNS: &str = "id, patient_id, va_uncorrected_od, va_uncorrected_os, va_corrected_od,
     va_corrected_os, auto_sphere_od, auto_cylinder_od, auto_axis_od, auto_sphere_os,
     auto_cylinder_os, auto_axis_os, subj_sphere_od, subj_cylinder_od, subj_axis_od,
     subj_sphere_os, subj_cylinder_os, subj_axis_os, addition, pupillary_distance, notes, created_at";

pub fn insert_refraction(
    conn: &Connection,
    patient_id: i64,
    exam: &NewRefraction,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO refraction_exams (patient_id, va_uncorrected_od, va_uncorrected_os,
         va_corrected_od, va_corrected_os, auto_sphere_od, auto_cylinder_od, auto_axis_od,
         auto_sphere_os, auto_cylinder_os, auto_axis_os, subj_sphere_od, subj_cylinder_od,
         subj_axis_od, subj_sphere_os, subj_cylinder_os, subj_axis_os, addition,
         pupillary_distance, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
         ?18, ?19, ?20, ?21)",
        params![
            patient_id,
            exam.va_uncorrected_od,
            exam.va_uncorrected_os,
            exam.va_corrected_od,
            exam.va_corrected_os,
            exam.auto_sphere_od,
            exam.auto_cylinder_od,
            exam.auto_axis_od,
            exam.auto_sphere_os,
            exam.auto_cylinder_os,
            exam.auto_axis_os,
            exam.subj_sphere_od,
            exam.subj_cylinder_od,
            exam.subj_axis_od,
            exam.subj_sphere_os,
            exam.subj_cylinder_os,
            exam.subj_axis_os,
            exam.addition,
            exam.pupillary_distance,
            exam.notes,
            now_timestamp(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn refraction_from_row(row: &Row<'_>) -> rusqlite::Result<RefractionExam> {
    Ok(RefractionExam {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        values: NewRefraction {
            va_uncorrected_od: row.get(2)?,
            va_uncorrected_os: row.get(3)?,
            va_corrected_od: row.get(4)?,
            va_corrected_os: row.get(5)?,
            auto_sphere_od: row.get(6)?,
            auto_cylinder_od: row.get(7)?,
            auto_axis_od: row.get(8)?,
            auto_sphere_os: row.get(9)?,
            auto_cylinder_os: row.get(10)?,
            auto_axis_os: row.get(11)?,
            subj_sphere_od: row.get(12)?,
            subj_cylinder_od: row.get(13)?,
            subj_axis_od: row.get(14)?,
            subj_sphere_os: row.get(15)?,
            subj_cylinder_os: row.get(16)?,
            subj_axis_os: row.get(17)?,
            addition: row.get(18)?,
            pupillary_distance: row.get(19)?,
            notes: row.get(20)?,
        },
        created_at: row.get(21)?,
    })
}

pub fn list_refraction_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<RefractionExam>, DatabaseError> {
    select_for_patient(conn, TABLE, COLUMNS, patient_id, None, refraction_from_row)
}

pub fn latest_refraction_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<RefractionExam>, DatabaseError> {
    Ok(select_for_patient(conn, TABLE, COLUMNS, patient_id, Some(1), refraction_from_row)?
        .into_iter()
        .next())
}

pub fn count_refraction_for_patient(conn: &Connection, patient_id: i64) -> Result<i64, DatabaseError> {
    count_for_patient(conn, TABLE, patient_id)
}
