use rusqlite::{params, Connection, Row};

use super::{count_for_patient, now_timestamp, select_for_patient};
use crate::db::DatabaseError;
use crate::models::*;
use crate::validation::{join_paths, split_paths};

const TABLE: &str = "fundus_exams";
const COLUMNS: &str = "id, patient_id, optic_disc_od, optic_disc_os, cup_disc_ratio_od,
     cup_disc_ratio_os, macula_od, macula_os, vessels_od, vessels_os, periphery_od, periphery_os,
     images, notes, created_at";

pub fn insert_fundus(conn: &Connection, patient_id: i64, exam: &NewFundus) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO fundus_exams (patient_id, optic_disc_od, optic_disc_os, cup_disc_ratio_od,
         cup_disc_ratio_os, macula_od, macula_os, vessels_od, vessels_os, periphery_od,
         periphery_os, images, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            patient_id,
            exam.optic_disc_od,
            exam.optic_disc_os,
            exam.cup_disc_ratio_od,
            exam.cup_disc_ratio_os,
            exam.macula_od,
            exam.macula_os,
            exam.vessels_od,
            exam.vessels_os,
            exam.periphery_od,
            exam.periphery_os,
            join_paths(&exam.images),
            exam.notes,
            now_timestamp(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn fundus_from_row(row: &Row<'_>) -> rusqlite::Result<FundusExam> {
    Ok(FundusExam {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        values: NewFundus {
            optic_disc_od: row.get(2)?,
            optic_disc_os: row.get(3)?,
            cup_disc_ratio_od: row.get(4)?,
            cup_disc_ratio_os: row.get(5)?,
            macula_od: row.get(6)?,
            macula_os: row.get(7)?,
            vessels_od: row.get(8)?,
            vessels_os: row.get(9)?,
            periphery_od: row.get(10)?,
            periphery_os: row.get(11)?,
            images: split_paths(&row.get::<_, String>(12)?),
            notes: row.get(13)?,
        },
        created_at: row.get(14)?,
    })
}

pub fn list_fundus_for_patient(conn: &Connection, patient_id: i64) -> Result<Vec<FundusExam>, DatabaseError> {
    select_for_patient(conn, TABLE, COLUMNS, patient_id, None, fundus_from_row)
}

pub fn latest_fundus_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<FundusExam>, DatabaseError> {
    Ok(select_for_patient(conn, TABLE, COLUMNS, patient_id, Some(1), fundus_from_row)?
        .into_iter()
        .next())
}

pub fn count_fundus_for_patient(conn: &Connection, patient_id: i64) -> Result<i64, DatabaseError> {
    count_for_patient(conn, TABLE, patient_id)
}
