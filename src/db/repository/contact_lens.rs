use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{count_for_patient, now_timestamp, select_for_patient};
use crate::db::DatabaseError;
use crate::models::*;

const TABLE: &str = "contact_lens_prescriptions";
const COLUMNS: &str = "id, patient_id, lens_type, brand, base_curve_od, diameter_od, sphere_od,
     cylinder_od, axis_od, base_curve_os, diameter_os, sphere_os, cylinder_os, axis_os,
     wearing_schedule, replacement_schedule, notes, created_at";

pub fn insert_contact_lens(
    conn: &Connection,
    patient_id: i64,
    rx: &NewContactLens,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO contact_lens_prescriptions (patient_id, lens_type, brand, base_curve_od,
         diameter_od, sphere_od, cylinder_od, axis_od, base_curve_os, diameter_os, sphere_os,
         cylinder_os, axis_os, wearing_schedule, replacement_schedule, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            patient_id,
            rx.lens_type,
            rx.brand,
            rx.base_curve_od,
            rx.diameter_od,
            rx.sphere_od,
            rx.cylinder_od,
            rx.axis_od,
            rx.base_curve_os,
            rx.diameter_os,
            rx.sphere_os,
            rx.cylinder_os,
            rx.axis_os,
            rx.wearing_schedule,
            rx.replacement_schedule,
            rx.notes,
            now_timestamp(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn contact_lens_from_row(row: &Row<'_>) -> rusqlite::Result<ContactLensPrescription> {
    Ok(ContactLensPrescription {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        values: NewContactLens {
            lens_type: row.get(2)?,
            brand: row.get(3)?,
            base_curve_od: row.get(4)?,
            diameter_od: row.get(5)?,
            sphere_od: row.get(6)?,
            cylinder_od: row.get(7)?,
            axis_od: row.get(8)?,
            base_curve_os: row.get(9)?,
            diameter_os: row.get(10)?,
            sphere_os: row.get(11)?,
            cylinder_os: row.get(12)?,
            axis_os: row.get(13)?,
            wearing_schedule: row.get(14)?,
            replacement_schedule: row.get(15)?,
            notes: row.get(16)?,
        },
        created_at: row.get(17)?,
    })
}

pub fn get_contact_lens(
    conn: &Connection,
    id: i64,
) -> Result<Option<ContactLensPrescription>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], contact_lens_from_row)
        .optional()?)
}

pub fn list_contact_lens_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<ContactLensPrescription>, DatabaseError> {
    select_for_patient(conn, TABLE, COLUMNS, patient_id, None, contact_lens_from_row)
}

pub fn latest_contact_lens_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<ContactLensPrescription>, DatabaseError> {
    Ok(select_for_patient(conn, TABLE, COLUMNS, patient_id, Some(1), contact_lens_from_row)?
        .into_iter()
        .next())
}

pub fn count_contact_lens_for_patient(conn: &Connection, patient_id: i64) -> Result<i64, DatabaseError> {
    count_for_patient(conn, TABLE, patient_id)
}

/// Clinic-wide prescription count (dashboard).
pub fn count_contact_lens_prescriptions(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM contact_lens_prescriptions",
        [],
        |row| row.get(0),
    )?)
}
