use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::now_timestamp;
use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::*;

const COLUMNS: &str = "id, patient_id, appointment_date, appointment_time, appointment_type,
     status, notes, created_at";

pub fn insert_appointment(conn: &Connection, appt: &NewAppointment) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (patient_id, appointment_date, appointment_time,
         appointment_type, status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            appt.patient_id,
            appt.appointment_date,
            appt.appointment_time,
            appt.appointment_type.trim(),
            appt.status,
            appt.notes,
            now_timestamp(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        appointment_date: row.get(2)?,
        appointment_time: row.get(3)?,
        appointment_type: row.get(4)?,
        status: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM appointments WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], appointment_from_row)
        .optional()?)
}

/// Appointments on one day, in time order.
pub fn list_appointments_for_date(
    conn: &Connection,
    date: NaiveDate,
) -> Result<Vec<Appointment>, DatabaseError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM appointments WHERE appointment_date = ?1
         ORDER BY appointment_time, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![date], appointment_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// A patient's appointments, most recent date first.
pub fn list_appointments_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<Appointment>, DatabaseError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM appointments WHERE patient_id = ?1
         ORDER BY appointment_date DESC, appointment_time DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], appointment_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Appointments are not clinical records; their status is the one mutable field.
pub fn update_appointment_status(
    conn: &Connection,
    id: i64,
    status: AppointmentStatus,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET status = ?1 WHERE id = ?2",
        params![status, id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("appointment", id));
    }
    Ok(())
}

pub fn count_appointments_with_status_on(
    conn: &Connection,
    date: NaiveDate,
    status: AppointmentStatus,
) -> Result<i64, DatabaseError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE appointment_date = ?1 AND status = ?2",
        params![date, status],
        |row| row.get(0),
    )?)
}

/// Start times already taken on `date` by appointments that are not cancelled.
pub fn booked_times_on(conn: &Connection, date: NaiveDate) -> Result<Vec<NaiveTime>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT appointment_time FROM appointments
         WHERE appointment_date = ?1 AND status != ?2
         ORDER BY appointment_time",
    )?;
    let rows = stmt.query_map(params![date, AppointmentStatus::Cancelled], |row| row.get(0))?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
