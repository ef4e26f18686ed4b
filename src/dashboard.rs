//! Dashboard: types and aggregate queries.
//!
//! Three headline numbers plus today's schedule and the newest registrations.
//! Everything is recomputed on each request; there is no cache.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::Patient;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Headline numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_patients: i64,
    /// Appointments dated today with status `Completed`.
    pub todays_examinations: i64,
    pub total_contact_lens_prescriptions: i64,
}

/// A row of today's schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentCard {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub patient_code: String,
    pub patient_name: String,
    pub time: NaiveTime,
    pub appointment_type: String,
    pub status: AppointmentStatus,
}

/// Dashboard data: single fetch for all dashboard content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    pub date: NaiveDate,
    pub stats: DashboardStats,
    pub todays_appointments: Vec<AppointmentCard>,
    pub recent_patients: Vec<Patient>,
}

const RECENT_PATIENTS: u32 = 5;

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub fn fetch_dashboard_stats(conn: &Connection, today: NaiveDate) -> Result<DashboardStats, DatabaseError> {
    Ok(DashboardStats {
        total_patients: repository::count_patients(conn)?,
        todays_examinations: repository::count_appointments_with_status_on(
            conn,
            today,
            AppointmentStatus::Completed,
        )?,
        total_contact_lens_prescriptions: repository::count_contact_lens_prescriptions(conn)?,
    })
}

/// Today's appointments with patient identity, in time order.
pub fn fetch_todays_appointments(
    conn: &Connection,
    today: NaiveDate,
) -> Result<Vec<AppointmentCard>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.patient_id, p.patient_code, p.first_name || ' ' || p.last_name,
                a.appointment_time, a.appointment_type, a.status
         FROM appointments a
         JOIN patients p ON p.id = a.patient_id
         WHERE a.appointment_date = ?1
         ORDER BY a.appointment_time, a.id",
    )?;

    let rows = stmt.query_map(params![today], |row| {
        Ok(AppointmentCard {
            appointment_id: row.get(0)?,
            patient_id: row.get(1)?,
            patient_code: row.get(2)?,
            patient_name: row.get(3)?,
            time: row.get(4)?,
            appointment_type: row.get(5)?,
            status: row.get(6)?,
        })
    })?;

    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn fetch_dashboard(conn: &Connection, today: NaiveDate) -> Result<DashboardData, DatabaseError> {
    Ok(DashboardData {
        date: today,
        stats: fetch_dashboard_stats(conn, today)?,
        todays_appointments: fetch_todays_appointments(conn, today)?,
        recent_patients: repository::recent_patients(conn, RECENT_PATIENTS)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::repository::test_support::make_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::LensType;
    use crate::models::{NewAppointment, NewContactLens};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn book(conn: &Connection, patient_id: i64, date: NaiveDate, hour: u32, status: AppointmentStatus) {
        repository::insert_appointment(
            conn,
            &NewAppointment {
                patient_id,
                appointment_date: date,
                appointment_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                appointment_type: "routine".into(),
                status,
                notes: None,
            },
        )
        .unwrap();
    }

    fn lens() -> NewContactLens {
        NewContactLens {
            lens_type: LensType::Soft,
            brand: Some("Acme".into()),
            base_curve_od: Some(8.6),
            diameter_od: Some(14.2),
            sphere_od: Some(-1.5),
            cylinder_od: None,
            axis_od: None,
            base_curve_os: Some(8.6),
            diameter_os: Some(14.2),
            sphere_os: Some(-1.75),
            cylinder_os: None,
            axis_os: None,
            wearing_schedule: Some("daily".into()),
            replacement_schedule: Some("monthly".into()),
            notes: None,
        }
    }

    #[test]
    fn empty_clinic_has_zero_stats() {
        let conn = open_memory_database().unwrap();
        let stats = fetch_dashboard_stats(&conn, today()).unwrap();
        assert_eq!(
            stats,
            DashboardStats {
                total_patients: 0,
                todays_examinations: 0,
                total_contact_lens_prescriptions: 0,
            }
        );
    }

    #[test]
    fn todays_examinations_counts_completed_today_only() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        book(&conn, patient, today(), 9, AppointmentStatus::Completed);
        book(&conn, patient, today(), 10, AppointmentStatus::Scheduled);
        book(&conn, patient, today() - Duration::days(1), 9, AppointmentStatus::Completed);

        let stats = fetch_dashboard_stats(&conn, today()).unwrap();
        assert_eq!(stats.todays_examinations, 1);
    }

    #[test]
    fn totals_track_row_counts() {
        let conn = open_memory_database().unwrap();
        let a = make_patient(&conn, "P-0001");
        make_patient(&conn, "P-0002");
        repository::insert_contact_lens(&conn, a, &lens()).unwrap();

        let stats = fetch_dashboard_stats(&conn, today()).unwrap();
        assert_eq!(stats.total_patients, 2);
        assert_eq!(stats.total_contact_lens_prescriptions, 1);
    }

    #[test]
    fn dashboard_lists_todays_schedule_in_time_order() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        book(&conn, patient, today(), 14, AppointmentStatus::Scheduled);
        book(&conn, patient, today(), 9, AppointmentStatus::Completed);

        let data = fetch_dashboard(&conn, today()).unwrap();
        let hours: Vec<_> = data
            .todays_appointments
            .iter()
            .map(|a| a.time.format("%H:%M").to_string())
            .collect();
        assert_eq!(hours, vec!["09:00", "14:00"]);
        assert_eq!(data.todays_appointments[0].patient_code, "P-0001");
        assert_eq!(data.recent_patients.len(), 1);
    }
}
