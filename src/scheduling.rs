//! Appointment booking and free-slot computation.
//!
//! Working hours are seven fixed weekday rows. A slot is a start time on a
//! working day whose whole length fits before closing; a slot is free unless
//! a non-cancelled appointment already starts at that time.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use rusqlite::Connection;
use serde::Serialize;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::enums::AppointmentStatus;
use crate::models::{Appointment, NewAppointment, WorkingHours};
use crate::validation::{submit, SaveError};

/// Free slots for one day.
#[derive(Debug, Clone, Serialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub is_working_day: bool,
    pub slot_minutes: u32,
    pub slots: Vec<NaiveTime>,
}

/// Slot start times within `hours`, minus those in `booked`.
pub fn available_slots(hours: &WorkingHours, booked: &[NaiveTime], slot_minutes: u32) -> Vec<NaiveTime> {
    if !hours.is_working_day || slot_minutes == 0 {
        return Vec::new();
    }

    let open = hours.start_time.num_seconds_from_midnight();
    let close = hours.end_time.num_seconds_from_midnight();
    let step = slot_minutes * 60;

    let mut slots = Vec::new();
    let mut start = open;
    while start + step <= close {
        if let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(start, 0) {
            if !booked.contains(&time) {
                slots.push(time);
            }
        }
        start += step;
    }
    slots
}

/// Free slots on `date`, read from the working-hours table and the day's bookings.
pub fn available_slots_on(
    conn: &Connection,
    date: NaiveDate,
    slot_minutes: u32,
) -> Result<DaySlots, DatabaseError> {
    let weekday = date.weekday().num_days_from_monday() as u8;
    let hours = repository::get_working_hours_for(conn, weekday)?
        .ok_or_else(|| DatabaseError::not_found("working_hours", weekday))?;

    let booked = repository::booked_times_on(conn, date)?;
    Ok(DaySlots {
        date,
        is_working_day: hours.is_working_day,
        slot_minutes,
        slots: available_slots(&hours, &booked, slot_minutes),
    })
}

/// Validate and store a booking, returning the stored row.
pub fn create_appointment(conn: &Connection, form: &NewAppointment) -> Result<Appointment, SaveError> {
    let id = submit(conn, form, repository::insert_appointment)?;
    let appointment = repository::get_appointment(conn, id)?
        .ok_or_else(|| DatabaseError::not_found("appointment", id))?;
    tracing::info!(
        appointment_id = id,
        patient_id = form.patient_id,
        date = %form.appointment_date,
        "Appointment booked"
    );
    Ok(appointment)
}

pub fn set_appointment_status(
    conn: &Connection,
    id: i64,
    status: AppointmentStatus,
) -> Result<Appointment, DatabaseError> {
    repository::update_appointment_status(conn, id, status)?;
    tracing::info!(appointment_id = id, status = %status, "Appointment status changed");
    repository::get_appointment(conn, id)?.ok_or_else(|| DatabaseError::not_found("appointment", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::make_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::validation::ValidationError;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn hours(start: NaiveTime, end: NaiveTime, working: bool) -> WorkingHours {
        WorkingHours {
            weekday: 0,
            start_time: start,
            end_time: end,
            is_working_day: working,
        }
    }

    fn booking(patient_id: i64, date: NaiveDate, time: NaiveTime) -> NewAppointment {
        NewAppointment {
            patient_id,
            appointment_date: date,
            appointment_time: time,
            appointment_type: "follow-up".into(),
            status: AppointmentStatus::Scheduled,
            notes: None,
        }
    }

    // 2024-06-03 is a Monday, 2024-06-09 a Sunday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn slots_cover_the_working_day() {
        let slots = available_slots(&hours(t(9, 0), t(11, 0), true), &[], 30);
        assert_eq!(slots, vec![t(9, 0), t(9, 30), t(10, 0), t(10, 30)]);
    }

    #[test]
    fn partial_slot_before_closing_is_dropped() {
        let slots = available_slots(&hours(t(9, 0), t(10, 20), true), &[], 30);
        assert_eq!(slots, vec![t(9, 0), t(9, 30)]);
    }

    #[test]
    fn booked_times_are_excluded() {
        let slots = available_slots(&hours(t(9, 0), t(10, 30), true), &[t(9, 30)], 30);
        assert_eq!(slots, vec![t(9, 0), t(10, 0)]);
    }

    #[test]
    fn non_working_day_has_no_slots() {
        assert!(available_slots(&hours(t(9, 0), t(17, 0), false), &[], 30).is_empty());
    }

    #[test]
    fn sunday_is_closed_in_seeded_hours() {
        let conn = open_memory_database().unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        let day = available_slots_on(&conn, sunday, 30).unwrap();
        assert!(!day.is_working_day);
        assert!(day.slots.is_empty());
    }

    #[test]
    fn cancelled_booking_frees_its_slot() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");

        let appt = create_appointment(&conn, &booking(patient, monday(), t(9, 0))).unwrap();
        let day = available_slots_on(&conn, monday(), 30).unwrap();
        assert!(!day.slots.contains(&t(9, 0)));
        assert_eq!(day.slots.first(), Some(&t(9, 30)));

        set_appointment_status(&conn, appt.id, AppointmentStatus::Cancelled).unwrap();
        let day = available_slots_on(&conn, monday(), 30).unwrap();
        assert_eq!(day.slots.first(), Some(&t(9, 0)));
    }

    #[test]
    fn booking_requires_type() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        let mut form = booking(patient, monday(), t(10, 0));
        form.appointment_type = "  ".into();

        let err = create_appointment(&conn, &form).unwrap_err();
        assert!(matches!(
            err,
            SaveError::Validation(ValidationError::Required { field: "appointment_type" })
        ));
        assert!(repository::list_appointments_for_date(&conn, monday()).unwrap().is_empty());
    }

    #[test]
    fn status_update_on_missing_appointment_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = set_appointment_status(&conn, 99, AppointmentStatus::Completed).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
