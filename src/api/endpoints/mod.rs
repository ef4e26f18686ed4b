//! API endpoint handlers.
//!
//! Each module corresponds to one screen or menu of the clinic front end.
//! Handlers lock the database before touching the session store.

pub mod appointments;
pub mod auth;
pub mod contact_lenses;
pub mod dashboard;
pub mod exam;
pub mod files;
pub mod health;
pub mod patients;
pub mod users;
pub mod working_hours;
