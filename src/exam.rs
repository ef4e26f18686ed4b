//! Examination workflow: ties the wizard cursor to the record store.
//!
//! Each screen submits one form, accepted only while the wizard is on that
//! screen. A successful save appends exactly one row
//! for the selected patient and then fires the wizard transition. A failed
//! save changes nothing: no row, no cursor movement, and rows saved by
//! earlier steps stay as they are.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::*;
use crate::session::{ActiveMenu, SessionContext};
use crate::validation::{submit, SaveError};
use crate::wizard::{ExamStep, WizardError};

/// One submitted wizard form.
#[derive(Debug, Clone)]
pub enum StepForm {
    MedicalHistory(NewMedicalHistory),
    Refraction(NewRefraction),
    FunctionalTests(NewFunctionalTest),
    AnteriorSegment(NewAnteriorSegment),
    Fundus(NewFundus),
    Groups(NewGroupAssignment),
}

impl StepForm {
    pub fn step(&self) -> ExamStep {
        match self {
            Self::MedicalHistory(_) => ExamStep::MedicalHistory,
            Self::Refraction(_) => ExamStep::Refraction,
            Self::FunctionalTests(_) => ExamStep::FunctionalTests,
            Self::AnteriorSegment(_) => ExamStep::AnteriorSegment,
            Self::Fundus(_) => ExamStep::Fundus,
            Self::Groups(_) => ExamStep::Groups,
        }
    }

    fn save(&self, conn: &Connection, patient_id: i64) -> Result<i64, SaveError> {
        match self {
            Self::MedicalHistory(form) => submit(conn, form, |c, f| {
                repository::insert_medical_history(c, patient_id, f)
            }),
            Self::Refraction(form) => {
                submit(conn, form, |c, f| repository::insert_refraction(c, patient_id, f))
            }
            Self::FunctionalTests(form) => submit(conn, form, |c, f| {
                repository::insert_functional_test(c, patient_id, f)
            }),
            Self::AnteriorSegment(form) => submit(conn, form, |c, f| {
                repository::insert_anterior_segment(c, patient_id, f)
            }),
            Self::Fundus(form) => {
                submit(conn, form, |c, f| repository::insert_fundus(c, patient_id, f))
            }
            Self::Groups(form) => submit(conn, form, |c, f| {
                repository::insert_group_assignment(c, patient_id, f)
            }),
        }
    }
}

/// Result of a successful step submission.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub record_id: i64,
    pub patient_id: i64,
    pub saved_step: ExamStep,
    pub next_step: ExamStep,
}

#[derive(Debug, thiserror::Error)]
pub enum ExamError {
    #[error("No patient selected")]
    NoPatientSelected,
    #[error("Patient {0} does not exist")]
    PatientNotFound(i64),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

fn selected_patient(conn: &Connection, session: &SessionContext) -> Result<i64, ExamError> {
    let patient_id = session.selected_patient.ok_or(ExamError::NoPatientSelected)?;
    if repository::get_patient(conn, patient_id)?.is_none() {
        return Err(ExamError::PatientNotFound(patient_id));
    }
    Ok(patient_id)
}

/// Start (or restart) an examination for the selected patient.
pub fn start_exam(conn: &Connection, session: &mut SessionContext) -> Result<ExamStep, ExamError> {
    let patient_id = selected_patient(conn, session)?;
    let step = session.wizard.start();
    session.navigate(ActiveMenu::Examination);
    tracing::info!(patient_id, user = %session.user.username, "Examination started");
    Ok(step)
}

/// Save one wizard form for the selected patient and advance the cursor.
pub fn submit_step(
    conn: &Connection,
    session: &mut SessionContext,
    form: &StepForm,
) -> Result<StepOutcome, ExamError> {
    let patient_id = selected_patient(conn, session)?;
    let saved_step = form.step();
    session.wizard.accepts(saved_step)?;
    let record_id = form.save(conn, patient_id)?;
    let next_step = session.wizard.record_save(saved_step)?;

    tracing::info!(
        patient_id,
        record_id,
        step = %saved_step,
        next = %next_step,
        "Examination step saved"
    );

    Ok(StepOutcome {
        record_id,
        patient_id,
        saved_step,
        next_step,
    })
}

/// Completion action of the report screen: cursor back to `None`, menu back to the dashboard.
pub fn finish_exam(session: &mut SessionContext) -> Result<(), ExamError> {
    session.wizard.finish()?;
    session.navigate(ActiveMenu::Dashboard);
    tracing::info!(user = %session.user.username, "Examination completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::db::repository::test_support::make_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::UserRole;
    use crate::validation::ValidationError;

    fn session() -> SessionContext {
        SessionContext::new(AuthenticatedUser {
            user_id: 1,
            username: "admin".into(),
            role: UserRole::Admin,
        })
    }

    fn all_steps() -> Vec<StepForm> {
        vec![
            StepForm::MedicalHistory(NewMedicalHistory::default()),
            StepForm::Refraction(NewRefraction::default()),
            StepForm::FunctionalTests(NewFunctionalTest::default()),
            StepForm::AnteriorSegment(NewAnteriorSegment::default()),
            StepForm::Fundus(NewFundus::default()),
            StepForm::Groups(NewGroupAssignment {
                group_name: "myopia".into(),
                notes: None,
            }),
        ]
    }

    #[test]
    fn medical_history_scenario() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        let mut session = session();
        session.select_patient(patient);
        start_exam(&conn, &mut session).unwrap();
        assert_eq!(session.wizard.current(), ExamStep::MedicalHistory);

        let form = StepForm::MedicalHistory(NewMedicalHistory {
            allergies: Some("penicillin".into()),
            ..Default::default()
        });
        let outcome = submit_step(&conn, &mut session, &form).unwrap();

        assert_eq!(outcome.next_step, ExamStep::Refraction);
        assert_eq!(session.wizard.current(), ExamStep::Refraction);
        let rows = repository::list_medical_history_for_patient(&conn, patient).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, outcome.record_id);
        assert_eq!(rows[0].allergies.as_deref(), Some("penicillin"));
    }

    #[test]
    fn full_examination_returns_to_dashboard() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        let mut session = session();
        session.select_patient(patient);
        start_exam(&conn, &mut session).unwrap();
        assert_eq!(session.active_menu, ActiveMenu::Examination);

        for form in all_steps() {
            assert_eq!(session.wizard.current(), form.step());
            submit_step(&conn, &mut session, &form).unwrap();
        }
        assert_eq!(session.wizard.current(), ExamStep::Report);

        finish_exam(&mut session).unwrap();
        assert_eq!(session.wizard.current(), ExamStep::None);
        assert_eq!(session.active_menu, ActiveMenu::Dashboard);
    }

    #[test]
    fn repeated_submission_appends_and_advances() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        let mut session = session();
        session.select_patient(patient);

        let form = StepForm::MedicalHistory(NewMedicalHistory::default());
        for n in 1..=2 {
            start_exam(&conn, &mut session).unwrap();
            let outcome = submit_step(&conn, &mut session, &form).unwrap();
            assert_eq!(outcome.next_step, ExamStep::Refraction);
            assert_eq!(
                repository::count_medical_history_for_patient(&conn, patient).unwrap(),
                n
            );
        }
    }

    #[test]
    fn out_of_order_submission_saves_nothing() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        let mut session = session();
        session.select_patient(patient);

        // Before the examination is started.
        let err = submit_step(&conn, &mut session, &StepForm::Fundus(NewFundus::default()))
            .unwrap_err();
        assert!(matches!(
            err,
            ExamError::Wizard(WizardError::StepMismatch {
                expected: ExamStep::None,
                submitted: ExamStep::Fundus,
            })
        ));
        assert_eq!(session.wizard.current(), ExamStep::None);
        assert_eq!(repository::count_fundus_for_patient(&conn, patient).unwrap(), 0);

        start_exam(&conn, &mut session).unwrap();
        submit_step(&conn, &mut session, &StepForm::MedicalHistory(NewMedicalHistory::default()))
            .unwrap();

        // Back to an earlier screen.
        let err = submit_step(
            &conn,
            &mut session,
            &StepForm::MedicalHistory(NewMedicalHistory::default()),
        )
        .unwrap_err();
        assert!(matches!(err, ExamError::Wizard(WizardError::StepMismatch { .. })));
        assert_eq!(session.wizard.current(), ExamStep::Refraction);
        assert_eq!(
            repository::count_medical_history_for_patient(&conn, patient).unwrap(),
            1
        );

        // Skipping ahead.
        let err = submit_step(&conn, &mut session, &StepForm::Fundus(NewFundus::default()))
            .unwrap_err();
        assert!(matches!(err, ExamError::Wizard(WizardError::StepMismatch { .. })));
        assert_eq!(session.wizard.current(), ExamStep::Refraction);
        assert_eq!(repository::count_fundus_for_patient(&conn, patient).unwrap(), 0);
    }

    #[test]
    fn invalid_form_neither_saves_nor_advances() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        let mut session = session();
        session.select_patient(patient);
        start_exam(&conn, &mut session).unwrap();
        submit_step(&conn, &mut session, &StepForm::MedicalHistory(NewMedicalHistory::default()))
            .unwrap();

        let bad = StepForm::Refraction(NewRefraction {
            subj_axis_od: Some(190),
            ..Default::default()
        });
        let err = submit_step(&conn, &mut session, &bad).unwrap_err();
        assert!(matches!(
            err,
            ExamError::Save(SaveError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(session.wizard.current(), ExamStep::Refraction);
        assert_eq!(repository::count_refraction_for_patient(&conn, patient).unwrap(), 0);
        // Earlier step is not rolled back.
        assert_eq!(
            repository::count_medical_history_for_patient(&conn, patient).unwrap(),
            1
        );
    }

    #[test]
    fn field_values_do_not_affect_transitions() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        let mut session = session();
        session.select_patient(patient);
        start_exam(&conn, &mut session).unwrap();
        submit_step(&conn, &mut session, &StepForm::MedicalHistory(NewMedicalHistory::default()))
            .unwrap();

        let filled = StepForm::Refraction(NewRefraction {
            subj_sphere_od: Some(-6.5),
            subj_cylinder_od: Some(-2.0),
            subj_axis_od: Some(175),
            ..Default::default()
        });
        let outcome = submit_step(&conn, &mut session, &filled).unwrap();
        assert_eq!(outcome.next_step, ExamStep::FunctionalTests);
    }

    #[test]
    fn submission_requires_selected_patient() {
        let conn = open_memory_database().unwrap();
        let mut session = session();
        let err = submit_step(&conn, &mut session, &all_steps().remove(0)).unwrap_err();
        assert!(matches!(err, ExamError::NoPatientSelected));
        assert!(matches!(
            start_exam(&conn, &mut session),
            Err(ExamError::NoPatientSelected)
        ));
    }

    #[test]
    fn selected_patient_must_exist() {
        let conn = open_memory_database().unwrap();
        let mut session = session();
        session.select_patient(404);
        assert!(matches!(
            start_exam(&conn, &mut session),
            Err(ExamError::PatientNotFound(404))
        ));
    }

    #[test]
    fn finish_before_report_is_rejected() {
        let conn = open_memory_database().unwrap();
        let patient = make_patient(&conn, "P-0001");
        let mut session = session();
        session.select_patient(patient);
        start_exam(&conn, &mut session).unwrap();
        assert!(matches!(
            finish_exam(&mut session),
            Err(ExamError::Wizard(WizardError::NotOnReport(ExamStep::MedicalHistory)))
        ));
    }
}
