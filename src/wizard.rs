//! Exam wizard: the cursor over the eight linear examination screens.
//!
//! The wizard owns no clinical data. Each step persists its own row; the
//! cursor only records which screen is current. A save is accepted only on
//! the screen the cursor points at, and the next screen comes from a fixed
//! table, so field values can never influence the path.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStep {
    #[default]
    None,
    MedicalHistory,
    Refraction,
    FunctionalTests,
    AnteriorSegment,
    Fundus,
    Groups,
    Report,
}

impl ExamStep {
    /// Every state, in wizard order.
    pub const SEQUENCE: [ExamStep; 8] = [
        Self::None,
        Self::MedicalHistory,
        Self::Refraction,
        Self::FunctionalTests,
        Self::AnteriorSegment,
        Self::Fundus,
        Self::Groups,
        Self::Report,
    ];

    /// Transition table: the screen that follows a successful save of `self`.
    /// `None` and `Report` have no save action and therefore no successor.
    pub const fn next(self) -> Option<ExamStep> {
        match self {
            Self::MedicalHistory => Some(Self::Refraction),
            Self::Refraction => Some(Self::FunctionalTests),
            Self::FunctionalTests => Some(Self::AnteriorSegment),
            Self::AnteriorSegment => Some(Self::Fundus),
            Self::Fundus => Some(Self::Groups),
            Self::Groups => Some(Self::Report),
            Self::None | Self::Report => None,
        }
    }

    /// Steps that persist a form.
    pub const fn is_form_step(self) -> bool {
        self.next().is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::MedicalHistory => "medical_history",
            Self::Refraction => "refraction",
            Self::FunctionalTests => "functional_tests",
            Self::AnteriorSegment => "anterior_segment",
            Self::Fundus => "fundus",
            Self::Groups => "groups",
            Self::Report => "report",
        }
    }

    /// Index in [`Self::SEQUENCE`]; `None` is 0.
    pub fn position(self) -> usize {
        Self::SEQUENCE
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for ExamStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("{0} has no form to save")]
    NotAFormStep(ExamStep),
    #[error("the report can only be completed from the report screen (current: {0})")]
    NotOnReport(ExamStep),
    #[error("cannot save {submitted} while the examination is at {expected}")]
    StepMismatch {
        expected: ExamStep,
        submitted: ExamStep,
    },
}

/// Session-local wizard cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExamWizard {
    cursor: ExamStep,
}

impl ExamWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ExamStep {
        self.cursor
    }

    pub fn is_active(&self) -> bool {
        self.cursor != ExamStep::None
    }

    /// Begin (or restart) an examination at the first screen.
    pub fn start(&mut self) -> ExamStep {
        self.cursor = ExamStep::MedicalHistory;
        self.cursor
    }

    /// Check that `submitted` is the screen the cursor is on.
    pub fn accepts(&self, submitted: ExamStep) -> Result<ExamStep, WizardError> {
        let next = submitted
            .next()
            .ok_or(WizardError::NotAFormStep(submitted))?;
        if submitted != self.cursor {
            return Err(WizardError::StepMismatch {
                expected: self.cursor,
                submitted,
            });
        }
        Ok(next)
    }

    /// Apply the transition for a successful save of `saved`.
    pub fn record_save(&mut self, saved: ExamStep) -> Result<ExamStep, WizardError> {
        let next = self.accepts(saved)?;
        self.cursor = next;
        Ok(next)
    }

    /// Completion action of the terminal `Report` screen: back to `None`.
    pub fn finish(&mut self) -> Result<(), WizardError> {
        if self.cursor != ExamStep::Report {
            return Err(WizardError::NotOnReport(self.cursor));
        }
        self.cursor = ExamStep::None;
        Ok(())
    }

    /// Abandon the examination without completing it.
    pub fn reset(&mut self) {
        self.cursor = ExamStep::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_walk_follows_fixed_sequence() {
        let mut wizard = ExamWizard::new();
        assert_eq!(wizard.current(), ExamStep::None);
        assert_eq!(wizard.start(), ExamStep::MedicalHistory);

        for pair in ExamStep::SEQUENCE[1..].windows(2) {
            let (current, expected) = (pair[0], pair[1]);
            assert_eq!(wizard.current(), current);
            assert_eq!(wizard.record_save(current).unwrap(), expected);
        }

        assert_eq!(wizard.current(), ExamStep::Report);
        wizard.finish().unwrap();
        assert_eq!(wizard.current(), ExamStep::None);
        assert!(!wizard.is_active());
    }

    #[test]
    fn transition_table_is_linear_and_total_over_form_steps() {
        let form_steps: Vec<_> = ExamStep::SEQUENCE
            .iter()
            .copied()
            .filter(|s| s.is_form_step())
            .collect();
        assert_eq!(form_steps.len(), 6);
        for step in form_steps {
            assert_eq!(step.next().unwrap().position(), step.position() + 1);
        }
    }

    #[test]
    fn repeated_save_after_restart_fires_transition_each_time() {
        let mut wizard = ExamWizard::new();
        wizard.start();
        assert_eq!(wizard.record_save(ExamStep::MedicalHistory).unwrap(), ExamStep::Refraction);
        wizard.start();
        assert_eq!(wizard.record_save(ExamStep::MedicalHistory).unwrap(), ExamStep::Refraction);
        assert_eq!(wizard.current(), ExamStep::Refraction);
    }

    #[test]
    fn save_off_the_current_screen_is_rejected() {
        let mut wizard = ExamWizard::new();
        assert_eq!(
            wizard.record_save(ExamStep::Fundus),
            Err(WizardError::StepMismatch {
                expected: ExamStep::None,
                submitted: ExamStep::Fundus,
            })
        );
        assert_eq!(wizard.current(), ExamStep::None);

        wizard.start();
        wizard.record_save(ExamStep::MedicalHistory).unwrap();
        assert_eq!(
            wizard.record_save(ExamStep::MedicalHistory),
            Err(WizardError::StepMismatch {
                expected: ExamStep::Refraction,
                submitted: ExamStep::MedicalHistory,
            })
        );
        assert_eq!(
            wizard.record_save(ExamStep::Fundus),
            Err(WizardError::StepMismatch {
                expected: ExamStep::Refraction,
                submitted: ExamStep::Fundus,
            })
        );
        assert_eq!(wizard.current(), ExamStep::Refraction);
    }

    #[test]
    fn none_and_report_cannot_be_saved() {
        let mut wizard = ExamWizard::new();
        assert_eq!(
            wizard.record_save(ExamStep::None),
            Err(WizardError::NotAFormStep(ExamStep::None))
        );
        assert_eq!(
            wizard.record_save(ExamStep::Report),
            Err(WizardError::NotAFormStep(ExamStep::Report))
        );
        assert_eq!(wizard.current(), ExamStep::None);
    }

    #[test]
    fn finish_only_from_report() {
        let mut wizard = ExamWizard::new();
        wizard.start();
        assert_eq!(
            wizard.finish(),
            Err(WizardError::NotOnReport(ExamStep::MedicalHistory))
        );
        assert_eq!(wizard.current(), ExamStep::MedicalHistory);
    }

    #[test]
    fn start_restarts_from_first_screen() {
        let mut wizard = ExamWizard::new();
        wizard.start();
        wizard.record_save(ExamStep::MedicalHistory).unwrap();
        wizard.record_save(ExamStep::Refraction).unwrap();
        assert_eq!(wizard.start(), ExamStep::MedicalHistory);
    }

    #[test]
    fn steps_serialize_as_snake_case() {
        let json = serde_json::to_string(&ExamStep::FunctionalTests).unwrap();
        assert_eq!(json, "\"functional_tests\"");
        for step in ExamStep::SEQUENCE {
            assert_eq!(serde_json::to_string(&step).unwrap(), format!("\"{step}\""));
        }
    }
}
