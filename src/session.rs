//! Operator sessions.
//!
//! A `SessionContext` is created at login and destroyed at logout. It holds
//! everything that used to be ambient UI state: who is logged in, which
//! patient is selected, which menu is active, and the exam wizard cursor.
//! Sessions live only in memory; a restart logs everyone out and silently
//! drops any wizard in progress (saved rows remain).
//!
//! Bearer tokens are never stored. The store keys sessions by the SHA-256
//! of the token.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::models::enums::UserRole;
use crate::wizard::ExamWizard;

/// Top-level menu the operator is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveMenu {
    #[default]
    Dashboard,
    Patients,
    Examination,
    ContactLenses,
    Appointments,
    Settings,
}

/// Per-login interaction state.
#[derive(Debug, Clone, Serialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub user: AuthenticatedUser,
    pub selected_patient: Option<i64>,
    pub active_menu: ActiveMenu,
    pub wizard: ExamWizard,
    pub created_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(user: AuthenticatedUser) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user,
            selected_patient: None,
            active_menu: ActiveMenu::Dashboard,
            wizard: ExamWizard::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == UserRole::Admin
    }

    /// Select a patient. Switching to a different patient abandons any
    /// examination in progress so later steps cannot land on the wrong record.
    pub fn select_patient(&mut self, patient_id: i64) {
        if self.selected_patient != Some(patient_id) {
            self.wizard.reset();
        }
        self.selected_patient = Some(patient_id);
    }

    pub fn navigate(&mut self, menu: ActiveMenu) {
        self.active_menu = menu;
    }
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// All live sessions, keyed by token hash.
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<[u8; 32], SessionContext>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `user`. Returns the bearer token; only its hash is kept.
    pub fn create(&mut self, user: AuthenticatedUser) -> (String, &SessionContext) {
        let token = generate_token();
        let context = self
            .sessions
            .entry(hash_token(&token))
            .or_insert_with(|| SessionContext::new(user));
        (token, context)
    }

    pub fn get(&self, token: &str) -> Option<&SessionContext> {
        self.sessions.get(&hash_token(token))
    }

    pub fn get_mut(&mut self, token: &str) -> Option<&mut SessionContext> {
        self.sessions.get_mut(&hash_token(token))
    }

    /// Destroy a session (logout). Returns the removed context.
    pub fn remove(&mut self, token: &str) -> Option<SessionContext> {
        self.sessions.remove(&hash_token(token))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::ExamStep;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: 1,
            username: "admin".into(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn create_get_remove_lifecycle() {
        let mut store = SessionStore::new();
        let (token, ctx) = store.create(user());
        assert_eq!(ctx.active_menu, ActiveMenu::Dashboard);
        assert!(ctx.selected_patient.is_none());

        assert!(store.get(&token).is_some());
        assert!(store.get("not-a-token").is_none());

        let removed = store.remove(&token).unwrap();
        assert_eq!(removed.user.username, "admin");
        assert!(store.get(&token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn each_login_gets_its_own_session() {
        let mut store = SessionStore::new();
        let (a, _) = store.create(user());
        let (b, _) = store.create(user());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        store.get_mut(&a).unwrap().select_patient(7);
        assert_eq!(store.get(&a).unwrap().selected_patient, Some(7));
        assert_eq!(store.get(&b).unwrap().selected_patient, None);
    }

    #[test]
    fn switching_patient_resets_wizard() {
        let mut ctx = SessionContext::new(user());
        ctx.select_patient(1);
        ctx.wizard.start();
        ctx.select_patient(1);
        assert_eq!(ctx.wizard.current(), ExamStep::MedicalHistory);
        ctx.select_patient(2);
        assert_eq!(ctx.wizard.current(), ExamStep::None);
    }

    #[test]
    fn token_hash_is_deterministic() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }

    #[test]
    fn generated_token_is_url_safe() {
        let token = generate_token();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
