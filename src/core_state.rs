//! Shared application state.
//!
//! `CoreState` is created once at startup and shared (via `Arc`) by every
//! request handler. It owns the single SQLite connection and the table of
//! logged-in sessions.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db;
use crate::session::SessionStore;

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: AppConfig,
    /// Held for the duration of one handler's queries.
    db: Mutex<Connection>,
    sessions: RwLock<SessionStore>,
}

impl CoreState {
    /// Open (creating if needed) the clinic database under the configured data directory.
    pub fn open(config: AppConfig) -> Result<Self, CoreError> {
        std::fs::create_dir_all(&config.data_dir)?;
        std::fs::create_dir_all(config.upload_dir())?;
        let conn = db::open_database(&config.db_path())?;
        tracing::info!(path = %config.db_path().display(), "Clinic database opened");
        Ok(Self::with_connection(config, conn))
    }

    /// State backed by an in-memory database. Uploads still go to `config.upload_dir()`.
    pub fn in_memory(config: AppConfig) -> Result<Self, CoreError> {
        let conn = db::open_memory_database()?;
        Ok(Self::with_connection(config, conn))
    }

    fn with_connection(config: AppConfig, conn: Connection) -> Self {
        Self {
            config,
            db: Mutex::new(conn),
            sessions: RwLock::new(SessionStore::new()),
        }
    }

    // ── Database ────────────────────────────────────────────

    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }

    // ── Sessions ────────────────────────────────────────────

    pub fn read_sessions(&self) -> Result<RwLockReadGuard<'_, SessionStore>, CoreError> {
        self.sessions.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_sessions(&self) -> Result<RwLockWriteGuard<'_, SessionStore>, CoreError> {
        self.sessions.write().map_err(|_| CoreError::LockPoisoned)
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::models::enums::UserRole;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: 1,
            username: "admin".into(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn in_memory_state_has_seeded_schema() {
        let state = CoreState::in_memory(AppConfig::with_data_dir("/tmp/unused")).unwrap();
        let conn = state.lock_db().unwrap();
        assert_eq!(db::sqlite::get_current_version(&conn), 1);
    }

    #[test]
    fn open_creates_data_and_upload_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::with_data_dir(dir.path().join("clinic"));
        let state = CoreState::open(config).unwrap();
        assert!(state.config.db_path().exists());
        assert!(state.config.upload_dir().is_dir());
    }

    #[test]
    fn sessions_start_empty_and_persist_across_guards() {
        let state = CoreState::in_memory(AppConfig::with_data_dir("/tmp/unused")).unwrap();
        assert!(state.read_sessions().unwrap().is_empty());

        let token = {
            let mut sessions = state.write_sessions().unwrap();
            let (token, _) = sessions.create(user());
            token
        };
        let sessions = state.read_sessions().unwrap();
        assert_eq!(sessions.get(&token).unwrap().user.username, "admin");
    }
}
