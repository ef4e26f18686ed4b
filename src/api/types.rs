//! Shared types for the API layer.

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::auth::AuthenticatedUser;
use crate::core_state::CoreState;
use crate::session::SessionContext;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Run `f` against the caller's session. Fails with 401 once the session is gone.
    pub fn with_session<T>(
        &self,
        token: &SessionToken,
        f: impl FnOnce(&SessionContext) -> T,
    ) -> Result<T, ApiError> {
        let sessions = self.core.read_sessions()?;
        let session = sessions.get(&token.0).ok_or(ApiError::Unauthorized)?;
        Ok(f(session))
    }

    /// Mutable variant of [`with_session`](Self::with_session).
    ///
    /// Handlers that also need the database lock it before calling this.
    pub fn with_session_mut<T>(
        &self,
        token: &SessionToken,
        f: impl FnOnce(&mut SessionContext) -> T,
    ) -> Result<T, ApiError> {
        let mut sessions = self.core.write_sessions()?;
        let session = sessions.get_mut(&token.0).ok_or(ApiError::Unauthorized)?;
        Ok(f(session))
    }
}

// ═══════════════════════════════════════════════════════════
// Request extensions: injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Bearer token of the current request.
#[derive(Clone)]
pub struct SessionToken(pub String);

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Identity of the logged-in operator for the current request.
#[derive(Debug, Clone)]
pub struct Operator(pub AuthenticatedUser);

impl Operator {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.0.role == crate::models::enums::UserRole::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}
