//! Operator authentication: password digests, credential checks, account expiry.
//!
//! Digests are PBKDF2-HMAC-SHA256 with a per-user random salt, stored as
//! `pbkdf2-sha256$<iterations>$<salt>$<hash>` (base64, no padding). The
//! iteration count travels with the digest, so raising it later leaves
//! existing accounts verifiable.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use chrono::NaiveDateTime;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rusqlite::Connection;
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::db::repository;
use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::validation::{require, SaveError, ValidationError};

const DIGEST_SCHEME: &str = "pbkdf2-sha256";
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[cfg(not(test))]
pub const PBKDF2_ITERATIONS: u32 = 100_000;
#[cfg(test)]
pub const PBKDF2_ITERATIONS: u32 = 1_000;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Account expired")]
    AccountExpired,
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

/// Derive a storable digest for `password` with a fresh salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "{DIGEST_SCHEME}${PBKDF2_ITERATIONS}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    )
}

/// Check `password` against a stored digest. Malformed digests never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(DIGEST_SCHEME), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(hash))
    else {
        return false;
    };
    if iterations == 0 || expected.len() != HASH_LENGTH {
        return false;
    }
    let actual = derive(password, &salt, iterations);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

/// Succeeds iff the user exists, the digest matches, and the account has not expired at `now`.
pub fn authenticate(
    conn: &Connection,
    username: &str,
    password: &str,
    now: NaiveDateTime,
) -> Result<AuthenticatedUser, AuthError> {
    let user = repository::get_user_by_username(conn, username.trim())?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials);
    }
    if user.is_expired(now) {
        return Err(AuthError::AccountExpired);
    }

    Ok(AuthenticatedUser {
        user_id: user.id,
        username: user.username,
        role: user.role,
    })
}

/// Create an operator account. Usernames are unique.
pub fn create_user(
    conn: &Connection,
    username: &str,
    password: &str,
    role: UserRole,
    expires_at: Option<NaiveDateTime>,
) -> Result<i64, SaveError> {
    require("username", username)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::Invalid {
            field: "password",
            reason: format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        }
        .into());
    }
    let digest = hash_password(password);
    Ok(repository::insert_user(conn, username.trim(), &digest, role, expires_at)?)
}
