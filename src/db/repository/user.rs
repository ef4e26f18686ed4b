use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::now_timestamp;
use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::*;

const COLUMNS: &str = "id, username, password_hash, role, created_at, expires_at";

/// Insert a user with an already-computed password digest.
pub fn insert_user(
    conn: &Connection,
    username: &str,
    password_hash: &str,
    role: UserRole,
    expires_at: Option<NaiveDateTime>,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO users (username, password_hash, role, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![username, password_hash, role, now_timestamp(), expires_at],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
        expires_at: row.get(5)?,
    })
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE username = ?1");
    Ok(conn
        .query_row(&sql, params![username], user_from_row)
        .optional()?)
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM users ORDER BY username");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], user_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
