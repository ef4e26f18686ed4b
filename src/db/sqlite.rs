use std::path::Path;

use rusqlite::Connection;

use super::DatabaseError;
use crate::auth;
use crate::models::enums::UserRole;

/// Seeded administrator credential, created when the users table is empty.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Open a SQLite connection to the given path, run migrations and seed defaults
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    seed_defaults(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    seed_defaults(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;"
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
pub fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Insert the default administrator when no user exists yet.
/// Working hours are seeded by the initial migration.
pub fn seed_defaults(conn: &Connection) -> Result<(), DatabaseError> {
    let users: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if users == 0 {
        auth::create_user(
            conn,
            DEFAULT_ADMIN_USERNAME,
            DEFAULT_ADMIN_PASSWORD,
            UserRole::Admin,
            None,
        )
        .map_err(|e| DatabaseError::MigrationFailed {
            version: 0,
            reason: format!("seeding default admin: {e}"),
        })?;
        tracing::info!("Seeded default administrator account");
    }
    Ok(())
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // schema_version + users + patients + 7 clinical tables + appointments + working_hours
        let count = count_tables(&conn).unwrap();
        assert_eq!(count, 12);
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        assert!(run_migrations(&conn).is_ok());
        assert!(seed_defaults(&conn).is_ok());
    }

    #[test]
    fn foreign_keys_enabled() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn default_admin_seeded_once() {
        let conn = open_memory_database().unwrap();
        seed_defaults(&conn).unwrap();
        let admins: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE username = 'admin' AND role = 'admin'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(admins, 1);
    }

    #[test]
    fn working_hours_seeded_for_every_weekday() {
        let conn = open_memory_database().unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM working_hours", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 7);
    }

    #[test]
    fn file_database_reopens_without_reseeding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.db");
        drop(open_database(&path).unwrap());
        let conn = open_database(&path).unwrap();
        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 1);
    }
}
