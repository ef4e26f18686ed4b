use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::*;

fn working_hours_from_row(row: &Row<'_>) -> rusqlite::Result<WorkingHours> {
    Ok(WorkingHours {
        weekday: row.get(0)?,
        start_time: row.get(1)?,
        end_time: row.get(2)?,
        is_working_day: row.get::<_, i32>(3)? != 0,
    })
}

/// All seven weekday rows, Monday first.
pub fn get_working_hours(conn: &Connection) -> Result<Vec<WorkingHours>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT weekday, start_time, end_time, is_working_day FROM working_hours ORDER BY weekday",
    )?;
    let rows = stmt.query_map([], working_hours_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Row for one weekday (0 = Monday).
pub fn get_working_hours_for(conn: &Connection, weekday: u8) -> Result<Option<WorkingHours>, DatabaseError> {
    Ok(conn
        .query_row(
            "SELECT weekday, start_time, end_time, is_working_day FROM working_hours
             WHERE weekday = ?1",
            params![weekday],
            working_hours_from_row,
        )
        .optional()?)
}
