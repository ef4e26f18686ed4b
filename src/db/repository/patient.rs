use rusqlite::{params, Connection, OptionalExtension, Row};

use super::now_timestamp;
use crate::db::DatabaseError;
use crate::models::*;

const COLUMNS: &str = "id, patient_code, first_name, last_name, date_of_birth, gender, phone,
     email, address, created_at";

pub fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (patient_code, first_name, last_name, date_of_birth, gender,
         phone, email, address, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            patient.patient_code.trim(),
            patient.first_name.trim(),
            patient.last_name.trim(),
            patient.date_of_birth,
            patient.gender,
            patient.phone,
            patient.email,
            patient.address,
            now_timestamp(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        patient_code: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        date_of_birth: row.get(4)?,
        gender: row.get(5)?,
        phone: row.get(6)?,
        email: row.get(7)?,
        address: row.get(8)?,
        created_at: row.get(9)?,
    })
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM patients WHERE id = ?1");
    Ok(conn
        .query_row(&sql, params![id], patient_from_row)
        .optional()?)
}

pub fn get_patient_by_code(conn: &Connection, code: &str) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM patients WHERE patient_code = ?1");
    Ok(conn
        .query_row(&sql, params![code.trim()], patient_from_row)
        .optional()?)
}

/// Patients ordered by surname, paged.
pub fn list_patients(conn: &Connection, limit: u32, offset: u32) -> Result<Vec<Patient>, DatabaseError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM patients ORDER BY last_name, first_name, id LIMIT ?1 OFFSET ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit, offset], patient_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// `%query%` with LIKE wildcards in the query matched literally.
fn contains_pattern(query: &str) -> String {
    let mut pattern = String::from("%");
    for c in query.trim().to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring match on code, first name, or last name.
pub fn search_patients(conn: &Connection, query: &str, limit: u32) -> Result<Vec<Patient>, DatabaseError> {
    let pattern = contains_pattern(query);
    let sql = format!(
        "SELECT {COLUMNS} FROM patients
         WHERE lower(patient_code) LIKE ?1 ESCAPE '\\'
            OR lower(first_name) LIKE ?1 ESCAPE '\\'
            OR lower(last_name) LIKE ?1 ESCAPE '\\'
            OR lower(first_name || ' ' || last_name) LIKE ?1 ESCAPE '\\'
         ORDER BY last_name, first_name, id LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![pattern, limit], patient_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Most recently registered patients first.
pub fn recent_patients(conn: &Connection, limit: u32) -> Result<Vec<Patient>, DatabaseError> {
    let sql = format!("SELECT {COLUMNS} FROM patients ORDER BY created_at DESC, id DESC LIMIT ?1");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![limit], patient_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::new_patient;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn insert_and_fetch_by_code() {
        let conn = open_memory_database().unwrap();
        let id = insert_patient(&conn, &new_patient("P-0001")).unwrap();
        let patient = get_patient_by_code(&conn, "P-0001").unwrap().unwrap();
        assert_eq!(patient.id, id);
        assert_eq!(patient.full_name(), "Test Patient");
        assert_eq!(get_patient(&conn, id).unwrap().unwrap().patient_code, "P-0001");
    }

    #[test]
    fn duplicate_code_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        insert_patient(&conn, &new_patient("P-0001")).unwrap();
        let err = insert_patient(&conn, &new_patient("P-0001")).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
        assert_eq!(count_patients(&conn).unwrap(), 1);
    }

    #[test]
    fn missing_patient_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_patient(&conn, 42).unwrap().is_none());
        assert!(get_patient_by_code(&conn, "P-9999").unwrap().is_none());
    }

    #[test]
    fn search_matches_code_and_name() {
        let conn = open_memory_database().unwrap();
        let mut grace = new_patient("P-0001");
        grace.first_name = "Grace".into();
        grace.last_name = "Hopper".into();
        insert_patient(&conn, &grace).unwrap();
        insert_patient(&conn, &new_patient("P-0002")).unwrap();

        assert_eq!(search_patients(&conn, "hopp", 10).unwrap().len(), 1);
        assert_eq!(search_patients(&conn, "grace hopper", 10).unwrap().len(), 1);
        assert_eq!(search_patients(&conn, "p-000", 10).unwrap().len(), 2);
        assert!(search_patients(&conn, "nobody", 10).unwrap().is_empty());
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let conn = open_memory_database().unwrap();
        let mut underscored = new_patient("P-0001");
        underscored.last_name = "O_Neil".into();
        insert_patient(&conn, &underscored).unwrap();
        let mut plain = new_patient("P-0002");
        plain.last_name = "OXNeil".into();
        insert_patient(&conn, &plain).unwrap();

        let hits = search_patients(&conn, "o_n", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].last_name, "O_Neil");
        assert!(search_patients(&conn, "%", 10).unwrap().is_empty());
        assert_eq!(search_patients(&conn, "neil", 10).unwrap().len(), 2);
    }

    #[test]
    fn recent_lists_newest_first() {
        let conn = open_memory_database().unwrap();
        insert_patient(&conn, &new_patient("P-0001")).unwrap();
        insert_patient(&conn, &new_patient("P-0002")).unwrap();
        let recent = recent_patients(&conn, 1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].patient_code, "P-0002");
    }
}
