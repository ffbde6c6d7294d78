//! Nutritionist model
//!
//! Clinic users. Login compares the submitted credentials to this table.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// A clinic user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nutritionist {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

/// Data for creating a nutritionist
#[derive(Debug, Clone, Deserialize)]
pub struct NutritionistCreate {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Nutritionist {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &NutritionistCreate) -> DbResult<Self> {
        let name = data.name.trim();
        let email = data.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(DbError::Invalid("Name and email are required".to_string()));
        }
        if data.password.is_empty() {
            return Err(DbError::Invalid("Password must not be empty".to_string()));
        }

        conn.execute(
            "INSERT INTO nutritionists (name, email, password) VALUES (?1, ?2, ?3)",
            params![name, email, data.password],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, email, created_at FROM nutritionists WHERE id = ?1",
        )?;

        match stmt.query_row([id], Self::from_row) {
            Ok(n) => Ok(Some(n)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Find the nutritionist whose email and password both match
    pub fn find_by_credentials(conn: &Connection, email: &str, password: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, email, created_at FROM nutritionists WHERE email = ?1 AND password = ?2",
        )?;

        match stmt.query_row(params![email.trim(), password], Self::from_row) {
            Ok(n) => Ok(Some(n)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    #[test]
    fn test_credentials() {
        let db = test_database();
        let conn = db.get_conn().unwrap();

        let created = Nutritionist::create(&conn, &NutritionistCreate {
            name: "Ana Souza".to_string(),
            email: "ana@clinic.test".to_string(),
            password: "s3cret".to_string(),
        }).unwrap();

        let found = Nutritionist::find_by_credentials(&conn, "ana@clinic.test", "s3cret").unwrap();
        assert_eq!(found.map(|n| n.id), Some(created.id));
        assert!(Nutritionist::find_by_credentials(&conn, "ana@clinic.test", "wrong").unwrap().is_none());
        assert!(Nutritionist::find_by_credentials(&conn, "bob@clinic.test", "s3cret").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = test_database();
        let conn = db.get_conn().unwrap();
        let data = NutritionistCreate {
            name: "Ana".to_string(),
            email: "ana@clinic.test".to_string(),
            password: "x".to_string(),
        };
        Nutritionist::create(&conn, &data).unwrap();
        assert!(Nutritionist::create(&conn, &data).is_err());
    }
}
