//! Lead model
//!
//! Prospective patients who filled in the public pre-anamnesis form.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::Goal;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub nutritionist_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub goal: Goal,
    pub extra_info: Option<String>,
    pub submitted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadCreate {
    pub nutritionist_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub goal: Goal,
    pub extra_info: Option<String>,
}

impl Lead {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            nutritionist_id: row.get("nutritionist_id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            goal: Goal::from_str(&row.get::<_, String>("goal")?),
            extra_info: row.get("extra_info")?,
            submitted_at: row.get("submitted_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &LeadCreate) -> DbResult<Self> {
        if data.name.trim().is_empty() {
            return Err(DbError::Invalid("Name is required".to_string()));
        }

        let phone = data.phone.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let extra_info = data.extra_info.as_deref().map(str::trim).filter(|s| !s.is_empty());

        conn.execute(
            r#"
            INSERT INTO leads (nutritionist_id, name, email, phone, goal, extra_info)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.nutritionist_id,
                data.name.trim(),
                data.email.trim(),
                phone,
                data.goal.as_str(),
                extra_info,
            ],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare("SELECT * FROM leads WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row)?)
    }

    /// Leads for a nutritionist, newest first
    pub fn list_for_nutritionist(conn: &Connection, nutritionist_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM leads WHERE nutritionist_id = ?1 ORDER BY submitted_at DESC, id DESC",
        )?;

        let leads = stmt
            .query_map([nutritionist_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(leads)
    }
}
