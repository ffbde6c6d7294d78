//! Consultation model
//!
//! Notes taken during a patient visit, with an optional return appointment.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: i64,
    pub patient_id: i64,
    pub consulted_at: String,
    pub complaints: String,
    pub conduct: String,
    pub guidance: String,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsultationCreate {
    pub patient_id: i64,
    pub complaints: String,
    pub conduct: String,
    pub guidance: String,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
}

impl ConsultationCreate {
    /// Normalised (return_date, return_time)
    fn return_appointment(&self) -> DbResult<(Option<String>, Option<String>)> {
        let date = self
            .return_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .map_err(|_| DbError::Invalid(format!("Invalid return date '{}', expected YYYY-MM-DD", s)))
            })
            .transpose()?;

        let time = self
            .return_time
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                NaiveTime::parse_from_str(s, "%H:%M")
                    .map(|t| t.format("%H:%M").to_string())
                    .map_err(|_| DbError::Invalid(format!("Invalid return time '{}', expected HH:MM", s)))
            })
            .transpose()?;

        if time.is_some() && date.is_none() {
            return Err(DbError::Invalid("A return time needs a return date".to_string()));
        }

        Ok((date, time))
    }
}

impl Consultation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            patient_id: row.get("patient_id")?,
            consulted_at: row.get("consulted_at")?,
            complaints: row.get("complaints")?,
            conduct: row.get("conduct")?,
            guidance: row.get("guidance")?,
            return_date: row.get("return_date")?,
            return_time: row.get("return_time")?,
        })
    }

    pub fn create(conn: &Connection, data: &ConsultationCreate) -> DbResult<Self> {
        let (return_date, return_time) = data.return_appointment()?;
        let consulted_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        conn.execute(
            r#"
            INSERT INTO consultations (
                patient_id, consulted_at, complaints, conduct, guidance, return_date, return_time
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.patient_id,
                consulted_at,
                data.complaints.trim(),
                data.conduct.trim(),
                data.guidance.trim(),
                return_date,
                return_time,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM consultations WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Consultations for a patient, newest first
    pub fn list_for_patient(conn: &Connection, patient_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM consultations WHERE patient_id = ?1 ORDER BY consulted_at DESC, id DESC",
        )?;

        let consultations = stmt
            .query_map([patient_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(consultations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_appointment() {
        let data = ConsultationCreate {
            return_date: Some("2026-11-03".to_string()),
            return_time: Some("9:30".to_string()),
            ..Default::default()
        };
        let (date, time) = data.return_appointment().unwrap();
        assert_eq!(date.as_deref(), Some("2026-11-03"));
        assert_eq!(time.as_deref(), Some("09:30"));

        let none = ConsultationCreate {
            return_date: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(none.return_appointment().unwrap(), (None, None));
    }

    #[test]
    fn test_return_appointment_rejects_bad_input() {
        let time_only = ConsultationCreate {
            return_time: Some("10:00".to_string()),
            ..Default::default()
        };
        assert!(time_only.return_appointment().is_err());

        let bad_date = ConsultationCreate {
            return_date: Some("03/11/2026".to_string()),
            ..Default::default()
        };
        assert!(bad_date.return_appointment().is_err());

        let bad_time = ConsultationCreate {
            return_date: Some("2026-11-03".to_string()),
            return_time: Some("25:00".to_string()),
            ..Default::default()
        };
        assert!(bad_time.return_appointment().is_err());
    }
}
