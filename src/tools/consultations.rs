//! Consultation MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{Consultation, ConsultationCreate};
use crate::tools::patients::get_patient;

#[derive(Debug, Serialize)]
pub struct LogConsultationResponse {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub consulted_at: String,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListConsultationsResponse {
    pub patient_id: i64,
    pub consultations: Vec<Consultation>,
}

/// Log a consultation for one of the nutritionist's patients
pub fn log_consultation(
    db: &Database,
    nutritionist_id: i64,
    data: ConsultationCreate,
) -> Result<LogConsultationResponse, String> {
    let patient = get_patient(db, nutritionist_id, data.patient_id)?
        .ok_or_else(|| format!("Patient not found with id: {}", data.patient_id))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let consultation = Consultation::create(&conn, &data)
        .map_err(|e| format!("Failed to log consultation: {}", e))?;

    tracing::info!(consultation_id = consultation.id, patient_id = patient.id, "Logged consultation");

    Ok(LogConsultationResponse {
        id: consultation.id,
        patient_id: patient.id,
        patient_name: patient.name,
        consulted_at: consultation.consulted_at,
        return_date: consultation.return_date,
        return_time: consultation.return_time,
    })
}

pub fn list_consultations(
    db: &Database,
    nutritionist_id: i64,
    patient_id: i64,
) -> Result<ListConsultationsResponse, String> {
    get_patient(db, nutritionist_id, patient_id)?
        .ok_or_else(|| format!("Patient not found with id: {}", patient_id))?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let consultations = Consultation::list_for_patient(&conn, patient_id)
        .map_err(|e| format!("Failed to list consultations: {}", e))?;

    Ok(ListConsultationsResponse {
        patient_id,
        consultations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{sample_patient, Nutritionist, NutritionistCreate};
    use crate::tools::patients::register_patient;

    #[test]
    fn test_log_and_list() {
        let db = test_database();
        let ana = db.with_conn(|conn| {
            Nutritionist::create(conn, &NutritionistCreate {
                name: "Ana".to_string(),
                email: "ana@clinic.test".to_string(),
                password: "pw".to_string(),
            })
        }).unwrap();
        let patient = register_patient(&db, ana.id, sample_patient()).unwrap();

        let logged = log_consultation(&db, ana.id, ConsultationCreate {
            patient_id: patient.id,
            complaints: "Bloating after dinner".to_string(),
            conduct: "Reduce fermentable carbs".to_string(),
            return_date: Some("2026-11-20".to_string()),
            return_time: Some("14:00".to_string()),
            ..Default::default()
        }).unwrap();
        assert_eq!(logged.patient_name, "Maria Silva");

        let listed = list_consultations(&db, ana.id, patient.id).unwrap();
        assert_eq!(listed.consultations.len(), 1);
        assert_eq!(listed.consultations[0].return_time.as_deref(), Some("14:00"));
    }

    #[test]
    fn test_unknown_patient_rejected() {
        let db = test_database();
        let result = log_consultation(&db, 1, ConsultationCreate {
            patient_id: 99,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
