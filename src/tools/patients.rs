//! Patient intake MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{Patient, PatientCreate};

#[derive(Debug, Serialize)]
pub struct RegisterPatientResponse {
    pub id: i64,
    pub name: String,
    pub submitted_at: String,
}

#[derive(Debug, Serialize)]
pub struct PatientSummary {
    pub id: i64,
    pub name: String,
    pub birth_date: String,
    pub goal: String,
}

#[derive(Debug, Serialize)]
pub struct ListPatientsResponse {
    pub patients: Vec<PatientSummary>,
    pub total: usize,
}

/// Register a patient's anamnesis for the given nutritionist
pub fn register_patient(
    db: &Database,
    nutritionist_id: i64,
    data: PatientCreate,
) -> Result<RegisterPatientResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let patient = Patient::create(&conn, nutritionist_id, &data)
        .map_err(|e| format!("Failed to register patient: {}", e))?;

    tracing::info!(patient_id = patient.id, nutritionist_id, "Registered patient");

    Ok(RegisterPatientResponse {
        id: patient.id,
        name: patient.name,
        submitted_at: patient.submitted_at,
    })
}

pub fn list_patients(db: &Database, nutritionist_id: i64) -> Result<ListPatientsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let patients = Patient::list_for_nutritionist(&conn, nutritionist_id)
        .map_err(|e| format!("Failed to list patients: {}", e))?;

    let patients: Vec<PatientSummary> = patients
        .into_iter()
        .map(|p| PatientSummary {
            id: p.id,
            name: p.name,
            birth_date: p.birth_date,
            goal: p.goal.as_str().to_string(),
        })
        .collect();

    Ok(ListPatientsResponse {
        total: patients.len(),
        patients,
    })
}

/// Get a patient, only if it belongs to the nutritionist
pub fn get_patient(db: &Database, nutritionist_id: i64, id: i64) -> Result<Option<Patient>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let patient = Patient::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get patient: {}", e))?;

    Ok(patient.filter(|p| p.nutritionist_id == nutritionist_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{sample_patient, Nutritionist, NutritionistCreate};

    #[test]
    fn test_patients_are_scoped_to_nutritionist() {
        let db = test_database();
        let (ana, bia) = db.with_conn(|conn| {
            let mk = |name: &str, email: &str| NutritionistCreate {
                name: name.to_string(),
                email: email.to_string(),
                password: "pw".to_string(),
            };
            Ok((
                Nutritionist::create(conn, &mk("Ana", "ana@clinic.test"))?,
                Nutritionist::create(conn, &mk("Bia", "bia@clinic.test"))?,
            ))
        }).unwrap();

        let registered = register_patient(&db, ana.id, sample_patient()).unwrap();

        assert_eq!(list_patients(&db, ana.id).unwrap().total, 1);
        assert_eq!(list_patients(&db, bia.id).unwrap().total, 0);
        assert!(get_patient(&db, ana.id, registered.id).unwrap().is_some());
        assert!(get_patient(&db, bia.id, registered.id).unwrap().is_none());
    }
}
