//! Login MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::models::Nutritionist;
use crate::session::{AuthError, ClinicSession, LoggedIn};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub nutritionist_id: i64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub logged_in: bool,
    pub user: Option<LoggedIn>,
    pub diet_patient_id: Option<i64>,
    pub diet_entries: usize,
}

/// Check credentials and record the login on the session
pub fn login(
    db: &Database,
    session: &mut ClinicSession,
    email: &str,
    password: &str,
) -> Result<LoginResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let nutritionist = Nutritionist::find_by_credentials(&conn, email, password)
        .map_err(|e| format!("Failed to check credentials: {}", e))?;

    match nutritionist {
        Some(n) => {
            session.log_in(&n);
            tracing::info!(nutritionist_id = n.id, "Nutritionist logged in");
            Ok(LoginResponse {
                nutritionist_id: n.id,
                name: n.name,
            })
        }
        None => {
            tracing::warn!("Rejected login attempt");
            Err(AuthError::InvalidCredentials.to_string())
        }
    }
}

pub fn logout(session: &mut ClinicSession) -> WhoAmIResponse {
    session.log_out();
    whoami(session)
}

pub fn whoami(session: &ClinicSession) -> WhoAmIResponse {
    WhoAmIResponse {
        logged_in: session.user().is_some(),
        user: session.user().cloned(),
        diet_patient_id: session.diet_patient.as_ref().map(|p| p.id),
        diet_entries: session.ledger.entry_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::NutritionistCreate;
    use crate::session::DietPatient;

    #[test]
    fn test_login_and_logout() {
        let db = test_database();
        db.with_conn(|conn| {
            Nutritionist::create(conn, &NutritionistCreate {
                name: "Ana".to_string(),
                email: "ana@clinic.test".to_string(),
                password: "pw".to_string(),
            })
        }).unwrap();

        let mut session = ClinicSession::new();
        assert!(login(&db, &mut session, "ana@clinic.test", "nope").is_err());
        assert!(!whoami(&session).logged_in);

        let resp = login(&db, &mut session, "ana@clinic.test", "pw").unwrap();
        assert_eq!(resp.name, "Ana");
        assert!(whoami(&session).logged_in);

        assert!(!logout(&mut session).logged_in);
    }

    #[test]
    fn test_failed_login_keeps_current_session() {
        let db = test_database();
        db.with_conn(|conn| {
            Nutritionist::create(conn, &NutritionistCreate {
                name: "Ana".to_string(),
                email: "ana@clinic.test".to_string(),
                password: "pw".to_string(),
            })
        }).unwrap();

        let mut session = ClinicSession::new();
        let resp = login(&db, &mut session, "ana@clinic.test", "pw").unwrap();
        session.start_diet(DietPatient { id: 7, name: "Maria".to_string() });

        let err = login(&db, &mut session, "ana@clinic.test", "pw2").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials.to_string());

        let state = whoami(&session);
        assert!(state.logged_in);
        assert_eq!(state.user.map(|u| u.nutritionist_id), Some(resp.nutritionist_id));
        assert_eq!(state.diet_patient_id, Some(7));
    }
}
