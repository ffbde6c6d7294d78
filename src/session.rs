//! Clinic session
//!
//! State owned by one client connection: who is logged in, and the diet
//! being prescribed. Nothing here is shared between connections.

use serde::Serialize;
use thiserror::Error;

use crate::diet::DietLedger;
use crate::models::Nutritionist;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not logged in; call login first")]
    NotLoggedIn,
}

/// The logged-in nutritionist
#[derive(Debug, Clone, Serialize)]
pub struct LoggedIn {
    pub nutritionist_id: i64,
    pub name: String,
}

/// Patient whose diet is being edited
#[derive(Debug, Clone, Serialize)]
pub struct DietPatient {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct ClinicSession {
    user: Option<LoggedIn>,
    pub diet_patient: Option<DietPatient>,
    pub ledger: DietLedger,
}

impl ClinicSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&LoggedIn> {
        self.user.as_ref()
    }

    /// Nutritionist id of the current login
    pub fn require_login(&self) -> Result<i64, AuthError> {
        self.user
            .as_ref()
            .map(|u| u.nutritionist_id)
            .ok_or(AuthError::NotLoggedIn)
    }

    pub fn log_in(&mut self, nutritionist: &Nutritionist) {
        self.end_diet();
        self.user = Some(LoggedIn {
            nutritionist_id: nutritionist.id,
            name: nutritionist.name.clone(),
        });
    }

    /// Drop the login along with any diet in progress
    pub fn log_out(&mut self) {
        self.user = None;
        self.end_diet();
    }

    /// Start editing a fresh diet for a patient
    pub fn start_diet(&mut self, patient: DietPatient) {
        self.ledger.clear();
        self.diet_patient = Some(patient);
    }

    pub fn end_diet(&mut self) {
        self.ledger.clear();
        self.diet_patient = None;
    }
}
