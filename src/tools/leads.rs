//! Lead capture MCP Tools
//!
//! The pre-anamnesis form is public: submitting a lead needs no login, only
//! the id of an existing nutritionist (carried in the share link).

use serde::Serialize;

use crate::db::Database;
use crate::models::{Lead, LeadCreate, Nutritionist};

/// Base URL used for share links when NUTRI_PUBLIC_URL is unset
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8501";

#[derive(Debug, Serialize)]
pub struct SubmitLeadResponse {
    pub id: i64,
    pub nutritionist_name: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ListLeadsResponse {
    pub leads: Vec<Lead>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    pub nutritionist_id: i64,
    pub link: String,
}

pub fn submit_lead(db: &Database, data: LeadCreate) -> Result<SubmitLeadResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let nutritionist = Nutritionist::get_by_id(&conn, data.nutritionist_id)
        .map_err(|e| format!("Failed to check nutritionist: {}", e))?
        .ok_or_else(|| format!(
            "Nutritionist not identified (id {}). Confirm the correct link with your nutritionist.",
            data.nutritionist_id
        ))?;

    let lead = Lead::create(&conn, &data).map_err(|e| format!("Failed to submit lead: {}", e))?;

    tracing::info!(lead_id = lead.id, nutritionist_id = nutritionist.id, "Received lead");

    Ok(SubmitLeadResponse {
        id: lead.id,
        nutritionist_name: nutritionist.name,
        message: "Pre-anamnesis received".to_string(),
    })
}

pub fn list_leads(db: &Database, nutritionist_id: i64) -> Result<ListLeadsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let leads = Lead::list_for_nutritionist(&conn, nutritionist_id)
        .map_err(|e| format!("Failed to list leads: {}", e))?;

    Ok(ListLeadsResponse {
        total: leads.len(),
        leads,
    })
}

/// Pre-anamnesis link for a nutritionist
pub fn share_link(base_url: &str, nutritionist_id: i64) -> ShareLinkResponse {
    ShareLinkResponse {
        nutritionist_id,
        link: format!(
            "{}/pre-anamnesis?nutritionist_id={}",
            base_url.trim_end_matches('/'),
            nutritionist_id
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{Goal, NutritionistCreate};

    fn lead_for(nutritionist_id: i64) -> LeadCreate {
        LeadCreate {
            nutritionist_id,
            name: "João".to_string(),
            email: "joao@mail.test".to_string(),
            phone: Some("".to_string()),
            goal: Goal::MuscleGain,
            extra_info: None,
        }
    }

    #[test]
    fn test_submit_requires_known_nutritionist() {
        let db = test_database();
        assert!(submit_lead(&db, lead_for(42)).is_err());

        let ana = db.with_conn(|conn| {
            Nutritionist::create(conn, &NutritionistCreate {
                name: "Ana".to_string(),
                email: "ana@clinic.test".to_string(),
                password: "pw".to_string(),
            })
        }).unwrap();

        let resp = submit_lead(&db, lead_for(ana.id)).unwrap();
        assert_eq!(resp.nutritionist_name, "Ana");

        let listed = list_leads(&db, ana.id).unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.leads[0].phone, None);
        assert_eq!(listed.leads[0].goal, Goal::MuscleGain);
    }

    #[test]
    fn test_share_link() {
        let resp = share_link("https://nutri.example.com/", 3);
        assert_eq!(resp.link, "https://nutri.example.com/pre-anamnesis?nutritionist_id=3");
    }
}
