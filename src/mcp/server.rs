//! Nutri MCP Server Implementation
//!
//! Implements the MCP server with all clinic tools.

use std::path::PathBuf;
use std::sync::{Arc, MutexGuard};

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::diet::MealSlot;
use crate::models::{ConsultationCreate, Goal, LeadCreate, PatientCreate, Sex};
use crate::session::ClinicSession;
use crate::tools::status::StatusTracker;
use crate::tools::{auth, consultations, diet, leads, nutrition_facts, patients};

/// Nutri MCP Service
///
/// One instance serves one client connection and owns that connection's
/// session.
#[derive(Clone)]
pub struct NutriService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    public_url: String,
    session: Arc<std::sync::Mutex<ClinicSession>>,
    tool_router: ToolRouter<NutriService>,
}

impl NutriService {
    pub fn new(database_path: PathBuf, database: Database, public_url: String) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            public_url,
            session: Arc::new(std::sync::Mutex::new(ClinicSession::new())),
            tool_router: Self::tool_router(),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, ClinicSession>, McpError> {
        self.session
            .lock()
            .map_err(|_| McpError::internal_error("Session state is unavailable", None))
    }
}

/// Serialize a tool result; tool failures become an `error` payload
fn json_result<T: Serialize>(result: Result<T, String>) -> Result<CallToolResult, McpError> {
    let json = match result {
        Ok(value) => serde_json::to_string_pretty(&value),
        Err(message) => serde_json::to_string_pretty(&serde_json::json!({ "error": message })),
    }
    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn require_login(session: &ClinicSession) -> Result<i64, String> {
    session.require_login().map_err(|e| e.to_string())
}

// ============================================================================
// Auth Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Patient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterPatientParams {
    /// Full name
    pub name: String,
    /// Birth date, YYYY-MM-DD (1925-01-01 to today)
    pub birth_date: String,
    /// female, male or other
    pub sex: String,
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default)]
    pub height_cm: f64,
    /// weight_loss, muscle_gain, health or other
    pub goal: String,
    /// Food allergies or intolerances
    pub allergies: Option<String>,
    /// Medications in regular use
    pub medications: Option<String>,
    #[serde(default)]
    pub physically_active: bool,
    /// How often the patient exercises (only kept when active)
    pub activity_frequency: Option<String>,
    /// Meals usually eaten, as meal slot identifiers
    #[serde(default)]
    pub usual_meals: Vec<String>,
    #[serde(default)]
    pub water_glasses_per_day: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PatientIdParams {
    pub patient_id: i64,
}

// ============================================================================
// Consultation Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogConsultationParams {
    pub patient_id: i64,
    /// Main complaints
    #[serde(default)]
    pub complaints: String,
    /// Conduct or eating plan
    #[serde(default)]
    pub conduct: String,
    /// General guidance
    #[serde(default)]
    pub guidance: String,
    /// Return date, YYYY-MM-DD
    pub return_date: Option<String>,
    /// Return time, HH:MM (requires return_date)
    pub return_time: Option<String>,
}

// ============================================================================
// Lead Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SubmitLeadParams {
    /// Nutritionist id from the share link
    pub nutritionist_id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    /// weight_loss, muscle_gain, health or other
    pub goal: String,
    /// Notes or questions
    pub extra_info: Option<String>,
}

// ============================================================================
// Nutrition Fact Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ImportNutritionFactsParams {
    /// Path to a TACO CSV export
    pub file_path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchNutritionFactsParams {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetNutritionFactParams {
    /// Exact food name
    pub name: String,
}

// ============================================================================
// Diet Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DietAddEntryParams {
    /// breakfast, morning_snack, lunch, afternoon_snack, dinner or evening_snack
    pub meal_slot: String,
    /// Exact food name from the nutrition table
    pub food_name: String,
    /// Quantity in grams, greater than 0
    #[serde(default = "default_quantity")]
    pub quantity_g: f64,
}

fn default_quantity() -> f64 { 100.0 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DietRemoveEntryParams {
    pub meal_slot: String,
    /// 0-based position in the slot, taken from the latest get_diet_plan
    pub index: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DietMealTotalsParams {
    pub meal_slot: String,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl NutriService {
    // --- Status ---

    #[tool(description = "Get the current status of the Nutri service including build info, database status, and process information")]
    async fn nutri_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(Ok(tracker.get_status()))
    }

    #[tool(description = "Get step-by-step instructions for prescribing a diet. Call this before using the diet tools.")]
    fn diet_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::DIET_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(DIET_INSTRUCTIONS)]))
    }

    // --- Auth ---

    #[tool(description = "Log in as a nutritionist with email and password")]
    fn login(&self, Parameters(p): Parameters<LoginParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        json_result(auth::login(&self.database, &mut session, &p.email, &p.password))
    }

    #[tool(description = "Log out and discard the diet in progress")]
    fn logout(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        json_result(Ok(auth::logout(&mut session)))
    }

    #[tool(description = "Show who is logged in and the diet in progress")]
    fn whoami(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        json_result(Ok(auth::whoami(&session)))
    }

    // --- Patients ---

    #[tool(description = "Register a patient's nutritional anamnesis")]
    fn register_patient(&self, Parameters(p): Parameters<RegisterPatientParams>) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session).and_then(|nutritionist_id| {
            let usual_meals = p
                .usual_meals
                .iter()
                .map(|s| MealSlot::parse(s))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?;

            let data = PatientCreate {
                name: p.name,
                birth_date: p.birth_date,
                sex: Sex::parse(&p.sex)?,
                weight_kg: p.weight_kg,
                height_cm: p.height_cm,
                goal: Goal::parse(&p.goal)?,
                allergies: p.allergies,
                medications: p.medications,
                physically_active: p.physically_active,
                activity_frequency: p.activity_frequency,
                usual_meals,
                water_glasses_per_day: p.water_glasses_per_day,
            };
            patients::register_patient(&self.database, nutritionist_id, data)
        });
        json_result(result)
    }

    #[tool(description = "List the logged-in nutritionist's patients")]
    fn list_patients(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session)
            .and_then(|nutritionist_id| patients::list_patients(&self.database, nutritionist_id));
        json_result(result)
    }

    #[tool(description = "Get a patient's full anamnesis")]
    fn get_patient(&self, Parameters(p): Parameters<PatientIdParams>) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session).and_then(|nutritionist_id| {
            patients::get_patient(&self.database, nutritionist_id, p.patient_id)?
                .ok_or_else(|| format!("Patient not found with id: {}", p.patient_id))
        });
        json_result(result)
    }

    // --- Consultations ---

    #[tool(description = "Record a consultation for a patient, optionally with a return date and time")]
    fn log_consultation(&self, Parameters(p): Parameters<LogConsultationParams>) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session).and_then(|nutritionist_id| {
            let data = ConsultationCreate {
                patient_id: p.patient_id,
                complaints: p.complaints,
                conduct: p.conduct,
                guidance: p.guidance,
                return_date: p.return_date,
                return_time: p.return_time,
            };
            consultations::log_consultation(&self.database, nutritionist_id, data)
        });
        json_result(result)
    }

    #[tool(description = "List a patient's consultations, newest first")]
    fn list_consultations(&self, Parameters(p): Parameters<PatientIdParams>) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session).and_then(|nutritionist_id| {
            consultations::list_consultations(&self.database, nutritionist_id, p.patient_id)
        });
        json_result(result)
    }

    // --- Leads ---

    #[tool(description = "Submit the public pre-anamnesis form for a nutritionist. No login needed.")]
    fn submit_lead(&self, Parameters(p): Parameters<SubmitLeadParams>) -> Result<CallToolResult, McpError> {
        let result = Goal::parse(&p.goal).and_then(|goal| {
            let data = LeadCreate {
                nutritionist_id: p.nutritionist_id,
                name: p.name,
                email: p.email,
                phone: p.phone,
                goal,
                extra_info: p.extra_info,
            };
            leads::submit_lead(&self.database, data)
        });
        json_result(result)
    }

    #[tool(description = "List leads received by the logged-in nutritionist")]
    fn list_leads(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session)
            .and_then(|nutritionist_id| leads::list_leads(&self.database, nutritionist_id));
        json_result(result)
    }

    #[tool(description = "Get the pre-anamnesis link to share with prospective patients")]
    fn share_link(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session)
            .map(|nutritionist_id| leads::share_link(&self.public_url, nutritionist_id));
        json_result(result)
    }

    // --- Nutrition Facts ---

    #[tool(description = "Import a TACO CSV export into the nutrition table. Rows with missing or non-numeric macros are skipped and reported.")]
    fn import_nutrition_facts(&self, Parameters(p): Parameters<ImportNutritionFactsParams>) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session)
            .and_then(|_| nutrition_facts::import_nutrition_facts(&self.database, &p.file_path));
        json_result(result)
    }

    #[tool(description = "Search the nutrition table by food name (values per 100 g)")]
    fn search_nutrition_facts(&self, Parameters(p): Parameters<SearchNutritionFactsParams>) -> Result<CallToolResult, McpError> {
        json_result(nutrition_facts::search_nutrition_facts(&self.database, &p.query, p.limit))
    }

    #[tool(description = "Get the per-100 g macros of a food by exact name")]
    fn get_nutrition_fact(&self, Parameters(p): Parameters<GetNutritionFactParams>) -> Result<CallToolResult, McpError> {
        let result = nutrition_facts::get_nutrition_fact(&self.database, &p.name).and_then(|fact| {
            fact.map(nutrition_facts::NutritionFactSummary::from)
                .ok_or_else(|| format!("Food not found in the nutrition table: {}", p.name))
        });
        json_result(result)
    }

    // --- Diet ---

    #[tool(description = "Start a new diet for a patient. Discards the diet in progress.")]
    fn start_diet(&self, Parameters(p): Parameters<PatientIdParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = require_login(&session).and_then(|nutritionist_id| {
            diet::start_diet(&self.database, nutritionist_id, &mut session, p.patient_id)
        });
        json_result(result)
    }

    #[tool(description = "Add grams of a food to a meal slot of the diet in progress")]
    fn diet_add_entry(&self, Parameters(p): Parameters<DietAddEntryParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = require_login(&session).and_then(|_| {
            diet::add_entry(&self.database, &mut session.ledger, &p.meal_slot, &p.food_name, p.quantity_g)
        });
        json_result(result)
    }

    #[tool(description = "Remove an entry from a meal slot by 0-based index. Indices shift after each removal.")]
    fn diet_remove_entry(&self, Parameters(p): Parameters<DietRemoveEntryParams>) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = require_login(&session)
            .and_then(|_| diet::remove_entry(&mut session.ledger, &p.meal_slot, p.index));
        json_result(result)
    }

    #[tool(description = "Empty every meal slot of the diet in progress")]
    fn diet_clear(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session()?;
        let result = require_login(&session).map(|_| diet::clear(&mut session.ledger));
        json_result(result)
    }

    #[tool(description = "Macro totals for one meal slot")]
    fn diet_meal_totals(&self, Parameters(p): Parameters<DietMealTotalsParams>) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session).and_then(|_| diet::meal_totals(&session.ledger, &p.meal_slot));
        json_result(result)
    }

    #[tool(description = "Macro totals for the whole day")]
    fn diet_day_totals(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session).map(|_| diet::day_totals(&session.ledger));
        json_result(result)
    }

    #[tool(description = "Get the diet in progress: every meal slot with indexed entries and totals")]
    fn get_diet_plan(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session).map(|_| diet::get_plan(&session));
        json_result(result)
    }

    #[tool(description = "Export the diet in progress as markdown")]
    fn export_diet_markdown(&self) -> Result<CallToolResult, McpError> {
        let session = self.session()?;
        let result = require_login(&session).map(|_| diet::export_markdown(&session));
        json_result(result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutriService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutri".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Nutri".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Nutri - clinic manager for nutritionists. \
                 Call login first; every tool except submit_lead and the nutrition table lookups needs it. \
                 Patients: register_patient/list_patients/get_patient. \
                 Consultations: log_consultation/list_consultations. \
                 Leads: submit_lead/list_leads/share_link. \
                 Nutrition table: import_nutrition_facts/search_nutrition_facts/get_nutrition_fact. \
                 Diet: call diet_instructions, then start_diet, diet_add_entry/diet_remove_entry/diet_clear, \
                 diet_meal_totals/diet_day_totals, get_diet_plan, export_diet_markdown."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{Nutritionist, NutritionistCreate};
    use crate::session::AuthError;

    fn service() -> (NutriService, i64) {
        let db = test_database();
        let nutritionist = db
            .with_conn(|conn| {
                Nutritionist::create(conn, &NutritionistCreate {
                    name: "Ana".to_string(),
                    email: "ana@clinic.test".to_string(),
                    password: "pw".to_string(),
                })
            })
            .unwrap();
        let service = NutriService::new(PathBuf::from(":memory:"), db, "http://clinic.test".to_string());
        (service, nutritionist.id)
    }

    /// JSON text carried by a tool result
    fn payload(result: CallToolResult) -> serde_json::Value {
        let value = serde_json::to_value(&result).unwrap();
        let text = value["content"][0]["text"].as_str().unwrap().to_string();
        serde_json::from_str(&text).unwrap()
    }

    fn login_as_ana(service: &NutriService) {
        let result = service
            .login(Parameters(LoginParams {
                email: "ana@clinic.test".to_string(),
                password: "pw".to_string(),
            }))
            .unwrap();
        assert!(payload(result).get("error").is_none());
    }

    #[test]
    fn test_tool_errors_become_error_payloads() {
        let result = json_result::<()>(Err("Food not found".to_string())).unwrap();
        assert_eq!(payload(result)["error"], "Food not found");
    }

    #[test]
    fn test_clinic_tools_require_login() {
        let (service, _) = service();

        let listed = payload(service.list_patients().unwrap());
        assert_eq!(listed["error"], AuthError::NotLoggedIn.to_string());

        let added = payload(
            service
                .diet_add_entry(Parameters(DietAddEntryParams {
                    meal_slot: "lunch".to_string(),
                    food_name: "Arroz, tipo 1, cozido".to_string(),
                    quantity_g: 100.0,
                }))
                .unwrap(),
        );
        assert_eq!(added["error"], AuthError::NotLoggedIn.to_string());
        assert!(payload(service.share_link().unwrap()).get("error").is_some());

        login_as_ana(&service);
        let listed = payload(service.list_patients().unwrap());
        assert!(listed.get("error").is_none());
    }

    #[test]
    fn test_submit_lead_is_public() {
        let (service, nutritionist_id) = service();

        let submitted = payload(
            service
                .submit_lead(Parameters(SubmitLeadParams {
                    nutritionist_id,
                    name: "João".to_string(),
                    email: "joao@mail.test".to_string(),
                    phone: None,
                    goal: "muscle_gain".to_string(),
                    extra_info: None,
                }))
                .unwrap(),
        );
        assert!(submitted.get("error").is_none());
        assert_eq!(submitted["nutritionist_name"], "Ana");

        let rejected = payload(
            service
                .submit_lead(Parameters(SubmitLeadParams {
                    nutritionist_id,
                    name: "João".to_string(),
                    email: String::new(),
                    phone: None,
                    goal: "emagrecer".to_string(),
                    extra_info: None,
                }))
                .unwrap(),
        );
        assert!(rejected["error"].as_str().unwrap().contains("Invalid goal"));
    }

    #[test]
    fn test_register_patient_rejects_unknown_sex() {
        let (service, _) = service();
        login_as_ana(&service);

        let result = payload(
            service
                .register_patient(Parameters(RegisterPatientParams {
                    name: "Maria Silva".to_string(),
                    birth_date: "1990-05-17".to_string(),
                    sex: "Feminino".to_string(),
                    weight_kg: 68.5,
                    height_cm: 165.0,
                    goal: "weight_loss".to_string(),
                    allergies: None,
                    medications: None,
                    physically_active: false,
                    activity_frequency: None,
                    usual_meals: vec!["lunch".to_string()],
                    water_glasses_per_day: 6,
                }))
                .unwrap(),
        );
        assert!(result["error"].as_str().unwrap().contains("Invalid sex"));
        assert_eq!(payload(service.list_patients().unwrap())["total"], 0);
    }
}
