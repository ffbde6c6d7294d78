//! Diet prescription MCP Tools
//!
//! Every function takes the session's ledger explicitly; there is no shared
//! diet state. Indices in responses are only valid until the next change.

use serde::Serialize;

use crate::db::Database;
use crate::diet::{format, DietLedger, FoodEntry, MealSlot};
use crate::models::{Macros, NutritionFact};
use crate::session::{ClinicSession, DietPatient};
use crate::tools::patients::get_patient;

#[derive(Debug, Serialize)]
pub struct AddEntryResponse {
    pub meal_slot: MealSlot,
    pub index: usize,
    pub entry: FoodEntry,
    pub meal_totals: Macros,
    pub day_totals: Macros,
}

#[derive(Debug, Serialize)]
pub struct RemoveEntryResponse {
    pub meal_slot: MealSlot,
    pub removed: FoodEntry,
    pub meal_totals: Macros,
    pub day_totals: Macros,
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub meal_slot: Option<MealSlot>,
    pub totals: Macros,
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct IndexedEntry {
    pub index: usize,
    #[serde(flatten)]
    pub entry: FoodEntry,
}

#[derive(Debug, Serialize)]
pub struct MealPlan {
    pub meal_slot: MealSlot,
    pub label: &'static str,
    pub emoji: &'static str,
    pub entries: Vec<IndexedEntry>,
    pub totals: Macros,
}

#[derive(Debug, Serialize)]
pub struct DietPlan {
    pub patient: Option<DietPatient>,
    pub meals: Vec<MealPlan>,
    pub day_totals: Macros,
    pub display: String,
}

#[derive(Debug, Serialize)]
pub struct ExportDietResponse {
    pub markdown: String,
}

/// Begin a fresh diet for one of the nutritionist's patients
pub fn start_diet(
    db: &Database,
    nutritionist_id: i64,
    session: &mut ClinicSession,
    patient_id: i64,
) -> Result<DietPlan, String> {
    let patient = get_patient(db, nutritionist_id, patient_id)?
        .ok_or_else(|| format!("Patient not found with id: {}", patient_id))?;

    session.start_diet(DietPatient {
        id: patient.id,
        name: patient.name,
    });
    tracing::info!(patient_id, "Started diet prescription");

    Ok(get_plan(session))
}

/// Add `quantity_g` grams of a reference food to a meal slot
pub fn add_entry(
    db: &Database,
    ledger: &mut DietLedger,
    meal_slot: &str,
    food_name: &str,
    quantity_g: f64,
) -> Result<AddEntryResponse, String> {
    let slot = MealSlot::parse(meal_slot).map_err(|e| e.to_string())?;

    let fact = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        NutritionFact::get_by_name(&conn, food_name)
            .map_err(|e| format!("Failed to look up food: {}", e))?
            .ok_or_else(|| format!("Food not found in the nutrition table: {}", food_name))?
    };

    let entry = ledger
        .add_entry(slot, &fact, quantity_g)
        .map_err(|e| e.to_string())?
        .clone();

    tracing::info!(meal_slot = slot.as_str(), food = fact.name(), quantity_g, "Added diet entry");

    Ok(AddEntryResponse {
        meal_slot: slot,
        index: ledger.entries(slot).len() - 1,
        entry,
        meal_totals: ledger.meal_totals(slot),
        day_totals: ledger.day_totals(),
    })
}

pub fn remove_entry(ledger: &mut DietLedger, meal_slot: &str, index: usize) -> Result<RemoveEntryResponse, String> {
    let slot = MealSlot::parse(meal_slot).map_err(|e| e.to_string())?;
    let removed = ledger.remove_entry(slot, index).map_err(|e| e.to_string())?;

    tracing::info!(meal_slot = slot.as_str(), index, "Removed diet entry");

    Ok(RemoveEntryResponse {
        meal_slot: slot,
        removed,
        meal_totals: ledger.meal_totals(slot),
        day_totals: ledger.day_totals(),
    })
}

pub fn clear(ledger: &mut DietLedger) -> TotalsResponse {
    ledger.clear();
    day_totals(ledger)
}

pub fn meal_totals(ledger: &DietLedger, meal_slot: &str) -> Result<TotalsResponse, String> {
    let slot = MealSlot::parse(meal_slot).map_err(|e| e.to_string())?;
    let totals = ledger.meal_totals(slot);
    Ok(TotalsResponse {
        meal_slot: Some(slot),
        totals,
        display: format::format_totals(&totals),
    })
}

pub fn day_totals(ledger: &DietLedger) -> TotalsResponse {
    let totals = ledger.day_totals();
    TotalsResponse {
        meal_slot: None,
        totals,
        display: format::format_totals(&totals),
    }
}

/// Every slot with its entries and totals
pub fn get_plan(session: &ClinicSession) -> DietPlan {
    let ledger = &session.ledger;
    let meals = MealSlot::ALL
        .iter()
        .map(|slot| MealPlan {
            meal_slot: *slot,
            label: slot.label(),
            emoji: slot.emoji(),
            entries: ledger
                .entries(*slot)
                .iter()
                .enumerate()
                .map(|(index, entry)| IndexedEntry {
                    index,
                    entry: entry.clone(),
                })
                .collect(),
            totals: ledger.meal_totals(*slot),
        })
        .collect();

    let totals = ledger.day_totals();
    DietPlan {
        patient: session.diet_patient.clone(),
        meals,
        day_totals: totals,
        display: format::format_totals(&totals),
    }
}

pub fn export_markdown(session: &ClinicSession) -> ExportDietResponse {
    let patient_name = session.diet_patient.as_ref().map(|p| p.name.as_str());
    ExportDietResponse {
        markdown: format::render_markdown(&session.ledger, patient_name),
    }
}
