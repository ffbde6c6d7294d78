//! Nutri Status Tool
//!
//! Runtime status of the service, plus usage instructions for clients.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Diet prescription instructions for AI assistants
pub const DIET_INSTRUCTIONS: &str = r#"
# Nutri Diet Prescription Instructions

1. `login` with the nutritionist's email and password.
2. `list_patients` and pick the patient, then `start_diet` with their id.
   Starting a diet empties the current plan.
3. Find foods with `search_nutrition_facts`. Names must match exactly when
   adding; values in the table are per 100 g.
4. `diet_add_entry` with a meal slot, the exact food name and grams (> 0).

## Meal slots

| Identifier | Label |
|------------|-------|
| breakfast | Breakfast |
| morning_snack | Morning Snack |
| lunch | Lunch |
| afternoon_snack | Afternoon Snack |
| dinner | Dinner |
| evening_snack | Evening Snack |

## Removing entries

`diet_remove_entry` takes a slot and a 0-based index. Indices shift after
every removal: call `get_diet_plan` again before removing another entry.

## Totals

`diet_meal_totals` and `diet_day_totals` return raw values plus a display
string (kcal without decimals, grams with one). `export_diet_markdown`
renders the whole plan.
"#;

/// Runtime status of the Nutri service
#[derive(Debug, Clone, Serialize)]
pub struct NutriStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self) -> NutriStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutriStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
