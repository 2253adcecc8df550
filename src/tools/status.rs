//! Macro Log Status Tool
//!
//! Provides runtime status information about the Macro Log service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Food logging instructions for AI assistants
pub const FOOD_INSTRUCTIONS: &str = r#"
# Macro Log Food Logging Instructions

## Describing Food

`analyze_food` and `log_food_description` accept free text. Separate items
with commas or "and". Each item is read in one of three shapes:

- `<number> <unit> [of] <food>`: "200 grams of chicken breast", "250 ml milk"
- `<number> <food>`: "2 eggs", "6 egg whites" (counted items)
- `<food> [<number> [<unit>]]`: "rice 150 g", "apple"

Units: g, gram, grams, ml, oz, ounce, cup, cups.

A food with no number is treated as 100 grams. Weights only scale foods
stored per 100 g, and volumes only scale foods stored per 100 ml; any other
combination counts one serving.

When no item is recognized and a completion service is configured, the
whole description is estimated remotely. Otherwise zero totals are returned.

## Logging

- `log_food` when the nutrition is already known (label, recipe)
- `log_food_description` to estimate and log in one step
- `add_water` adds millilitres to the day's total
- Dates are ISO format (YYYY-MM-DD) and default to today
- Meal types: breakfast, lunch, dinner, snack

## Goals

`update_profile` stores age, weight (kg), height (cm), gender, activity
level (sedentary, light, moderate, active, very_active) and goal
(lose_weight, maintain, gain_weight, gain_muscle).

`analyze_user_needs` returns recommended daily targets. They are not saved;
pass them to `update_profile` to adopt them. `get_daily_summary` fills any
missing goals from the profile automatically.
"#;

/// Runtime status of the Macro Log service
#[derive(Debug, Clone, Serialize)]
pub struct MacrologStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Whether a completion service is configured
    pub completion_service: bool,
    pub catalog_size: usize,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    completion_service: bool,
    catalog_size: usize,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, completion_service: bool, catalog_size: usize) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            completion_service,
            catalog_size,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> MacrologStatus {
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

        MacrologStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            completion_service: self.completion_service,
            catalog_size: self.catalog_size,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
