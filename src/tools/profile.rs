//! Profile MCP Tools

use crate::db::Database;
use crate::models::{ProfileUpdate, UserProfile};
use crate::nutrition::ActivityLevel;

/// Get the profile, creating it with default goals on first use
pub fn get_profile(db: &Database) -> Result<UserProfile, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    UserProfile::get_or_create(&conn).map_err(|e| format!("Failed to get profile: {}", e))
}

fn validate(data: &ProfileUpdate) -> Result<(), String> {
    if let Some(age) = data.age {
        if !(1..=120).contains(&age) {
            return Err(format!("Invalid age {}: expected 1-120", age));
        }
    }
    for (field, value) in [("weight", data.weight), ("height", data.height)] {
        if let Some(v) = value {
            if !v.is_finite() || v <= 0.0 {
                return Err(format!("{} must be greater than 0", field));
            }
        }
    }
    if let Some(ref level) = data.activity_level {
        if ActivityLevel::from_str(level).is_none() {
            return Err(format!(
                "Invalid activity_level '{}': use sedentary, light, moderate, active or very_active",
                level
            ));
        }
    }
    for (field, value) in [
        ("daily_calorie_goal", data.daily_calorie_goal),
        ("daily_protein_goal", data.daily_protein_goal),
        ("daily_carbs_goal", data.daily_carbs_goal),
        ("daily_fat_goal", data.daily_fat_goal),
        ("daily_water_goal", data.daily_water_goal),
    ] {
        if let Some(v) = value {
            if v <= 0 {
                return Err(format!("{} must be greater than 0", field));
            }
        }
    }
    Ok(())
}

/// Update profile fields; omitted fields keep their values
pub fn update_profile(db: &Database, data: &ProfileUpdate) -> Result<UserProfile, String> {
    validate(data)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    UserProfile::update(&conn, data).map_err(|e| format!("Failed to update profile: {}", e))
}
