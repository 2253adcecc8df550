//! Food and Water Log MCP Tools
//!
//! Tools for logging food entries and water, and summarizing a day.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::models::{
    FoodEntry, FoodEntryCreate, MealType, NutritionTotals, ProfileUpdate, UserProfile, WaterIntake,
};
use crate::nutrition::{local_needs, FoodEstimator, ProfileSnapshot};

/// Response for log_food and log_food_description
#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub id: i64,
    pub date: String,
    pub name: String,
    pub meal_type: Option<MealType>,
    pub nutrition: NutritionTotals,
}

impl From<FoodEntry> for LogFoodResponse {
    fn from(entry: FoodEntry) -> Self {
        Self {
            id: entry.id,
            date: entry.date,
            name: entry.name,
            meal_type: entry.meal_type,
            nutrition: entry.nutrition,
        }
    }
}

/// Response for add_water
#[derive(Debug, Serialize)]
pub struct AddWaterResponse {
    pub date: String,
    pub added_ml: i64,
    pub total_ml: i64,
}

/// Daily targets used by the summary
#[derive(Debug, Serialize)]
pub struct DailyGoals {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
    pub water_ml: i64,
}

/// Response for get_daily_summary
#[derive(Debug, Serialize)]
pub struct DailySummary {
    pub date: String,
    pub entries: Vec<FoodEntry>,
    pub totals: NutritionTotals,
    pub water_ml: i64,
    pub goals: DailyGoals,
    /// True when missing goals were computed and saved to the profile
    pub goals_filled: bool,
}

/// Response for delete_food_entry
#[derive(Debug, Serialize)]
pub struct DeleteFoodEntryResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Validate an ISO date, defaulting to today
pub fn resolve_date(date: Option<&str>) -> Result<String, String> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map(|parsed| parsed.format("%Y-%m-%d").to_string())
            .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", d)),
        None => Ok(chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()),
    }
}

fn parse_meal_type(meal_type: Option<&str>) -> Result<Option<MealType>, String> {
    match meal_type.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => MealType::from_str(m)
            .map(Some)
            .ok_or_else(|| format!("Invalid meal_type '{}': use breakfast, lunch, dinner or snack", m)),
        None => Ok(None),
    }
}

/// Log a food entry with known nutrition
pub fn log_food(
    db: &Database,
    name: &str,
    nutrition: NutritionTotals,
    meal_type: Option<&str>,
    date: Option<&str>,
) -> Result<LogFoodResponse, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Food name cannot be empty".to_string());
    }
    if nutrition.calories < 0 {
        return Err("calories cannot be negative".to_string());
    }
    for (field, value) in [
        ("protein", nutrition.protein),
        ("carbs", nutrition.carbs),
        ("fat", nutrition.fat),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{} cannot be negative", field));
        }
    }

    let data = FoodEntryCreate {
        date: resolve_date(date)?,
        name: name.to_string(),
        nutrition,
        meal_type: parse_meal_type(meal_type)?,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let entry = FoodEntry::create(&conn, &data)
        .map_err(|e| format!("Failed to log food: {}", e))?;

    Ok(entry.into())
}

/// Estimate a description's nutrition and log it as one entry
pub fn log_food_description(
    db: &Database,
    estimator: &FoodEstimator,
    description: &str,
    meal_type: Option<&str>,
    date: Option<&str>,
) -> Result<LogFoodResponse, String> {
    if description.trim().is_empty() {
        return Err("No food description provided".to_string());
    }
    // Validate before a possible completion call
    let date = resolve_date(date)?;
    parse_meal_type(meal_type)?;

    let nutrition = estimator.estimate(description);
    log_food(db, description, nutrition, meal_type, Some(&date))
}

/// Add water to a day's total
pub fn add_water(db: &Database, amount_ml: i64, date: Option<&str>) -> Result<AddWaterResponse, String> {
    if amount_ml <= 0 {
        return Err("amount_ml must be greater than 0".to_string());
    }
    let date = resolve_date(date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let intake = WaterIntake::add(&conn, &date, amount_ml)
        .map_err(|e| format!("Failed to add water: {}", e))?;

    Ok(AddWaterResponse {
        date: intake.date,
        added_ml: amount_ml,
        total_ml: intake.amount_ml,
    })
}

/// Delete a food entry
pub fn delete_food_entry(db: &Database, id: i64) -> Result<DeleteFoodEntryResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = FoodEntry::delete(&conn, id)
        .map_err(|e| format!("Failed to delete food entry: {}", e))?;
    if !deleted {
        return Err(format!("Food entry {} not found", id));
    }
    Ok(DeleteFoodEntryResponse {
        success: true,
        deleted_id: id,
    })
}

/// Entries, totals and water for a day against the profile's goals.
/// Goals missing from the profile are computed locally and saved.
pub fn get_daily_summary(db: &Database, date: Option<&str>) -> Result<DailySummary, String> {
    let date = resolve_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entries = FoodEntry::list_for_date(&conn, &date)
        .map_err(|e| format!("Failed to get food entries: {}", e))?;
    let totals: NutritionTotals = entries.iter().map(|e| e.nutrition).sum();
    let water_ml = WaterIntake::get_for_date(&conn, &date)
        .map_err(|e| format!("Failed to get water intake: {}", e))?
        .map(|w| w.amount_ml)
        .unwrap_or(0);

    let mut profile = UserProfile::get_or_create(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;

    let goals_filled = [
        profile.daily_calorie_goal,
        profile.daily_protein_goal,
        profile.daily_carbs_goal,
        profile.daily_fat_goal,
        profile.daily_water_goal,
    ]
    .iter()
    .any(|g| g.map_or(true, |v| v <= 0));

    if goals_filled {
        let computed = local_needs(&ProfileSnapshot::from(&profile));
        let keep = |g: Option<i64>| g.filter(|v| *v > 0);
        let update = ProfileUpdate {
            daily_calorie_goal: Some(keep(profile.daily_calorie_goal).unwrap_or(computed.daily_calorie_goal)),
            daily_protein_goal: Some(keep(profile.daily_protein_goal).unwrap_or(computed.daily_protein_goal)),
            daily_carbs_goal: Some(keep(profile.daily_carbs_goal).unwrap_or(computed.daily_carbs_goal)),
            daily_fat_goal: Some(keep(profile.daily_fat_goal).unwrap_or(computed.daily_fat_goal)),
            daily_water_goal: Some(keep(profile.daily_water_goal).unwrap_or(computed.daily_water_goal)),
            ..Default::default()
        };
        profile = UserProfile::update(&conn, &update)
            .map_err(|e| format!("Failed to save computed goals: {}", e))?;
        tracing::info!("Filled missing daily goals from profile");
    }

    let goals = DailyGoals {
        calories: profile.daily_calorie_goal.unwrap_or_default(),
        protein: profile.daily_protein_goal.unwrap_or_default(),
        carbs: profile.daily_carbs_goal.unwrap_or_default(),
        fat: profile.daily_fat_goal.unwrap_or_default(),
        water_ml: profile.daily_water_goal.unwrap_or_default(),
    };

    Ok(DailySummary {
        date,
        entries,
        totals,
        water_ml,
        goals,
        goals_filled,
    })
}
