//! Estimation MCP Tools
//!
//! Food description analysis, daily needs and meal recommendations.

use serde::Serialize;

use crate::db::Database;
use crate::llm::{CompletionClient, LlmError};
use crate::models::{FoodEntry, NutritionTotals, UserProfile};
use crate::nutrition::{recommend, FoodEstimator, NeedsEstimate, NeedsEstimator, ProfileSnapshot};
use crate::tools::log::resolve_date;

/// Response for get_recommendation
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub available: bool,
    pub recommendation: Option<String>,
    pub reason: Option<String>,
}

/// Estimate nutrition for a free-text food description
pub fn analyze_food(estimator: &FoodEstimator, description: &str) -> Result<NutritionTotals, String> {
    if description.trim().is_empty() {
        return Err("No food description provided".to_string());
    }
    Ok(estimator.estimate(description))
}

/// Recommend daily targets for the stored profile
pub fn analyze_user_needs(db: &Database, estimator: &NeedsEstimator) -> Result<NeedsEstimate, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = UserProfile::get(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?
        .ok_or_else(|| "Profile not found".to_string())?;

    // Don't hold a pooled connection across the completion call
    drop(conn);

    Ok(estimator.estimate_needs(&ProfileSnapshot::from(&profile)))
}

/// Suggest what to eat next, based on the profile and today's latest entries
pub fn get_recommendation(
    db: &Database,
    client: Option<&dyn CompletionClient>,
) -> Result<RecommendationResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = UserProfile::get_or_create(&conn)
        .map_err(|e| format!("Failed to get profile: {}", e))?;
    let today = resolve_date(None)?;
    let recent = FoodEntry::list_for_date(&conn, &today)
        .map_err(|e| format!("Failed to get today's entries: {}", e))?;

    drop(conn);

    match recommend(client, &ProfileSnapshot::from(&profile), &recent) {
        Ok(text) => Ok(RecommendationResponse {
            available: true,
            recommendation: Some(text),
            reason: None,
        }),
        Err(LlmError::NotConfigured) => Ok(RecommendationResponse {
            available: false,
            recommendation: None,
            reason: Some("No completion service configured (set TOGETHER_API_KEY)".to_string()),
        }),
        Err(e) => {
            tracing::warn!("Recommendation request failed: {}", e);
            Ok(RecommendationResponse {
                available: false,
                recommendation: None,
                reason: Some(format!("Error getting recommendation: {}", e)),
            })
        }
    }
}
