//! Macro Log MCP Server Implementation
//!
//! Implements the MCP server with all Macro Log tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::llm::CompletionClient;
use crate::models::{NutritionTotals, ProfileUpdate};
use crate::nutrition::{FoodEstimator, NeedsEstimator, NutrientCatalog};
use crate::tools::status::StatusTracker;
use crate::tools::{estimates, log, profile};

/// Macro Log MCP Service
#[derive(Clone)]
pub struct MacrologService {
    status_tracker: Arc<StatusTracker>,
    database: Database,
    food_estimator: FoodEstimator,
    needs_estimator: NeedsEstimator,
    client: Option<Arc<dyn CompletionClient>>,
    tool_router: ToolRouter<MacrologService>,
}

impl MacrologService {
    pub fn new(
        database_path: PathBuf,
        database: Database,
        catalog: NutrientCatalog,
        client: Option<Arc<dyn CompletionClient>>,
    ) -> Self {
        let status_tracker = StatusTracker::new(database_path, client.is_some(), catalog.len());
        Self {
            status_tracker: Arc::new(status_tracker),
            database,
            food_estimator: FoodEstimator::new(Arc::new(catalog)).with_client(client.clone()),
            needs_estimator: NeedsEstimator::new(client.clone()),
            client,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn join_error(e: tokio::task::JoinError) -> McpError {
    McpError::internal_error(format!("Task error: {}", e), None)
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeFoodParams {
    /// Free text, e.g. "2 eggs, 100 grams of tuna and 1 cup rice"
    pub description: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    pub name: Option<String>,
    pub age: Option<i64>,
    /// Kilograms
    pub weight: Option<f64>,
    /// Centimetres
    pub height: Option<f64>,
    pub gender: Option<String>,
    /// sedentary, light, moderate, active or very_active
    pub activity_level: Option<String>,
    /// lose_weight, maintain, gain_weight or gain_muscle
    pub goal: Option<String>,
    pub daily_calorie_goal: Option<i64>,
    pub daily_protein_goal: Option<i64>,
    pub daily_carbs_goal: Option<i64>,
    pub daily_fat_goal: Option<i64>,
    pub daily_water_goal: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    pub name: String,
    pub calories: i64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    /// breakfast, lunch, dinner or snack
    pub meal_type: Option<String>,
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodDescriptionParams {
    pub description: String,
    pub meal_type: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWaterParams {
    pub amount_ml: i64,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DailySummaryParams {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteFoodEntryParams {
    pub id: i64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl MacrologService {
    // --- Status ---

    #[tool(description = "Get the current status of the Macro Log service including build info, database status, completion service and process information")]
    fn macrolog_status(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.status_tracker.get_status())
    }

    #[tool(description = "Get instructions for describing and logging food. Call this when starting a food logging session.")]
    fn food_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::FOOD_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(FOOD_INSTRUCTIONS)]))
    }

    // --- Estimates ---

    #[tool(description = "Estimate calories, protein, carbs and fat for a free-text food description")]
    async fn analyze_food(&self, Parameters(p): Parameters<AnalyzeFoodParams>) -> Result<CallToolResult, McpError> {
        let estimator = self.food_estimator.clone();
        let result = tokio::task::spawn_blocking(move || estimates::analyze_food(&estimator, &p.description))
            .await
            .map_err(join_error)?
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Recommend daily calorie, macro and water targets for the stored profile. Targets are not saved.")]
    async fn analyze_user_needs(&self) -> Result<CallToolResult, McpError> {
        let database = self.database.clone();
        let estimator = self.needs_estimator.clone();
        let result = tokio::task::spawn_blocking(move || estimates::analyze_user_needs(&database, &estimator))
            .await
            .map_err(join_error)?
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Suggest what to eat next based on the profile and today's latest entries. Requires a completion service.")]
    async fn get_recommendation(&self) -> Result<CallToolResult, McpError> {
        let database = self.database.clone();
        let client = self.client.clone();
        let result = tokio::task::spawn_blocking(move || estimates::get_recommendation(&database, client.as_deref()))
            .await
            .map_err(join_error)?
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Profile ---

    #[tool(description = "Get the user profile and daily goals")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update profile fields and daily goals. Omitted fields are unchanged.")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let data = ProfileUpdate {
            name: p.name, age: p.age, weight: p.weight, height: p.height, gender: p.gender,
            activity_level: p.activity_level, goal: p.goal,
            daily_calorie_goal: p.daily_calorie_goal, daily_protein_goal: p.daily_protein_goal,
            daily_carbs_goal: p.daily_carbs_goal, daily_fat_goal: p.daily_fat_goal,
            daily_water_goal: p.daily_water_goal,
        };
        let result = profile::update_profile(&self.database, &data).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Log ---

    #[tool(description = "Log a food entry with known nutrition")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let nutrition = NutritionTotals { calories: p.calories, protein: p.protein, carbs: p.carbs, fat: p.fat };
        let result = log::log_food(&self.database, &p.name, nutrition, p.meal_type.as_deref(), p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Estimate nutrition for a food description and log it as one entry")]
    async fn log_food_description(&self, Parameters(p): Parameters<LogFoodDescriptionParams>) -> Result<CallToolResult, McpError> {
        let database = self.database.clone();
        let estimator = self.food_estimator.clone();
        let result = tokio::task::spawn_blocking(move || {
            log::log_food_description(&database, &estimator, &p.description, p.meal_type.as_deref(), p.date.as_deref())
        })
        .await
        .map_err(join_error)?
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a food entry by id")]
    fn delete_food_entry(&self, Parameters(p): Parameters<DeleteFoodEntryParams>) -> Result<CallToolResult, McpError> {
        let result = log::delete_food_entry(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Add water (ml) to a day's total")]
    fn add_water(&self, Parameters(p): Parameters<AddWaterParams>) -> Result<CallToolResult, McpError> {
        let result = log::add_water(&self.database, p.amount_ml, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a day's food entries, nutrition totals and water against the daily goals")]
    fn get_daily_summary(&self, Parameters(p): Parameters<DailySummaryParams>) -> Result<CallToolResult, McpError> {
        let result = log::get_daily_summary(&self.database, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for MacrologService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "macrolog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Macro Log".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Macro Log - calorie, macro and water tracking from free-text food descriptions. \
                 Call food_instructions before logging. \
                 Estimates: analyze_food, analyze_user_needs, get_recommendation. \
                 Profile: get_profile, update_profile. \
                 Log: log_food, log_food_description, delete_food_entry, add_water, get_daily_summary. \
                 Status: macrolog_status."
                    .into(),
            ),
        }
    }
}
