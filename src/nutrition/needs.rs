//! Daily needs estimator
//!
//! Recommends daily calorie, macro and water targets for a profile. The
//! completion service is asked first; without it (or when its answer is
//! unusable) the targets are computed locally from the Mifflin-St Jeor BMR.
//! Every target is clamped to a safe range whichever way it was produced.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::llm::{parse_embedded_json, CompletionClient, CompletionRequest, LlmError, LlmResult};
use crate::models::UserProfile;

pub const CALORIE_GOAL_MIN: i64 = 1200;
pub const CALORIE_GOAL_MAX: i64 = 3500;
pub const WATER_GOAL_MIN: i64 = 1500;
pub const WATER_GOAL_MAX: i64 = 4000;

/// Protein range in grams per kg of body weight
pub const PROTEIN_PER_KG_MIN: f64 = 1.2;
pub const PROTEIN_PER_KG_MAX: f64 = 2.2;

/// Share of calories allowed from carbs and from fat
pub const CARBS_ENERGY_SHARE: (f64, f64) = (0.20, 0.65);
pub const FAT_ENERGY_SHARE: (f64, f64) = (0.20, 0.35);

const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_CARBS: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

const WATER_ML_PER_KG: f64 = 35.0;

/// Physical activity level, as stored on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "light" => Some(ActivityLevel::Light),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            "very_active" => Some(ActivityLevel::VeryActive),
            _ => None,
        }
    }

    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// Multiplier for unrecognized activity levels
pub const DEFAULT_ACTIVITY_MULTIPLIER: f64 = 1.55;

/// Body-composition goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    Maintain,
    GainWeight,
    GainMuscle,
}

impl Goal {
    /// Loose parse of free-text goals ("lose weight", "lose_weight", "Gain Muscle")
    pub fn from_str(s: &str) -> Self {
        let lower = s.to_lowercase();
        if lower.contains("lose") || lower.contains("loss") {
            Goal::LoseWeight
        } else if lower.contains("muscle") {
            Goal::GainMuscle
        } else if lower.contains("gain") {
            Goal::GainWeight
        } else {
            Goal::Maintain
        }
    }

    /// Calorie adjustment relative to maintenance
    pub fn calorie_factor(&self) -> f64 {
        match self {
            Goal::LoseWeight => 0.85,
            Goal::Maintain => 1.0,
            Goal::GainWeight | Goal::GainMuscle => 1.10,
        }
    }

    /// Protein grams per kg of body weight
    pub fn protein_per_kg(&self) -> f64 {
        match self {
            Goal::GainMuscle => 2.0,
            _ => 1.5,
        }
    }
}

/// Profile values with defaults filled in for anything missing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSnapshot {
    pub age: i64,
    pub weight: f64, // kg
    pub height: f64, // cm
    pub gender: String,
    pub activity_level: String,
    pub goal: String,
}

impl Default for ProfileSnapshot {
    fn default() -> Self {
        Self {
            age: 30,
            weight: 70.0,
            height: 170.0,
            gender: "Not specified".to_string(),
            activity_level: "moderate".to_string(),
            goal: "maintain".to_string(),
        }
    }
}

impl From<&UserProfile> for ProfileSnapshot {
    /// Zero, negative and blank values count as missing
    fn from(profile: &UserProfile) -> Self {
        let defaults = Self::default();
        let text = |value: &Option<String>, default: String| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or(default)
        };

        Self {
            age: profile.age.filter(|a| *a > 0).unwrap_or(defaults.age),
            weight: profile.weight.filter(|w| *w > 0.0).unwrap_or(defaults.weight),
            height: profile.height.filter(|h| *h > 0.0).unwrap_or(defaults.height),
            gender: text(&profile.gender, defaults.gender),
            activity_level: text(&profile.activity_level, defaults.activity_level),
            goal: text(&profile.goal, defaults.goal),
        }
    }
}

impl ProfileSnapshot {
    pub fn is_male(&self) -> bool {
        self.gender.trim().eq_ignore_ascii_case("male")
    }

    pub fn activity_multiplier(&self) -> f64 {
        ActivityLevel::from_str(&self.activity_level)
            .map(|a| a.multiplier())
            .unwrap_or(DEFAULT_ACTIVITY_MULTIPLIER)
    }

    pub fn goal_kind(&self) -> Goal {
        Goal::from_str(&self.goal)
    }

    /// Mifflin-St Jeor basal metabolic rate
    pub fn bmr(&self) -> f64 {
        let base = 10.0 * self.weight + 6.25 * self.height - 5.0 * self.age as f64;
        if self.is_male() {
            base + 5.0
        } else {
            base - 161.0
        }
    }

    /// Goal-adjusted daily energy expenditure, before clamping
    pub fn raw_calorie_goal(&self) -> f64 {
        self.bmr() * self.activity_multiplier() * self.goal_kind().calorie_factor()
    }
}

/// Where a needs estimate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedsSource {
    Service,
    Local,
}

/// Recommended daily targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedsEstimate {
    pub daily_calorie_goal: i64,
    pub daily_protein_goal: i64,
    pub daily_carbs_goal: i64,
    pub daily_fat_goal: i64,
    pub daily_water_goal: i64,
    pub calorie_explanation: String,
    pub macros_explanation: String,
    pub water_explanation: String,
    pub source: NeedsSource,
}

impl NeedsEstimate {
    /// Force every target into its safe range. Carb and fat bounds follow
    /// the (already clamped) calorie goal; protein bounds follow weight.
    pub fn clamped(mut self, weight: f64) -> Self {
        self.daily_calorie_goal = self.daily_calorie_goal.clamp(CALORIE_GOAL_MIN, CALORIE_GOAL_MAX);
        let calories = self.daily_calorie_goal as f64;

        self.daily_protein_goal = clamp_f(
            self.daily_protein_goal,
            weight * PROTEIN_PER_KG_MIN,
            weight * PROTEIN_PER_KG_MAX,
        );
        self.daily_carbs_goal = clamp_f(
            self.daily_carbs_goal,
            calories * CARBS_ENERGY_SHARE.0 / KCAL_PER_GRAM_CARBS,
            calories * CARBS_ENERGY_SHARE.1 / KCAL_PER_GRAM_CARBS,
        );
        self.daily_fat_goal = clamp_f(
            self.daily_fat_goal,
            calories * FAT_ENERGY_SHARE.0 / KCAL_PER_GRAM_FAT,
            calories * FAT_ENERGY_SHARE.1 / KCAL_PER_GRAM_FAT,
        );
        self.daily_water_goal = self.daily_water_goal.clamp(WATER_GOAL_MIN, WATER_GOAL_MAX);
        self
    }
}

/// Clamp an integer target into a fractional range, rounding the bounds inward
fn clamp_f(value: i64, min: f64, max: f64) -> i64 {
    let lo = min.ceil() as i64;
    let hi = (max.floor() as i64).max(lo);
    value.clamp(lo, hi)
}

/// Targets computed without the completion service, clamped
pub fn local_needs(profile: &ProfileSnapshot) -> NeedsEstimate {
    let goal = profile.goal_kind();
    let calories = (profile.raw_calorie_goal() as i64).clamp(CALORIE_GOAL_MIN, CALORIE_GOAL_MAX);
    let calories_f = calories as f64;

    let protein = (profile.weight * goal.protein_per_kg()) as i64;
    let fat = (calories_f * 0.30 / KCAL_PER_GRAM_FAT) as i64;
    let remaining = calories_f
        - protein as f64 * KCAL_PER_GRAM_PROTEIN
        - fat as f64 * KCAL_PER_GRAM_FAT;
    let carbs = (remaining / KCAL_PER_GRAM_CARBS) as i64;
    let water = (profile.weight * WATER_ML_PER_KG) as i64;

    NeedsEstimate {
        daily_calorie_goal: calories,
        daily_protein_goal: protein,
        daily_carbs_goal: carbs,
        daily_fat_goal: fat,
        daily_water_goal: water,
        calorie_explanation: format!(
            "BMR of {:.0} kcal (Mifflin-St Jeor) x {} activity multiplier, adjusted for a '{}' goal",
            profile.bmr(),
            profile.activity_multiplier(),
            profile.goal
        ),
        macros_explanation: format!(
            "Protein: {}g per kg of body weight, fat: 30% of calories, carbs: the remaining calories",
            goal.protein_per_kg()
        ),
        water_explanation: format!(
            "{}ml per kg of body weight",
            WATER_ML_PER_KG
        ),
        source: NeedsSource::Local,
    }
    .clamped(profile.weight)
}

/// Shape the completion service is asked to return
#[derive(Debug, Deserialize)]
struct RemoteNeeds {
    daily_calorie_goal: f64,
    daily_protein_goal: f64,
    daily_carbs_goal: f64,
    daily_fat_goal: f64,
    daily_water_goal: f64,
    #[serde(default)]
    calorie_explanation: String,
    #[serde(default)]
    macros_explanation: String,
    #[serde(default)]
    water_explanation: String,
}

impl RemoteNeeds {
    fn into_estimate(self) -> LlmResult<NeedsEstimate> {
        let goals = [
            ("daily_calorie_goal", self.daily_calorie_goal),
            ("daily_protein_goal", self.daily_protein_goal),
            ("daily_carbs_goal", self.daily_carbs_goal),
            ("daily_fat_goal", self.daily_fat_goal),
            ("daily_water_goal", self.daily_water_goal),
        ];
        if let Some((field, value)) = goals.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LlmError::OutOfRange(format!("{} = {}", field, value)));
        }

        Ok(NeedsEstimate {
            daily_calorie_goal: self.daily_calorie_goal.round() as i64,
            daily_protein_goal: self.daily_protein_goal.round() as i64,
            daily_carbs_goal: self.daily_carbs_goal.round() as i64,
            daily_fat_goal: self.daily_fat_goal.round() as i64,
            daily_water_goal: self.daily_water_goal.round() as i64,
            calorie_explanation: self.calorie_explanation,
            macros_explanation: self.macros_explanation,
            water_explanation: self.water_explanation,
            source: NeedsSource::Service,
        })
    }
}

/// Estimates daily needs, preferring the completion service when configured
#[derive(Clone, Default)]
pub struct NeedsEstimator {
    client: Option<Arc<dyn CompletionClient>>,
}

impl fmt::Debug for NeedsEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeedsEstimator")
            .field("remote", &self.client.is_some())
            .finish()
    }
}

impl NeedsEstimator {
    pub fn new(client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { client }
    }

    /// Recommended targets for `profile`. Never fails.
    pub fn estimate_needs(&self, profile: &ProfileSnapshot) -> NeedsEstimate {
        let Some(client) = &self.client else {
            return local_needs(profile);
        };

        match estimate_remotely(client.as_ref(), profile) {
            Ok(estimate) => estimate,
            Err(e) => {
                tracing::warn!("Needs estimate from completion service failed: {}", e);
                local_needs(profile)
            }
        }
    }
}

/// Ask the completion service for targets; the result is already clamped
pub fn estimate_remotely(
    client: &dyn CompletionClient,
    profile: &ProfileSnapshot,
) -> LlmResult<NeedsEstimate> {
    let text = client.complete(&needs_prompt(profile))?;
    let remote: RemoteNeeds = parse_embedded_json(&text)?;
    Ok(remote.into_estimate()?.clamped(profile.weight))
}

fn needs_prompt(profile: &ProfileSnapshot) -> CompletionRequest {
    let prompt = format!(
        r#"You are a nutrition expert and personal trainer.
Given a user with the following profile, calculate their optimal daily calorie intake, macronutrient distribution, and water needs:

Age: {}
Weight: {} kg
Height: {} cm
Gender: {}
Activity Level: {}
Goal: {}

Return ONLY a JSON object with these values and a brief explanation for each. Format:
{{
    "daily_calorie_goal": 0000,
    "daily_protein_goal": 000,
    "daily_carbs_goal": 000,
    "daily_fat_goal": 000,
    "daily_water_goal": 0000,
    "calorie_explanation": "Brief explanation of calorie calculation",
    "macros_explanation": "Brief explanation of macronutrient distribution",
    "water_explanation": "Brief explanation of water intake recommendation"
}}"#,
        profile.age,
        profile.weight,
        profile.height,
        profile.gender,
        profile.activity_level,
        profile.goal
    );

    CompletionRequest {
        prompt,
        max_tokens: 500,
        temperature: 0.3,
        top_p: 0.9,
    }
}
