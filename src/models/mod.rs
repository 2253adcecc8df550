//! Data models
//!
//! Rust structs representing database entities.

mod food_entry;
mod nutrition;
mod profile;
mod water_intake;

pub use food_entry::{FoodEntry, FoodEntryCreate, MealType};
pub use nutrition::{round1, NutritionTotals};
pub use profile::{
    ProfileUpdate, UserProfile, DEFAULT_CALORIE_GOAL, DEFAULT_CARBS_GOAL, DEFAULT_FAT_GOAL,
    DEFAULT_PROTEIN_GOAL, DEFAULT_WATER_GOAL,
};
pub use water_intake::WaterIntake;
