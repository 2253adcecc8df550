//! Nutrition estimation module
//!
//! Food description parsing against a nutrient catalog, daily needs
//! estimation, and completion-backed recommendations.

pub mod catalog;
pub mod estimator;
pub mod needs;
pub mod parser;
pub mod recommendation;
pub mod units;

pub use catalog::{NutrientCatalog, NutrientRecord};
pub use estimator::FoodEstimator;
pub use needs::{
    local_needs, ActivityLevel, Goal, NeedsEstimate, NeedsEstimator, NeedsSource, ProfileSnapshot,
};
pub use parser::{candidates, segment, ParsedFoodItem, PhrasePattern};
pub use recommendation::recommend;
pub use units::{serving_multiplier, MeasureUnit, ServingBasis};
