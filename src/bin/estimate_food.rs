//! Estimate nutrition for a food description from the command line
//!
//! Usage: estimate-food 2 eggs and 100 grams of tuna

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use macrolog::llm::LlmConfig;
use macrolog::nutrition::{FoodEstimator, NutrientCatalog};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("macrolog=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let description = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if description.trim().is_empty() {
        eprintln!("Usage: estimate-food <description...>");
        std::process::exit(2);
    }

    let estimator = FoodEstimator::new(Arc::new(NutrientCatalog::with_defaults()))
        .with_client(LlmConfig::from_env().client());

    let totals = estimator.estimate(&description);
    println!("{}", serde_json::to_string_pretty(&totals)?);

    Ok(())
}
