//! Food description estimator
//!
//! Turns a free-text description into calorie and macro totals using the
//! nutrient catalog, and asks the completion service only when nothing in
//! the description was recognized.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use super::catalog::NutrientCatalog;
use super::parser::{candidates, segment, ParsedFoodItem, PhrasePattern};
use super::units::{serving_multiplier, ServingBasis};
use crate::llm::{parse_embedded_json, CompletionClient, CompletionRequest, LlmError, LlmResult};
use crate::models::{round1, NutritionTotals};

/// Per-egg-white values. Egg whites are not in the catalog ("egg" would
/// match a whole egg), so counted egg whites use these directly.
const EGG_WHITE: [f64; 4] = [17.0, 3.6, 0.2, 0.1];

/// Nutrients and multiplier for one resolved food item
#[derive(Debug, Clone, Copy, PartialEq)]
struct ResolvedItem {
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    multiplier: f64,
}

/// Shape the completion service is asked to return
#[derive(Debug, Deserialize)]
struct RemoteNutrition {
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
}

impl RemoteNutrition {
    fn validate(self) -> LlmResult<NutritionTotals> {
        for (field, value) in [
            ("calories", self.calories),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LlmError::OutOfRange(format!("{} = {}", field, value)));
            }
        }

        Ok(NutritionTotals {
            calories: self.calories as i64,
            protein: round1(self.protein),
            carbs: round1(self.carbs),
            fat: round1(self.fat),
        })
    }
}

/// Estimates nutrition totals for food descriptions
#[derive(Clone)]
pub struct FoodEstimator {
    catalog: Arc<NutrientCatalog>,
    client: Option<Arc<dyn CompletionClient>>,
}

impl fmt::Debug for FoodEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoodEstimator")
            .field("catalog_entries", &self.catalog.len())
            .field("remote_fallback", &self.client.is_some())
            .finish()
    }
}

impl FoodEstimator {
    /// Local-only estimator over `catalog`
    pub fn new(catalog: Arc<NutrientCatalog>) -> Self {
        Self {
            catalog,
            client: None,
        }
    }

    /// Use `client` when a description yields nothing locally
    pub fn with_client(mut self, client: Option<Arc<dyn CompletionClient>>) -> Self {
        self.client = client;
        self
    }

    /// Estimate totals for `description`. Never fails: unknown foods add
    /// nothing and service errors fall back to the local result.
    pub fn estimate(&self, description: &str) -> NutritionTotals {
        let normalized = description.trim().to_lowercase();
        if normalized.is_empty() {
            return NutritionTotals::zero();
        }

        let totals = self.estimate_locally(&normalized);
        if !totals.is_empty() {
            return totals;
        }

        let Some(client) = &self.client else {
            return totals;
        };

        match self.estimate_remotely(client.as_ref(), description) {
            Ok(remote) => {
                tracing::info!("Estimated '{}' with completion service", description);
                remote
            }
            Err(e) => {
                tracing::warn!("Completion fallback failed for '{}': {}", description, e);
                totals
            }
        }
    }

    /// Catalog-only estimate of an already lowercased description
    pub fn estimate_locally(&self, normalized: &str) -> NutritionTotals {
        let mut totals = NutritionTotals::zero();

        for phrase in segment(normalized) {
            let resolved = candidates(phrase)
                .into_iter()
                .find_map(|item| self.resolve(&item).map(|r| (item, r)));

            match resolved {
                Some((item, r)) => {
                    tracing::debug!(
                        "'{}' matched as {:?} x{}",
                        item.raw_phrase,
                        item.pattern,
                        r.multiplier
                    );
                    totals.add_scaled(r.calories, r.protein, r.carbs, r.fat, r.multiplier);
                }
                None => tracing::debug!("No catalog match for '{}'", phrase),
            }
        }

        totals
    }

    /// Resolve one candidate reading against the catalog
    fn resolve(&self, item: &ParsedFoodItem) -> Option<ResolvedItem> {
        match item.pattern {
            PhrasePattern::QuantityName => {
                if is_egg_white(&item.food_name) {
                    let [calories, protein, carbs, fat] = EGG_WHITE;
                    return Some(ResolvedItem {
                        calories,
                        protein,
                        carbs,
                        fat,
                        multiplier: item.quantity,
                    });
                }

                // A bare count only makes sense for foods measured per unit
                let (_, record) = self
                    .catalog
                    .iter()
                    .find(|(name, r)| r.basis == ServingBasis::PerUnit && item.food_name.contains(name))?;
                Some(ResolvedItem {
                    calories: record.calories,
                    protein: record.protein,
                    carbs: record.carbs,
                    fat: record.fat,
                    multiplier: item.quantity,
                })
            }
            PhrasePattern::QuantityUnitName | PhrasePattern::NameQuantity => {
                let (_, record) = self.catalog.lookup(&item.food_name)?;
                Some(ResolvedItem {
                    calories: record.calories,
                    protein: record.protein,
                    carbs: record.carbs,
                    fat: record.fat,
                    multiplier: serving_multiplier(record.basis, item.quantity, item.unit),
                })
            }
        }
    }

    /// Ask the completion service for an estimate of the raw description
    pub fn estimate_remotely(
        &self,
        client: &dyn CompletionClient,
        description: &str,
    ) -> LlmResult<NutritionTotals> {
        let text = client.complete(&food_prompt(description))?;
        let remote: RemoteNutrition = parse_embedded_json(&text)?;
        remote.validate()
    }
}

fn is_egg_white(name: &str) -> bool {
    name.contains("egg white")
}

fn food_prompt(description: &str) -> CompletionRequest {
    let prompt = format!(
        r#"You are a nutrition expert. Given this food description: "{}",
estimate its nutritional content with these values:
- calories (kcal)
- protein (g)
- carbs (g)
- fat (g)

Return ONLY a JSON object with these values, nothing else. Format:
{{
    "calories": 000,
    "protein": 00.0,
    "carbs": 00.0,
    "fat": 00.0
}}"#,
        description
    );

    CompletionRequest {
        prompt,
        max_tokens: 150,
        temperature: 0.3,
        top_p: 0.9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::catalog::NutrientRecord;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Completion double returning a canned reply and counting calls
    struct CannedClient {
        reply: LlmResult<String>,
        calls: AtomicUsize,
    }

    impl CannedClient {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(LlmError::Status(503)),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl CompletionClient for CannedClient {
        fn complete(&self, _request: &CompletionRequest) -> LlmResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(LlmError::Status(503)),
            }
        }
    }

    fn estimator() -> FoodEstimator {
        FoodEstimator::new(Arc::new(NutrientCatalog::with_defaults()))
    }

    fn with_client(client: &Arc<CannedClient>) -> FoodEstimator {
        let client: Arc<dyn CompletionClient> = client.clone();
        estimator().with_client(Some(client))
    }

    #[test]
    fn test_quantity_unit_name() {
        let totals = estimator().estimate("100 grams of tuna");
        assert_eq!(totals.calories, 132);
        assert_eq!(totals.protein, 29.0);
        assert_eq!(totals.carbs, 0.0);
        assert_eq!(totals.fat, 1.0);
    }

    #[test]
    fn test_name_then_quantity() {
        let totals = estimator().estimate("chicken breast 100g");
        assert_eq!(totals.calories, 165);
        assert_eq!(totals.protein, 31.0);
        assert_eq!(totals.carbs, 0.0);
        assert_eq!(totals.fat, 3.6);
    }

    #[test]
    fn test_egg_whites() {
        let totals = estimator().estimate("6 egg whites");
        assert_eq!(totals.calories, 102);
        assert_eq!(totals.protein, 21.6);
        assert_eq!(totals.carbs, 1.2);
        assert_eq!(totals.fat, 0.6);
    }

    #[test]
    fn test_egg_whites_with_extra_words() {
        let totals = estimator().estimate("6 large egg whites");
        assert_eq!(totals.calories, 102);
        assert_eq!(totals.protein, 21.6);

        let totals = estimator().estimate("3 egg whites scrambled");
        assert_eq!(totals.calories, 51);
    }

    #[test]
    fn test_partial_serving_rounds_half_to_even() {
        // 29 * 0.25 = 7.25 and 1 * 0.25 = 0.25 are exact ties
        let totals = estimator().estimate("25g tuna");
        assert_eq!(totals.calories, 33);
        assert_eq!(totals.protein, 7.2);
        assert_eq!(totals.carbs, 0.0);
        assert_eq!(totals.fat, 0.2);
    }

    #[test]
    fn test_huge_quantities_do_not_overflow() {
        let totals = estimator().estimate(
            "100000000000000000000000000 grams of tuna, 100000000000000000000000000 grams of tuna",
        );
        assert_eq!(totals.calories, i64::MAX);
        assert!(totals.protein.is_finite());
        assert!(totals.carbs.is_finite());

        let digits = "9".repeat(400);
        let totals = estimator().estimate(&format!("{} grams of tuna, 2 bananas", digits));
        assert_eq!(totals.calories, 178);
        assert!(totals.carbs.is_finite());
    }

    #[test]
    fn test_counted_per_unit_food() {
        let totals = estimator().estimate("2 bananas");
        assert_eq!(totals.calories, 178);
        assert_eq!(totals.protein, 2.2);
        assert_eq!(totals.carbs, 46.0);
        assert_eq!(totals.fat, 0.6);
    }

    #[test]
    fn test_input_is_trimmed_and_lowercased() {
        assert_eq!(
            estimator().estimate("  100 Grams of TUNA  "),
            estimator().estimate("100 grams of tuna")
        );
    }

    #[test]
    fn test_multiple_phrases_accumulate() {
        let totals = estimator().estimate("6 egg whites, 100 grams of tuna and 2 bananas");
        assert_eq!(totals.calories, 102 + 132 + 178);
        assert!((totals.protein - (21.6 + 29.0 + 2.2)).abs() < 1e-9);
        assert!((totals.carbs - (1.2 + 0.0 + 46.0)).abs() < 1e-9);
        assert!((totals.fat - (0.6 + 1.0 + 0.6)).abs() < 1e-9);
    }

    #[test]
    fn test_grams_scale_per_100g_records() {
        let totals = estimator().estimate("250g rice");
        assert_eq!(totals.calories, 325);
        assert_eq!(totals.protein, 6.8); // product is just above 6.75
        assert_eq!(totals.carbs, 70.0);
        assert_eq!(totals.fat, 0.8);
    }

    #[test]
    fn test_calories_truncate_per_item() {
        // 165 * 0.55 = 90.75 each; truncation happens before summing
        let totals = estimator().estimate("55g chicken breast, 55g chicken breast");
        assert_eq!(totals.calories, 180);
    }

    #[test]
    fn test_milliliters_scale_per_100ml_records() {
        let totals = estimator().estimate("250 ml of milk");
        assert_eq!(totals.calories, 105);
        assert_eq!(totals.protein, 8.5);
        assert_eq!(totals.carbs, 12.5);
        assert_eq!(totals.fat, 2.5);
    }

    #[test]
    fn test_unit_mismatch_counts_one_serving() {
        let totals = estimator().estimate("8 oz of salmon");
        assert_eq!(totals.calories, 208);
        let totals = estimator().estimate("2 cups of milk");
        assert_eq!(totals.calories, 42);
    }

    #[test]
    fn test_bare_name_is_100_grams() {
        let totals = estimator().estimate("broccoli");
        assert_eq!(totals.calories, 34);
        assert_eq!(totals.protein, 2.8);
    }

    #[test]
    fn test_bare_per_unit_name_is_one_item() {
        assert_eq!(estimator().estimate("egg").calories, 72);
        assert_eq!(estimator().estimate("banana 3").calories, 267);
    }

    #[test]
    fn test_count_of_per_100g_food_falls_through() {
        // apples are per 100g, so the count reading has no match and no
        // other pattern reads a phrase starting with a number
        let totals = estimator().estimate("2 apples");
        assert_eq!(totals, NutritionTotals::zero());
    }

    #[test]
    fn test_unit_pattern_without_catalog_match_falls_through() {
        assert_eq!(estimator().estimate("3 grams of mystery"), NutritionTotals::zero());

        // "cup" reads as a unit leaving "cakes", which is unknown, so the
        // count reading of "cup cakes" is tried next
        let catalog = NutrientCatalog::new(vec![(
            "cup cake",
            NutrientRecord::new(180.0, 2.0, 25.0, 8.0, ServingBasis::PerUnit),
        )]);
        let e = FoodEstimator::new(Arc::new(catalog));
        let totals = e.estimate("2 cup cakes");
        assert_eq!(totals.calories, 360);
        assert_eq!(totals.protein, 4.0);
    }

    #[test]
    fn test_unrecognized_foods_are_zero() {
        let totals = estimator().estimate("dragonfruit, 3 jellybeans and kombucha 200ml");
        assert_eq!(totals, NutritionTotals::zero());
    }

    #[test]
    fn test_empty_description_is_zero() {
        assert_eq!(estimator().estimate(""), NutritionTotals::zero());
        assert_eq!(estimator().estimate("   "), NutritionTotals::zero());
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let e = estimator();
        let first = e.estimate("2 bananas, rice 150g");
        let second = e.estimate("2 bananas, rice 150g");
        assert_eq!(first, second);
    }

    #[test]
    fn test_injected_catalog() {
        let catalog = NutrientCatalog::new(vec![(
            "tofu",
            NutrientRecord::new(76.0, 8.0, 1.9, 4.8, ServingBasis::Per100Grams),
        )]);
        let e = FoodEstimator::new(Arc::new(catalog));
        assert_eq!(e.estimate("200 g tofu").calories, 152);
        assert_eq!(e.estimate("100 grams of tuna"), NutritionTotals::zero());
    }

    #[test]
    fn test_fallback_used_when_nothing_recognized() {
        let client = CannedClient::ok(
            "Here you go: {\"calories\": 410.7, \"protein\": 22.04, \"carbs\": 35, \"fat\": 18.25} hope that helps",
        );
        let totals = with_client(&client).estimate("a bowl of pho");
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(totals.calories, 410);
        assert_eq!(totals.protein, 22.0);
        assert_eq!(totals.carbs, 35.0);
        assert_eq!(totals.fat, 18.2);
    }

    #[test]
    fn test_fallback_skipped_when_local_match() {
        let client = CannedClient::ok("{\"calories\": 1, \"protein\": 1, \"carbs\": 1, \"fat\": 1}");
        let totals = with_client(&client).estimate("100 grams of tuna");
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
        assert_eq!(totals.calories, 132);
    }

    #[test]
    fn test_fallback_skipped_for_empty_description() {
        let client = CannedClient::ok("{\"calories\": 1, \"protein\": 1, \"carbs\": 1, \"fat\": 1}");
        assert_eq!(with_client(&client).estimate("  "), NutritionTotals::zero());
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fallback_failures_return_local_totals() {
        let replies = [
            "no numbers today",
            "{\"calories\": \"lots\"}",
            "{\"calories\": 100, \"protein\": 5}",
            "{\"calories\": -100, \"protein\": 5, \"carbs\": 1, \"fat\": 1}",
            "} reversed {",
        ];
        for reply in replies {
            let client = CannedClient::ok(reply);
            let totals = with_client(&client).estimate("mystery stew");
            assert_eq!(totals, NutritionTotals::zero(), "reply: {}", reply);
            assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        }

        let client = CannedClient::failing();
        assert_eq!(with_client(&client).estimate("mystery stew"), NutritionTotals::zero());
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_estimate_remotely_surfaces_errors() {
        let e = estimator();
        let client = CannedClient::ok("nothing useful");
        assert!(matches!(
            e.estimate_remotely(client.as_ref(), "stew"),
            Err(LlmError::NoJsonObject)
        ));
        let client = CannedClient::failing();
        assert!(matches!(
            e.estimate_remotely(client.as_ref(), "stew"),
            Err(LlmError::Status(503))
        ));
    }

    #[test]
    fn test_food_prompt_embeds_description() {
        let request = food_prompt("Pad Thai");
        assert!(request.prompt.contains("\"Pad Thai\""));
        assert!(request.prompt.contains("\"calories\": 000"));
        assert_eq!(request.max_tokens, 150);
    }
}
