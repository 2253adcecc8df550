//! Nutrient catalog
//!
//! Static table of common foods used to estimate free-text descriptions.
//! Names are matched by substring against the lowercased food phrase, in
//! insertion order: the first entry whose name appears in the phrase wins.

use serde::Serialize;

use super::units::ServingBasis;

/// Nutrient values for one serving basis of a catalog food
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientRecord {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
    pub basis: ServingBasis,
}

impl NutrientRecord {
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64, basis: ServingBasis) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
            basis,
        }
    }
}

/// Ordered, immutable mapping of canonical food name to nutrient record
#[derive(Debug, Clone, Default)]
pub struct NutrientCatalog {
    entries: Vec<(String, NutrientRecord)>,
}

use super::units::ServingBasis::{Per100Grams, Per100Milliliters, PerUnit};

/// Foods known to the local estimator
const DEFAULT_FOODS: &[(&str, NutrientRecord)] = &[
    ("chicken breast", NutrientRecord::new(165.0, 31.0, 0.0, 3.6, Per100Grams)),
    ("rice", NutrientRecord::new(130.0, 2.7, 28.0, 0.3, Per100Grams)),
    ("potato", NutrientRecord::new(77.0, 2.0, 17.0, 0.1, Per100Grams)),
    ("egg", NutrientRecord::new(72.0, 6.3, 0.4, 5.0, PerUnit)),
    ("apple", NutrientRecord::new(52.0, 0.3, 14.0, 0.2, Per100Grams)),
    ("banana", NutrientRecord::new(89.0, 1.1, 23.0, 0.3, PerUnit)),
    ("beef", NutrientRecord::new(250.0, 26.0, 0.0, 17.0, Per100Grams)),
    ("salmon", NutrientRecord::new(208.0, 20.0, 0.0, 13.0, Per100Grams)),
    ("tuna", NutrientRecord::new(132.0, 29.0, 0.0, 1.0, Per100Grams)),
    ("pasta", NutrientRecord::new(131.0, 5.0, 25.0, 1.1, Per100Grams)),
    ("bread", NutrientRecord::new(265.0, 9.0, 49.0, 3.2, Per100Grams)),
    ("oatmeal", NutrientRecord::new(389.0, 16.9, 66.0, 6.9, Per100Grams)),
    ("milk", NutrientRecord::new(42.0, 3.4, 5.0, 1.0, Per100Milliliters)),
    ("yogurt", NutrientRecord::new(59.0, 3.6, 5.0, 3.1, Per100Grams)),
    ("orange", NutrientRecord::new(43.0, 1.0, 8.3, 0.2, Per100Grams)),
    ("broccoli", NutrientRecord::new(34.0, 2.8, 7.0, 0.4, Per100Grams)),
    ("carrot", NutrientRecord::new(41.0, 0.9, 10.0, 0.2, Per100Grams)),
    ("spinach", NutrientRecord::new(23.0, 2.9, 3.6, 0.4, Per100Grams)),
    ("avocado", NutrientRecord::new(160.0, 2.0, 9.0, 15.0, Per100Grams)),
    ("nuts", NutrientRecord::new(607.0, 21.0, 20.0, 54.0, Per100Grams)),
    ("cheese", NutrientRecord::new(350.0, 26.0, 3.1, 26.0, Per100Grams)),
];

impl NutrientCatalog {
    /// Build a catalog from `(name, record)` pairs, keeping their order.
    /// Names are lowercased and trimmed.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, NutrientRecord)>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(name, record)| (name.into().trim().to_lowercase(), record))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        Self { entries }
    }

    /// The built-in table of common foods
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_FOODS.iter().copied())
    }

    /// First record whose name is contained in `fragment`.
    ///
    /// `fragment` must already be lowercased.
    pub fn lookup(&self, fragment: &str) -> Option<(&str, &NutrientRecord)> {
        self.entries
            .iter()
            .find(|(name, _)| fragment.contains(name.as_str()))
            .map(|(name, record)| (name.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NutrientRecord)> {
        self.entries.iter().map(|(name, record)| (name.as_str(), record))
    }
}
