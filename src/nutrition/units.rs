//! Unit types recognized in food descriptions
//!
//! Only a handful of unit tokens are understood by the description parser.
//! Anything else is treated as part of the food name.

use serde::{Deserialize, Serialize};

/// Reference quantity a catalog record's nutrient values are expressed per
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServingBasis {
    /// Values per 100 grams (solids)
    Per100Grams,
    /// Values per 100 milliliters (liquids)
    Per100Milliliters,
    /// Values per one discrete item (eggs, whole fruit)
    PerUnit,
}

/// A measurement unit written after a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureUnit {
    Grams,
    Milliliters,
    Ounces,
    Cups,
}

/// Regex alternation for the unit tokens, longest spelling first so that
/// "grams" is not consumed as "g" followed by "rams".
pub const UNIT_PATTERN: &str = r"grams|gram|g|ounce|oz|ml|cups|cup";

impl MeasureUnit {
    /// Parse a unit token as written in a description
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" => Some(MeasureUnit::Grams),
            "ml" => Some(MeasureUnit::Milliliters),
            "oz" | "ounce" => Some(MeasureUnit::Ounces),
            "cup" | "cups" => Some(MeasureUnit::Cups),
            _ => None,
        }
    }
}

/// Multiplier to apply to a record for `quantity` of `unit`.
///
/// Only gram quantities against per-100g records and milliliter quantities
/// against per-100ml records are scaled. A discrete count (no unit) against a
/// per-unit record scales by the count. Every other combination counts as
/// one serving; ounces and cups are never converted.
pub fn serving_multiplier(basis: ServingBasis, quantity: f64, unit: Option<MeasureUnit>) -> f64 {
    match (basis, unit) {
        (ServingBasis::Per100Grams, Some(MeasureUnit::Grams)) => quantity / 100.0,
        (ServingBasis::Per100Milliliters, Some(MeasureUnit::Milliliters)) => quantity / 100.0,
        (ServingBasis::PerUnit, None) => quantity,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_token() {
        assert_eq!(MeasureUnit::from_token("g"), Some(MeasureUnit::Grams));
        assert_eq!(MeasureUnit::from_token("gram"), Some(MeasureUnit::Grams));
        assert_eq!(MeasureUnit::from_token("grams"), Some(MeasureUnit::Grams));
        assert_eq!(MeasureUnit::from_token("ml"), Some(MeasureUnit::Milliliters));
        assert_eq!(MeasureUnit::from_token("oz"), Some(MeasureUnit::Ounces));
        assert_eq!(MeasureUnit::from_token("ounce"), Some(MeasureUnit::Ounces));
        assert_eq!(MeasureUnit::from_token("cups"), Some(MeasureUnit::Cups));
        assert_eq!(MeasureUnit::from_token("tbsp"), None);
        assert_eq!(MeasureUnit::from_token("slice"), None);
    }

    #[test]
    fn test_multiplier_scales_matching_units() {
        assert!((serving_multiplier(ServingBasis::Per100Grams, 250.0, Some(MeasureUnit::Grams)) - 2.5).abs() < 1e-9);
        assert!((serving_multiplier(ServingBasis::Per100Milliliters, 50.0, Some(MeasureUnit::Milliliters)) - 0.5).abs() < 1e-9);
        assert_eq!(serving_multiplier(ServingBasis::PerUnit, 3.0, None), 3.0);
    }

    #[test]
    fn test_multiplier_mismatch_is_one_serving() {
        assert_eq!(serving_multiplier(ServingBasis::Per100Grams, 8.0, Some(MeasureUnit::Ounces)), 1.0);
        assert_eq!(serving_multiplier(ServingBasis::Per100Milliliters, 2.0, Some(MeasureUnit::Cups)), 1.0);
        assert_eq!(serving_multiplier(ServingBasis::Per100Grams, 200.0, None), 1.0);
        assert_eq!(serving_multiplier(ServingBasis::PerUnit, 100.0, Some(MeasureUnit::Grams)), 1.0);
    }
}
