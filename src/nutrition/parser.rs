//! Food description parser
//!
//! Splits a free-text description into phrases and reads a quantity, unit
//! and food name out of each phrase. Three phrase shapes are recognized, in
//! priority order:
//!
//! - "100 grams of tuna" (quantity, unit, optional "of", name)
//! - "6 egg whites" (quantity, name)
//! - "chicken breast 100g" or just "rice" (name, optional quantity and unit)
//!
//! Parsing never consults the catalog; the estimator decides which of the
//! candidates a phrase produces actually resolves to a known food.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::units::{MeasureUnit, UNIT_PATTERN};

/// Quantity assumed when a name has no number after it
pub const DEFAULT_QUANTITY: f64 = 100.0;

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",|\band\b").expect("separator regex"));

static QUANTITY_UNIT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<qty>\d+(?:\.\d+)?)\s*(?P<unit>{UNIT_PATTERN})\s+(?:of\s+)?(?P<name>.+)$"
    ))
    .expect("quantity-unit-name regex")
});

static QUANTITY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<qty>\d+(?:\.\d+)?)\s+(?P<name>.+)$").expect("quantity-name regex")
});

static NAME_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<name>[^\d]+?)\s*(?:(?P<qty>\d+(?:\.\d+)?)\s*(?P<unit>{UNIT_PATTERN})?)?$"
    ))
    .expect("name-quantity regex")
});

/// The phrase shapes, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhrasePattern {
    /// `<number> <unit> [of] <name>`
    QuantityUnitName,
    /// `<number> <name>`
    QuantityName,
    /// `<name> [<number> [unit]]`
    NameQuantity,
}

impl PhrasePattern {
    /// Priority order
    pub const ALL: [PhrasePattern; 3] = [
        PhrasePattern::QuantityUnitName,
        PhrasePattern::QuantityName,
        PhrasePattern::NameQuantity,
    ];

    /// Try to read a food item out of `phrase` with this shape
    pub fn parse(&self, phrase: &str) -> Option<ParsedFoodItem> {
        match self {
            PhrasePattern::QuantityUnitName => {
                let caps = QUANTITY_UNIT_NAME.captures(phrase)?;
                let quantity = parse_quantity(&caps["qty"])?;
                let unit = MeasureUnit::from_token(&caps["unit"])?;
                Some(ParsedFoodItem::new(*self, quantity, Some(unit), &caps["name"], phrase))
            }
            PhrasePattern::QuantityName => {
                let caps = QUANTITY_NAME.captures(phrase)?;
                let quantity = parse_quantity(&caps["qty"])?;
                Some(ParsedFoodItem::new(*self, quantity, None, &caps["name"], phrase))
            }
            PhrasePattern::NameQuantity => {
                let caps = NAME_QUANTITY.captures(phrase)?;
                let (quantity, unit) = match caps.name("qty") {
                    Some(qty) => (
                        parse_quantity(qty.as_str())?,
                        caps.name("unit").and_then(|u| MeasureUnit::from_token(u.as_str())),
                    ),
                    None => (DEFAULT_QUANTITY, Some(MeasureUnit::Grams)),
                };
                Some(ParsedFoodItem::new(*self, quantity, unit, &caps["name"], phrase))
            }
        }
    }
}

/// Digits too long for an f64 parse to infinity and are not a quantity
fn parse_quantity(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|q| q.is_finite())
}

/// One food item read out of a phrase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedFoodItem {
    pub pattern: PhrasePattern,
    pub quantity: f64,
    /// `None` for a bare count ("6 eggs")
    pub unit: Option<MeasureUnit>,
    pub food_name: String,
    pub raw_phrase: String,
}

impl ParsedFoodItem {
    fn new(pattern: PhrasePattern, quantity: f64, unit: Option<MeasureUnit>, name: &str, phrase: &str) -> Self {
        Self {
            pattern,
            quantity,
            unit,
            food_name: name.trim().to_string(),
            raw_phrase: phrase.to_string(),
        }
    }
}

/// Split a lowercased description on commas and the word "and"
pub fn segment(description: &str) -> Vec<&str> {
    SEPARATOR
        .split(description)
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect()
}

/// Every reading of `phrase`, in priority order
pub fn candidates(phrase: &str) -> Vec<ParsedFoodItem> {
    PhrasePattern::ALL
        .iter()
        .filter_map(|pattern| pattern.parse(phrase))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_on_commas_and_and() {
        assert_eq!(
            segment("6 egg whites, 100 grams of tuna and 2 bananas"),
            vec!["6 egg whites", "100 grams of tuna", "2 bananas"]
        );
    }

    #[test]
    fn test_segment_keeps_and_inside_words() {
        assert_eq!(segment("sandwich and candy"), vec!["sandwich", "candy"]);
    }

    #[test]
    fn test_segment_drops_empty_phrases() {
        assert_eq!(segment(" , rice,, and "), vec!["rice"]);
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_quantity_unit_name() {
        let item = PhrasePattern::QuantityUnitName.parse("100 grams of tuna").unwrap();
        assert_eq!(item.quantity, 100.0);
        assert_eq!(item.unit, Some(MeasureUnit::Grams));
        assert_eq!(item.food_name, "tuna");

        let item = PhrasePattern::QuantityUnitName.parse("250ml milk").unwrap();
        assert_eq!(item.quantity, 250.0);
        assert_eq!(item.unit, Some(MeasureUnit::Milliliters));
        assert_eq!(item.food_name, "milk");

        let item = PhrasePattern::QuantityUnitName.parse("1.5 cups of rice").unwrap();
        assert_eq!(item.quantity, 1.5);
        assert_eq!(item.unit, Some(MeasureUnit::Cups));
    }

    #[test]
    fn test_quantity_unit_name_rejects_unit_prefix_of_word() {
        // "g" followed by "rapes" is not a unit
        assert!(PhrasePattern::QuantityUnitName.parse("6 grapes").is_none());
        assert!(PhrasePattern::QuantityUnitName.parse("6 egg whites").is_none());
    }

    #[test]
    fn test_quantity_name() {
        let item = PhrasePattern::QuantityName.parse("6 egg whites").unwrap();
        assert_eq!(item.quantity, 6.0);
        assert_eq!(item.unit, None);
        assert_eq!(item.food_name, "egg whites");
        assert!(PhrasePattern::QuantityName.parse("100g tuna").is_none());
    }

    #[test]
    fn test_name_quantity_with_unit() {
        let item = PhrasePattern::NameQuantity.parse("chicken breast 100g").unwrap();
        assert_eq!(item.food_name, "chicken breast");
        assert_eq!(item.quantity, 100.0);
        assert_eq!(item.unit, Some(MeasureUnit::Grams));

        let item = PhrasePattern::NameQuantity.parse("rice 200 grams").unwrap();
        assert_eq!(item.food_name, "rice");
        assert_eq!(item.quantity, 200.0);
        assert_eq!(item.unit, Some(MeasureUnit::Grams));
    }

    #[test]
    fn test_name_quantity_without_unit() {
        let item = PhrasePattern::NameQuantity.parse("banana 2").unwrap();
        assert_eq!(item.food_name, "banana");
        assert_eq!(item.quantity, 2.0);
        assert_eq!(item.unit, None);
    }

    #[test]
    fn test_name_alone_defaults_to_100_grams() {
        let item = PhrasePattern::NameQuantity.parse("grilled salmon").unwrap();
        assert_eq!(item.food_name, "grilled salmon");
        assert_eq!(item.quantity, DEFAULT_QUANTITY);
        assert_eq!(item.unit, Some(MeasureUnit::Grams));
    }

    #[test]
    fn test_candidates_in_priority_order() {
        let found = candidates("100 grams of tuna");
        let patterns: Vec<_> = found.iter().map(|c| c.pattern).collect();
        assert_eq!(
            patterns,
            vec![PhrasePattern::QuantityUnitName, PhrasePattern::QuantityName]
        );
        assert_eq!(found[1].food_name, "grams of tuna");
    }

    #[test]
    fn test_candidates_none_for_bare_number() {
        assert!(candidates("42").is_empty());
    }

    #[test]
    fn test_overlong_quantity_is_not_a_quantity() {
        let digits = "9".repeat(400);
        assert!(candidates(&format!("{} grams of tuna", digits)).is_empty());
        assert!(candidates(&format!("{} eggs", digits)).is_empty());
        assert!(candidates(&format!("rice {}g", digits)).is_empty());
    }
}
