//! Nutrition totals
//!
//! Used for estimates, food entries and daily summaries.

use serde::{Deserialize, Serialize};

/// Calories and macronutrients for a meal or a day
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: i64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
}

/// Round to one decimal place, half to even on the exact binary value
pub fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl NutritionTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    /// No calories and no protein: nothing was recognized
    pub fn is_empty(&self) -> bool {
        self.calories == 0 && self.protein == 0.0
    }

    /// Add one item's contribution, truncating calories and rounding each
    /// macro to one decimal before it is summed. Non-finite products add
    /// nothing and calories saturate.
    pub fn add_scaled(&mut self, calories: f64, protein: f64, carbs: f64, fat: f64, multiplier: f64) {
        let calories = finite_or_zero(calories * multiplier) as i64;
        self.calories = self.calories.saturating_add(calories);
        self.protein += round1(finite_or_zero(protein * multiplier));
        self.carbs += round1(finite_or_zero(carbs * multiplier));
        self.fat += round1(finite_or_zero(fat * multiplier));
    }
}

impl std::ops::Add for NutritionTotals {
    type Output = NutritionTotals;

    fn add(self, other: NutritionTotals) -> NutritionTotals {
        NutritionTotals {
            calories: self.calories.saturating_add(other.calories),
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
        }
    }
}

impl std::iter::Sum for NutritionTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutritionTotals::zero(), |acc, n| acc + n)
    }
}
