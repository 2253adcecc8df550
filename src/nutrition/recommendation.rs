//! Personalized meal recommendation
//!
//! Free-text advice from the completion service about what to eat next,
//! based on the profile and the most recent food entries.

use std::fmt::Write;

use crate::llm::{CompletionClient, CompletionRequest, LlmError, LlmResult};
use crate::models::FoodEntry;

use super::needs::ProfileSnapshot;

/// How many of the latest entries are shown to the service
pub const RECENT_ENTRY_LIMIT: usize = 3;

/// Ask for a short recommendation. `recent` is in logging order and only
/// its last entries are listed.
///
/// Unlike the estimators there is no local fallback: without a service this
/// returns `LlmError::NotConfigured`.
pub fn recommend(
    client: Option<&dyn CompletionClient>,
    profile: &ProfileSnapshot,
    recent: &[FoodEntry],
) -> LlmResult<String> {
    let client = client.ok_or(LlmError::NotConfigured)?;
    let text = client.complete(&recommendation_prompt(profile, recent))?;
    if text.trim().is_empty() {
        return Err(LlmError::MalformedResponse("empty recommendation".to_string()));
    }
    Ok(text.trim().to_string())
}

fn recommendation_prompt(profile: &ProfileSnapshot, recent: &[FoodEntry]) -> CompletionRequest {
    let mut prompt = format!(
        "You are a nutrition expert and personal trainer.\n\
         Provide a personalized nutrition recommendation for a person with the following details:\n\n\
         Age: {}\nWeight: {} kg\nHeight: {} cm\nGender: {}\nGoal: {}\n",
        profile.age, profile.weight, profile.height, profile.gender, profile.goal
    );

    if !recent.is_empty() {
        prompt.push_str("\nRecent food intake:\n");
        let skip = recent.len().saturating_sub(RECENT_ENTRY_LIMIT);
        for entry in recent.iter().skip(skip) {
            let n = &entry.nutrition;
            // writing to a String cannot fail
            let _ = writeln!(
                prompt,
                "- {}: {} calories, {}g protein, {}g carbs, {}g fat",
                entry.name, n.calories, n.protein, n.carbs, n.fat
            );
        }
    }

    prompt.push_str(
        "\nProvide a short, personalized recommendation for what they should eat next \
         based on their goals and current nutrition intake. Include specific food suggestions.",
    );

    CompletionRequest {
        prompt,
        max_tokens: 300,
        temperature: 0.7,
        top_p: 0.9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutritionTotals;
    use std::sync::Mutex;

    /// Records the prompt it was sent
    struct RecordingClient {
        reply: String,
        prompt: Mutex<Option<String>>,
    }

    impl CompletionClient for RecordingClient {
        fn complete(&self, request: &CompletionRequest) -> LlmResult<String> {
            *self.prompt.lock().unwrap() = Some(request.prompt.clone());
            Ok(self.reply.clone())
        }
    }

    fn entry(name: &str, calories: i64) -> FoodEntry {
        FoodEntry {
            id: 1,
            date: "2025-03-01".to_string(),
            name: name.to_string(),
            nutrition: NutritionTotals {
                calories,
                protein: 12.0,
                carbs: 30.5,
                fat: 4.0,
            },
            meal_type: None,
            created_at: "2025-03-01 08:00:00".to_string(),
        }
    }

    #[test]
    fn test_requires_client() {
        let result = recommend(None, &ProfileSnapshot::default(), &[]);
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }

    #[test]
    fn test_prompt_lists_recent_entries() {
        let client = RecordingClient {
            reply: "  Try grilled salmon with rice.\n".to_string(),
            prompt: Mutex::new(None),
        };
        let recent = vec![entry("oatmeal", 300), entry("banana", 89), entry("tuna", 132), entry("pizza", 800)];

        let text = recommend(Some(&client), &ProfileSnapshot::default(), &recent).unwrap();
        assert_eq!(text, "Try grilled salmon with rice.");

        let prompt = client.prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Weight: 70 kg"));
        assert!(prompt.contains("- pizza: 800 calories, 12g protein, 30.5g carbs, 4g fat"));
        assert!(prompt.contains("- tuna: 132 calories"));
        assert!(prompt.contains("- banana: 89 calories"));
        assert!(!prompt.contains("oatmeal"));
    }

    #[test]
    fn test_empty_reply_is_an_error() {
        let client = RecordingClient {
            reply: "   ".to_string(),
            prompt: Mutex::new(None),
        };
        let result = recommend(Some(&client), &ProfileSnapshot::default(), &[]);
        assert!(matches!(result, Err(LlmError::MalformedResponse(_))));
    }
}
