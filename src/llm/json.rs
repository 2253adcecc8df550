//! JSON extraction from completion text
//!
//! Models tend to wrap the requested object in prose, so the object is taken
//! from the first `{` to the last `}`.

use serde::de::DeserializeOwned;

use super::client::{LlmError, LlmResult};

/// Slice from the first `{` through the last `}`, if both exist in order
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse the embedded JSON object of a completion into `T`
pub fn parse_embedded_json<T: DeserializeOwned>(text: &str) -> LlmResult<T> {
    let json = extract_json_object(text).ok_or(LlmError::NoJsonObject)?;
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        calories: f64,
    }

    #[test]
    fn test_extract_with_surrounding_prose() {
        let text = "Sure! Here it is:\n{\"calories\": 250}\nEnjoy.";
        assert_eq!(extract_json_object(text), Some("{\"calories\": 250}"));
    }

    #[test]
    fn test_extract_spans_first_to_last_brace() {
        let text = "{\"a\": {\"b\": 1}} trailing }";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}} trailing }"));
    }

    #[test]
    fn test_extract_missing_or_reversed_braces() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
        assert_eq!(extract_json_object("{ unterminated"), None);
    }

    #[test]
    fn test_parse_embedded_json() {
        let sample: Sample = parse_embedded_json("result: {\"calories\": 12.5}").unwrap();
        assert_eq!(sample.calories, 12.5);

        assert!(matches!(
            parse_embedded_json::<Sample>("nothing"),
            Err(LlmError::NoJsonObject)
        ));
        assert!(matches!(
            parse_embedded_json::<Sample>("{calories: twelve}"),
            Err(LlmError::InvalidJson(_))
        ));
    }
}
