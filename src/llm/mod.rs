//! External completion service
//!
//! Client for the hosted text-completion API used when local estimation has
//! nothing to offer.

pub mod client;
pub mod json;

pub use client::{
    CompletionClient, CompletionRequest, LlmConfig, LlmError, LlmResult, TogetherClient,
    DEFAULT_API_URL, DEFAULT_MODEL,
};
pub use json::{extract_json_object, parse_embedded_json};
