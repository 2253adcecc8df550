//! Macro Log Tools module
//!
//! MCP tool implementations for the Macro Log service.

pub mod estimates;
pub mod log;
pub mod profile;
pub mod status;
