//! Macro Log Library
//!
//! Food description parsing, nutrition estimation and daily logging.

pub mod build_info;
pub mod db;
pub mod llm;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
