//! Macro Log
//!
//! An MCP server for calorie, macro and water tracking.

use std::path::PathBuf;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use macrolog::build_info;
use macrolog::db::{migrations, Database};
use macrolog::llm::LlmConfig;
use macrolog::mcp::MacrologService;
use macrolog::nutrition::NutrientCatalog;

/// Get the database path from environment or use default
fn get_database_path() -> PathBuf {
    std::env::var("MACROLOG_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("macrolog.db");
            path
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("macrolog=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let db_path = get_database_path();
    eprintln!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Opening runs migrations
    let database = Database::open(&db_path)?;
    let version = database.with_conn(|conn| migrations::get_schema_version(conn))?;
    eprintln!("Database schema version: {}", version);

    let llm_config = LlmConfig::from_env();
    if llm_config.is_configured() {
        tracing::info!("Completion service: {} ({})", llm_config.api_url, llm_config.model);
    } else {
        tracing::info!("No completion service configured, using local estimates only");
    }

    let service = MacrologService::new(
        db_path,
        database,
        NutrientCatalog::with_defaults(),
        llm_config.client(),
    );

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
