//! Service-backed builtin modules.
//!
//! Host implementations here reach external services over HTTP. Each module
//! owns its client (agent, base URL, token); the bridge sees only the
//! uniform host-function contract. Base URLs are overridable so tests can
//! target a local fixture server instead of the real services.

pub mod client;
pub mod github;
pub mod http;
pub mod sheets;
pub mod slack;

use anyhow::Result;
use sandbox_core::TableBuilder;

pub use client::{ConnectorConfig, RestClient};

/// Connection settings for every service connector.
#[derive(Debug, Clone, Default)]
pub struct ConnectorsConfig {
    pub slack: ConnectorConfig,
    pub github: ConnectorConfig,
    pub sheets: ConnectorConfig,
}

impl ConnectorsConfig {
    /// Read all connector settings from the environment
    /// (`SLACK_TOKEN`, `GITHUB_BASE_URL`, ...).
    pub fn from_env() -> Self {
        Self {
            slack: ConnectorConfig::from_env("SLACK"),
            github: ConnectorConfig::from_env("GITHUB"),
            sheets: ConnectorConfig::from_env("SHEETS"),
        }
    }
}

/// Register every service-backed builtin module.
pub fn register_all(builder: &mut TableBuilder, config: &ConnectorsConfig) -> Result<()> {
    builder.register("http", http::build_http_builtins()?)?;
    builder.register("slack", slack::build_slack_builtins(&config.slack)?)?;
    builder.register("github", github::build_github_builtins(&config.github)?)?;
    builder.register("sheets", sheets::build_sheets_builtins(&config.sheets)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_modules_register_cleanly() {
        let mut builder = TableBuilder::new();
        register_all(&mut builder, &ConnectorsConfig::default()).unwrap();
        let table = builder.build();
        assert_eq!(table.modules(), vec!["http", "slack", "github", "sheets"]);
        assert!(table.lookup("slack", "send_text_message").is_some());
        assert!(table.lookup("github", "create_issue").is_some());
        assert!(table.lookup("github", "nonexistent_function").is_none());
    }
}
