//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `HANDOFF` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use handoff::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod console;
mod error;
mod logging;
mod routing;

pub use console::ConsoleConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{Environment, LogFormat, LoggingConfig};
pub use routing::RoutingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Log filter, format and environment
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Agent classification and agent-message handling
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Console binary settings
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `HANDOFF` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `HANDOFF__LOGGING__FORMAT=json` -> `logging.format = json`
    /// - `HANDOFF__ROUTING__AGENT_USER_IDS=alice,bob` -> `routing.agent_user_ids = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("HANDOFF")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.routing.validate()?;
        self.console
            .validate(&self.routing.agent_channel_ids_list())?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.logging.environment == Environment::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "HANDOFF__LOGGING__FORMAT",
        "HANDOFF__LOGGING__ENVIRONMENT",
        "HANDOFF__ROUTING__AGENT_USER_IDS",
        "HANDOFF__ROUTING__AGENT_CHANNEL_IDS",
        "HANDOFF__ROUTING__IMPLICIT_CONNECT",
        "HANDOFF__CONSOLE__PROMPT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_from_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.routing.agent_channel_ids_list(), vec!["agents"]);
        assert_eq!(config.console.customer_channel, "webchat");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("HANDOFF__LOGGING__FORMAT", "json");
        env::set_var("HANDOFF__ROUTING__AGENT_USER_IDS", "alice,bob");
        env::set_var("HANDOFF__ROUTING__IMPLICIT_CONNECT", "false");
        env::set_var("HANDOFF__CONSOLE__PROMPT", "$ ");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.routing.agent_user_ids_list(), vec!["alice", "bob"]);
        assert!(!config.routing.implicit_connect);
        assert_eq!(config.console.prompt, "$ ");
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("HANDOFF__LOGGING__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert!(config.logging.use_json());
    }

    #[test]
    fn test_validate_catches_customer_channel_clash() {
        let mut config = AppConfig::default();
        config.console.customer_channel = "agents".to_string();

        assert_eq!(
            config.validate(),
            Err(ValidationError::CustomerChannelIsAgentChannel("agents".to_string()))
        );
    }
}
