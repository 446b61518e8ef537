//! # Configuration Management
//!
//! This module handles loading and managing application configuration from multiple sources:
//! - TOML configuration files (config.toml)
//! - Environment variables (with APP_ prefix)
//! - Default values (built into the code)
//!
//! The same `AppConfig` is shared by the backend binary (server + ledger sections)
//! and the terminal voice client (client section).
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Plain deployment variables (`HOST`, `PORT`, `API_BASE_URL`)
//! 2. Environment variables (`APP_SERVER__PORT`, `APP_CLIENT__API_BASE_URL`, etc.)
//! 3. Configuration file (config.toml)
//! 4. Default values (defined in the Default impl)

use anyhow::Result;              // Better error handling with context
use serde::{Deserialize, Serialize};  // For converting to/from TOML, JSON, etc.
use std::env;                    // For reading environment variables
use std::time::Duration;

/// Main application configuration that contains all settings.
///
/// Breaking configuration into logical groups (server, client, ledger)
/// keeps each binary reading only the section it cares about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub ledger: LedgerConfig,
}

/// Server-specific configuration settings.
///
/// ## Fields:
/// - `host`: IP address or hostname to bind the server to (e.g., "127.0.0.1", "0.0.0.0")
/// - `port`: TCP port number to listen on (defaults to 4000)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Settings used by the voice client when talking to the backend.
///
/// ## Fields:
/// - `api_base_url`: Where the backend lives (e.g., "http://localhost:4000")
/// - `restart_delay_ms`: Pause before capture restarts after a no-speech timeout
/// - `request_timeout_secs`: Upper bound for one backend round trip
/// - `speech_playback`: Whether replies are spoken as well as printed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub restart_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub speech_playback: bool,
}

/// Starting balances for the two fixed accounts.
///
/// These are read once at startup and turned into an immutable
/// [`AccountLedger`](crate::ledger::AccountLedger).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub checking: f64,
    pub savings: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),  // Localhost only (safe for development)
                port: 4000,
            },
            client: ClientConfig {
                api_base_url: "http://localhost:4000".to_string(),
                restart_delay_ms: 250,
                request_timeout_secs: 10,
                speech_playback: true,
            },
            ledger: LedgerConfig {
                checking: 2540.34,
                savings: 10420.76,
            },
        }
    }
}

impl ClientConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    /// Load configuration from multiple sources in priority order.
    ///
    /// ## Configuration Loading Process:
    /// 1. Start with built-in defaults
    /// 2. Override with values from config.toml (if it exists)
    /// 3. Override with environment variables prefixed with APP_
    /// 4. Handle special cases for HOST, PORT and API_BASE_URL
    ///
    /// Nested keys use a double underscore because several field names
    /// already contain single underscores:
    /// - `APP_SERVER__PORT=3000`: Override server port
    /// - `APP_CLIENT__RESTART_DELAY_MS=500`: Override the auto-restart delay
    /// - `PORT=3000`: Special case for deployment platforms
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        if let Ok(base_url) = env::var("API_BASE_URL") {
            settings = settings.set_override("client.api_base_url", base_url)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    ///
    /// ## What this checks:
    /// - Server port is not 0
    /// - The client has somewhere to send queries and a non-zero timeout
    /// - Ledger balances are real, non-negative amounts
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.client.api_base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("Client API base URL cannot be empty"));
        }

        if self.client.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Client request timeout must be greater than 0"));
        }

        for (name, balance) in [("checking", self.ledger.checking), ("savings", self.ledger.savings)] {
            if !balance.is_finite() || balance < 0.0 {
                return Err(anyhow::anyhow!(
                    "Ledger balance for {} must be a non-negative amount, got {}",
                    name,
                    balance
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that the default configuration is valid and has expected values.
    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.client.api_base_url, "http://localhost:4000");
        assert_eq!(config.client.restart_delay(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.client.api_base_url = "   ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.client.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ledger_validation() {
        let mut config = AppConfig::default();
        config.ledger.savings = -1.0;
        assert!(config.validate().is_err());

        config.ledger.savings = f64::NAN;
        assert!(config.validate().is_err());

        config.ledger.savings = 0.0;
        assert!(config.validate().is_ok());
    }

    /// Defaults survive a round trip through the config crate's value tree.
    #[test]
    fn test_defaults_through_config_builder() {
        let built = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default()).unwrap())
            .build()
            .unwrap();
        let config: AppConfig = built.try_deserialize().unwrap();
        assert_eq!(config.server.port, 4000);
        assert!((config.ledger.checking - 2540.34).abs() < f64::EPSILON);
        assert!(config.client.speech_playback);
    }
}
