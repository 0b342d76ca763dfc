//! Configuration management

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Site base URL, used to build avatar links on announcement messages
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Key of the provider new calls go through; None disables calling
    pub active: Option<String>,
    pub providers: Vec<ProviderSettings>,
}

/// One configured conferencing provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub key: String,
    pub label: String,
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            active: Some("jitsi".to_string()),
            providers: vec![ProviderSettings {
                key: "jitsi".to_string(),
                label: "Jitsi".to_string(),
                base_url: "https://meet.jit.si".to_string(),
            }],
        }
    }
}

impl Config {
    /// Load from an optional `confab.toml` with `CONFAB_*` overrides from
    /// the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("confab").required(false))
            .add_source(config::Environment::with_prefix("CONFAB").separator("__"))
            .build()?
            .try_deserialize()
    }
}
