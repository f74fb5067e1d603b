//! Configuration management

use crate::application::{CallSettings, LineBridge, SfuInstance};
use config::{ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "config/intercom.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sfu: SfuConfig,
    pub calls: CallsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Media bridge deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SfuConfig {
    pub instances: Vec<SfuInstanceConfig>,
    pub endpoint_idle_timeout_secs: u32,
}

impl Default for SfuConfig {
    fn default() -> Self {
        Self {
            instances: vec![SfuInstanceConfig::default()],
            endpoint_idle_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SfuInstanceConfig {
    pub url: String,
    pub api_key: String,
    pub max_conferences: usize,
}

impl Default for SfuInstanceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/conferences/".to_string(),
            api_key: String::new(),
            max_conferences: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallsConfig {
    pub join_timeout_secs: u64,
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            join_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load from `config/intercom.toml` (if present) overridden by
    /// `INTERCOM__SECTION__KEY` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path));
        }
        builder
            .add_source(
                Environment::with_prefix("INTERCOM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn sfu_instances(&self) -> Vec<SfuInstance> {
        self.sfu
            .instances
            .iter()
            .map(|i| SfuInstance::new(&i.url, &i.api_key, i.max_conferences))
            .collect()
    }

    pub fn call_settings(&self) -> CallSettings {
        CallSettings {
            join_timeout: Duration::from_secs(self.calls.join_timeout_secs),
            endpoint_idle_timeout_secs: self.sfu.endpoint_idle_timeout_secs,
        }
    }

    /// Lines are served by the first configured instance
    pub fn line_bridge(&self) -> Option<LineBridge> {
        self.sfu.instances.first().map(|i| LineBridge {
            url: i.url.clone(),
            api_key: i.api_key.clone(),
            endpoint_idle_timeout_secs: self.sfu.endpoint_idle_timeout_secs,
        })
    }
}
