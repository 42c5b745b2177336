use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::types::{Channels, Millis};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub port: u16,
    /// Local identity. Detected from the default interface when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Ipv4Addr>,
    pub send_interval_ms: Millis,
    pub device_timeout_ms: Millis,
    /// Period of the diagnostic device listing; 0 turns it off.
    pub list_interval_ms: Millis,
    pub poll_interval_ms: Millis,
    pub max_devices: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_path: Option<PathBuf>,
    /// Raw `[r, g, b, c]` reported when no sensor file is configured.
    pub fixed_channels: [u16; 4],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicator_path: Option<PathBuf>,
    pub indicator_active_low: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 4242,
            address: None,
            send_interval_ms: 1000,
            device_timeout_ms: 5000,
            list_interval_ms: 1000,
            poll_interval_ms: 10,
            max_devices: 64,
            sensor_path: None,
            fixed_channels: [0; 4],
            indicator_path: None,
            indicator_active_low: true,
        }
    }
}

impl Config {
    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("lightswarm.toml"))
            .merge(Json::file("lightswarm.json"))
            .merge(Env::prefixed("LIGHTSWARM_"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config: Config = Self::figment()
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.device_timeout_ms <= self.send_interval_ms {
            anyhow::bail!(
                "device_timeout_ms ({}) must exceed send_interval_ms ({})",
                self.device_timeout_ms,
                self.send_interval_ms
            );
        }
        if self.max_devices == 0 {
            anyhow::bail!("max_devices must be at least 1");
        }
        if self.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be positive");
        }
        Ok(())
    }

    pub fn channels(&self) -> Channels {
        let [r, g, b, c] = self.fixed_channels;
        Channels { r, g, b, c }
    }
}
