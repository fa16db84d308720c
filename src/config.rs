use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_PORT: u16 = 8889;
pub const DEFAULT_LOCK_TIMEOUT: u64 = 30;
pub const DEFAULT_INDOOR_SENSOR: &str = "sensor.luxtronik_room_temperature";

/// Settings captured when the controller was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryData {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub safe: bool,
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout: u64,
    #[serde(default = "default_true")]
    pub update_immediately_after_write: bool,
    #[serde(default)]
    pub control_mode_home_assistant: bool,
    #[serde(default = "default_indoor_sensor")]
    pub ha_sensor_indoor_temperature: String,
}

impl EntryData {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port: port.unwrap_or(DEFAULT_PORT),
            safe: false,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            update_immediately_after_write: true,
            control_mode_home_assistant: false,
            ha_sensor_indoor_temperature: default_indoor_sensor(),
        }
    }
}

/// User-adjustable options; anything set here wins over [`EntryData`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_mode_home_assistant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ha_sensor_indoor_temperature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryConfig {
    #[serde(default)]
    pub title: String,
    pub data: EntryData,
    #[serde(default)]
    pub options: EntryOptions,
}

/// Resolved view of an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub control_mode_home_assistant: bool,
    /// Empty means no indoor sensor.
    pub ha_sensor_indoor_temperature: String,
    pub update_immediately_after_write: bool,
}

impl EntryConfig {
    pub fn new(data: EntryData) -> Self {
        Self {
            title: String::new(),
            data,
            options: EntryOptions::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn effective(&self) -> Settings {
        Settings {
            host: self.data.host.clone(),
            port: self.data.port,
            control_mode_home_assistant: self
                .options
                .control_mode_home_assistant
                .unwrap_or(self.data.control_mode_home_assistant),
            ha_sensor_indoor_temperature: self
                .options
                .ha_sensor_indoor_temperature
                .clone()
                .unwrap_or_else(|| self.data.ha_sensor_indoor_temperature.clone()),
            update_immediately_after_write: self.data.update_immediately_after_write,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_lock_timeout() -> u64 {
    DEFAULT_LOCK_TIMEOUT
}

fn default_true() -> bool {
    true
}

fn default_indoor_sensor() -> String {
    DEFAULT_INDOOR_SENSOR.to_string()
}
