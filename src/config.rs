//! Configuration module for the display agent
//!
//! Reads configuration from ~/.config/weather-display/config.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_sensor_url() -> String {
    "http://weatherpi/getsensor.json".to_string()
}

fn default_i2c_bus() -> String {
    "/dev/i2c-1".to_string()
}

fn default_i2c_address() -> u8 {
    0x27
}

fn default_lux_threshold() -> u8 {
    1
}

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Sensor endpoint serving the current reading as JSON
    #[serde(default = "default_sensor_url")]
    pub sensor_url: String,

    #[serde(default)]
    pub lcd: LcdConfig,

    #[serde(default)]
    pub light: LightConfig,
}

/// Where to find the 20x4 character LCD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LcdConfig {
    /// I2C bus device path
    #[serde(default = "default_i2c_bus")]
    pub bus: String,

    /// I2C address of the PCF8574 backpack
    #[serde(default = "default_i2c_address")]
    pub address: u8,
}

/// Optional ambient-light pre-check before rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    /// External executable reporting lux via its exit code; unset disables the check
    #[serde(default)]
    pub command: Option<PathBuf>,

    /// Below this lux value the backlight is switched off and nothing is rendered
    #[serde(default = "default_lux_threshold")]
    pub threshold: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor_url: default_sensor_url(),
            lcd: LcdConfig::default(),
            light: LightConfig::default(),
        }
    }
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self {
            bus: default_i2c_bus(),
            address: default_i2c_address(),
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            command: None,
            threshold: default_lux_threshold(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("weather-display").join("config.toml"))
    }

    /// Load config from an explicit path, or the default location if `None`.
    /// A missing or unreadable file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::path() {
                Some(p) => p,
                None => {
                    tracing::warn!("Could not determine config directory, using defaults");
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::error!("Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read config file: {}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.sensor_url, "http://weatherpi/getsensor.json");
        assert_eq!(config.lcd.bus, "/dev/i2c-1");
        assert_eq!(config.lcd.address, 0x27);
        assert!(config.light.command.is_none());
    }

    #[test]
    fn test_config_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            sensor_url = "http://10.0.0.5/getsensor.json"

            [light]
            command = "/home/pi/pi-display/bin/lux"
            "#,
        )
        .unwrap();

        assert_eq!(config.sensor_url, "http://10.0.0.5/getsensor.json");
        assert_eq!(config.lcd.address, 0x27);
        assert_eq!(
            config.light.command.as_deref(),
            Some(Path::new("/home/pi/pi-display/bin/lux"))
        );
        assert_eq!(config.light.threshold, 1);
    }

    #[test]
    fn test_config_missing_file_falls_back() {
        let config = Config::load(Some(Path::new("/nonexistent/weather-display.toml")));
        assert_eq!(config.sensor_url, Config::default().sensor_url);
    }
}
