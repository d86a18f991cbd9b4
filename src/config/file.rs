//! Configuration file management for wavescope.
//!
//! This module handles loading and saving application configuration from TOML
//! files. Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::waveform::AmplitudeScale;

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio input device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `wavescope list-devices`
    /// - device name from `wavescope list-devices`
    pub device: String,
    /// Requested capture sample rate in Hz (actual may differ based on device)
    pub sample_rate: u32,
}

/// Display configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Amplitude mapping: "fullscale" (true peak) or "softclip"
    /// (quiet-signal boost with hard clipping)
    #[serde(default)]
    pub amplitude_scale: AmplitudeScale,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WavescopeConfig {
    pub audio: AudioConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl WavescopeConfig {
    /// Loads configuration from the user's config directory, writing the
    /// defaults first if no config file exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file cannot be read or written
    /// - If the TOML is malformed
    pub fn load_or_init() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            tracing::info!("Created default config at {}", config_path.display());
            return Ok(config);
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: WavescopeConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

impl Default for WavescopeConfig {
    fn default() -> Self {
        WavescopeConfig {
            audio: AudioConfig {
                device: "default".to_string(),
                sample_rate: 44100,
            },
            display: DisplayConfig::default(),
        }
    }
}

/// Retrieves the path to the config file, creating the directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
        .join(".config")
        .join("wavescope");

    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir.join("wavescope.toml"))
}
