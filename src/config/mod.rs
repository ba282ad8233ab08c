use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::validate_frequency;
use crate::types::note::{midi_note_to_frequency, parse_note_name};
use crate::types::waveform::Waveform;

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToneConfig {
    /// Sample rate for offline rendering; live playback follows the device
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f32,

    #[serde(default = "default_frequency")]
    pub frequency: f32,

    /// Note name such as "a4"; takes precedence over `frequency`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default)]
    pub waveform: Waveform,

    #[serde(default = "default_gain")]
    pub gain: f32,

    /// Frames per ping-pong half buffer
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    #[serde(default)]
    pub devices: DeviceConfig,
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            frequency: default_frequency(),
            note: None,
            waveform: Waveform::default(),
            gain: default_gain(),
            block_size: default_block_size(),
            devices: DeviceConfig::default(),
        }
    }
}

impl ToneConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text without validating it
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document means "all defaults"
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_frequency(self.sample_rate, self.tone_frequency()?)
            .context("Invalid tone frequency")?;

        if !(0.0..=1.0).contains(&self.gain) {
            return Err(anyhow!("Gain must be between 0.0 and 1.0"));
        }

        if !self.block_size.is_power_of_two() || !(16..=8192).contains(&self.block_size) {
            return Err(anyhow!(
                "Block size must be a power of two between 16 and 8192, got {}",
                self.block_size
            ));
        }

        self.devices.validate()
    }

    /// Frequency the tone starts at, resolving `note` if present
    pub fn tone_frequency(&self) -> Result<f32> {
        match &self.note {
            Some(name) => Ok(midi_note_to_frequency(parse_note_name(name)?)),
            None => Ok(self.frequency),
        }
    }
}

/// Device configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Audio output device name substring or index; default device when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audioout: Option<String>,

    /// MIDI input device name substring or index; MIDI control is off when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midiin: Option<String>,

    #[serde(default = "default_midich")]
    pub midich: MidiChannelSpec,
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<()> {
        match &self.midich {
            MidiChannelSpec::Channel(ch) => {
                if *ch < 1 || *ch > 16 {
                    return Err(anyhow!("MIDI channel must be between 1 and 16"));
                }
            }
            MidiChannelSpec::Omni(name) => {
                if name != "omni" && name != "all" {
                    return Err(anyhow!("MIDI channel must be 1-16, \"omni\" or \"all\""));
                }
            }
        }
        Ok(())
    }

    /// Get the MIDI channel filter value (0-15 for specific channel, 255 for omni)
    pub fn midi_channel_filter(&self) -> u8 {
        match &self.midich {
            MidiChannelSpec::Channel(ch) => ch.saturating_sub(1), // Convert 1-16 to 0-15
            MidiChannelSpec::Omni(_) => 255,
        }
    }
}

/// MIDI channel specification - either a specific channel (1-16) or omni
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MidiChannelSpec {
    Channel(u8),
    Omni(String), // "omni" or "all"
}

impl Default for MidiChannelSpec {
    fn default() -> Self {
        default_midich()
    }
}

// Default value functions for serde
fn default_sample_rate() -> f32 {
    48_000.0
}

fn default_frequency() -> f32 {
    440.0
}

fn default_gain() -> f32 {
    0.5
}

fn default_block_size() -> usize {
    256
}

fn default_midich() -> MidiChannelSpec {
    MidiChannelSpec::Omni("omni".to_string())
}
