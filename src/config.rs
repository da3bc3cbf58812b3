use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config_file::FromConfigFile;
use serde::Deserialize;

use crate::error::{LampError, Result};
use crate::olaoutput::UNIVERSE_SIZE;

/// Upper bound for interpolation table lengths.
pub const MAX_STEPS: usize = 10_000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mqtt: MqttConfig,
    pub output: OutputConfig,
    pub timing: TimingConfig,
    pub transition: TransitionConfig,
    pub button: ButtonConfig,
    /// Where the last commanded color survives restarts.
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub url: String,
    pub device_id: String,
    pub topic_prefix: String,
    pub reconnect_interval_ms: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        MqttConfig {
            url: "tcp://localhost:1883".to_string(),
            device_id: "lichtkern".to_string(),
            topic_prefix: "lichtkern".to_string(),
            reconnect_interval_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub ola_addr: SocketAddr,
    pub universe: u16,
    pub start_channel: usize,
    pub pixel_count: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            ola_addr: SocketAddr::from(([127, 0, 0, 1], 7770)),
            universe: 0,
            start_channel: 0,
            pixel_count: 30,
        }
    }
}

/// Periods of the independent animation timers in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub input_ms: u64,
    pub frame_ms: u64,
    pub brightness_ms: u64,
    pub twinkle_ms: u64,
    pub rainbow_ms: u64,
    pub cycle_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            input_ms: 10,
            frame_ms: 20,
            brightness_ms: 20,
            twinkle_ms: 50,
            rainbow_ms: 30,
            cycle_ms: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub fade_steps: usize,
    pub pulse_steps: usize,
    pub pulse_floor: f32,
    pub pulse_step: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        TransitionConfig {
            fade_steps: 50,
            pulse_steps: 30,
            pulse_floor: 0.5,
            pulse_step: 0.025,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ButtonConfig {
    /// GPIO value file, e.g. `/sys/class/gpio/gpio17/value`.
    pub path: Option<PathBuf>,
    pub active_low: bool,
    pub hold_ms: u64,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        ButtonConfig {
            path: None,
            active_low: true,
            hold_ms: 600,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let config = Config::from_config_file(path)
            .map_err(|err| LampError::Config(format!("{}: {err}", path.display())))?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let output = &self.output;
        if output.pixel_count == 0 {
            return Err(LampError::Config("pixel_count must be at least 1".into()));
        }
        if output.start_channel + output.pixel_count * 3 > UNIVERSE_SIZE {
            return Err(LampError::Config(format!(
                "{} pixels from channel {} exceed the {UNIVERSE_SIZE} channels of a universe",
                output.pixel_count, output.start_channel
            )));
        }

        let transition = &self.transition;
        let step_range = 2..=MAX_STEPS;
        if !step_range.contains(&transition.fade_steps)
            || !step_range.contains(&transition.pulse_steps)
        {
            return Err(LampError::Config(format!(
                "fade_steps and pulse_steps need between 2 and {MAX_STEPS} entries"
            )));
        }
        if !(transition.pulse_floor > 0.0 && transition.pulse_floor < 1.0) {
            return Err(LampError::Config(format!(
                "pulse_floor {} is not between 0 and 1",
                transition.pulse_floor
            )));
        }
        if !(transition.pulse_step > 0.0 && transition.pulse_step <= 1.0 - transition.pulse_floor)
        {
            return Err(LampError::Config(format!(
                "pulse_step {} does not fit between pulse_floor and 1",
                transition.pulse_step
            )));
        }

        let timing = &self.timing;
        let periods = [
            timing.input_ms,
            timing.frame_ms,
            timing.brightness_ms,
            timing.twinkle_ms,
            timing.rainbow_ms,
            timing.cycle_ms,
        ];
        if periods.contains(&0) {
            return Err(LampError::Config("timer periods must not be zero".into()));
        }

        Ok(())
    }
}
