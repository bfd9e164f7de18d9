//! Optional ambient-light pre-check
//!
//! The legacy station pairs the LCD with a TSL2561 helper binary that
//! reports illuminance through its process exit code. When the room is
//! dark the agent switches the backlight off instead of rendering.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// A source of illuminance readings
pub trait LightSensor {
    fn read_lux(&self) -> Result<u8>;
}

/// Spawns the configured external lux reader and interprets its exit
/// code as the lux value, per the helper binary's contract.
pub struct LuxCommand {
    command: PathBuf,
}

impl LuxCommand {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl LightSensor for LuxCommand {
    fn read_lux(&self) -> Result<u8> {
        let status = Command::new(&self.command)
            .status()
            .with_context(|| format!("failed to run lux reader {:?}", self.command))?;

        let code = status
            .code()
            .with_context(|| format!("lux reader {:?} terminated by signal", self.command))?;

        // exit codes are 0..=255 on Linux
        Ok(code.clamp(0, u8::MAX as i32) as u8)
    }
}
