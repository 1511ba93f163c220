use std::sync::Mutex;
use std::time::Duration;

use clap::ValueEnum;
use derivative::Derivative;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, YeelightError};
use crate::util::config::ControlConfig;

pub mod command;
pub mod transport;

pub use command::{Command, CommandResult, DeviceErrorBody, Param};

/// Exclusive upper bound for request ids.
const MAX_COMMAND_ID: u32 = 100;

/// Transition used by `set_rgb`.
const TRANSITION_EFFECT: &str = "smooth";
const TRANSITION_DURATION: Duration = Duration::from_millis(500);

const POWER_ON: &str = "on";
const POWER_OFF: &str = "off";

/**
A handle to one Yeelight device.

The handle keeps no connection open; every command dials the device anew.
Request ids come from a random source owned by this handle alone, so two
handles never share id sequences.
 */
#[derive(Derivative)]
#[derivative(Debug, PartialEq)]
pub struct ControlInterface {
    address: String,
    config: ControlConfig,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    rng: Mutex<StdRng>,
}

/// Power state as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliPowerState {
    On,
    Off,
}

impl From<CliPowerState> for bool {
    fn from(state: CliPowerState) -> Self {
        state == CliPowerState::On
    }
}

/// A handful of named colors for the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliColors {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
    Cyan,
    White,
}

impl CliColors {
    /// The hex RGB string understood by [`ControlInterface::set_color`].
    pub fn hex_rgb(&self) -> &'static str {
        match self {
            CliColors::Red => "FF0000",
            CliColors::Green => "00FF00",
            CliColors::Blue => "0000FF",
            CliColors::Yellow => "FFFF00",
            CliColors::Orange => "FFA500",
            CliColors::Purple => "800080",
            CliColors::Cyan => "00FFFF",
            CliColors::White => "FFFFFF",
        }
    }
}

impl ControlInterface {
    /// Creates a handle for a known `host:port` with the default configuration.
    pub fn new(address: &str) -> Self {
        ControlInterface::with_config(address, ControlConfig::default())
    }

    pub fn with_config(address: &str, config: ControlConfig) -> Self {
        ControlInterface::with_rng(address, config, StdRng::from_entropy())
    }

    /**
    Creates a handle with a caller-provided random source.

    Useful when request ids need to be reproducible.
     */
    pub fn with_rng(address: &str, config: ControlConfig, rng: StdRng) -> Self {
        ControlInterface {
            address: address.to_string(),
            config,
            rng: Mutex::new(rng),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    fn next_id(&self) -> u32 {
        // A poisoned lock only means another draw panicked; the rng itself is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..MAX_COMMAND_ID)
    }

    /// Builds a command with a fresh request id.
    pub fn new_command(&self, method: &str, params: Vec<Param>) -> Command {
        Command {
            id: self.next_id(),
            method: method.to_string(),
            params,
        }
    }

    /**
    Sends `command` and reads back its result.

    A result carrying an `error` object is turned into
    [`YeelightError::Command`], whatever else it contains.
     */
    pub async fn execute(&self, command: &Command) -> Result<CommandResult> {
        let request = command::encode_command(command)?;
        let line = transport::exchange(&self.address, &request, &self.config).await?;
        let result = command::decode_result(&line, &self.address)?;
        if let Some(error) = result.error {
            return Err(YeelightError::Command {
                address: self.address.clone(),
                code: error.code,
                message: error.message,
            });
        }
        Ok(result)
    }

    /// Builds and executes a command in one step.
    pub async fn execute_command(&self, method: &str, params: Vec<Param>) -> Result<CommandResult> {
        let command = self.new_command(method, params);
        debug!("Executing {} (id {}) on {}", method, command.id, self.address);
        self.execute(&command).await
    }

    /// Retrieves the current values of the named properties, in request order.
    pub async fn get_prop(&self, properties: &[&str]) -> Result<Vec<Param>> {
        let params = properties.iter().map(|&p| Param::from(p)).collect();
        self.execute_command("get_prop", params)
            .await?
            .into_values(&self.address)
    }

    /// Switches the light on or off.
    pub async fn set_power(&self, on: bool) -> Result<()> {
        let status = if on { POWER_ON } else { POWER_OFF };
        self.execute_command("set_power", vec![status.into()])
            .await
            .map(|_| ())
    }

    /**
    Changes the light color.

    # Arguments
    - `hex_rgb`: six or fewer hex digits, optionally prefixed by `#`,
                 e.g. `"FF0000"` for red.

    The string is validated before the device is contacted.
     */
    pub async fn set_color(&self, hex_rgb: &str) -> Result<()> {
        let rgb = parse_hex_rgb(hex_rgb)?;
        let params = vec![
            Param::from(rgb),
            TRANSITION_EFFECT.into(),
            Param::Int(TRANSITION_DURATION.as_millis() as i64),
        ];
        self.execute_command("set_rgb", params).await.map(|_| ())
    }
}

/// Parses a hex RGB string into the 24-bit integer the device expects.
pub fn parse_hex_rgb(hex_rgb: &str) -> Result<u32> {
    let digits = hex_rgb.strip_prefix('#').unwrap_or(hex_rgb);
    let invalid = || YeelightError::Validation(format!("Invalid hexRGB value {}", hex_rgb));

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let rgb = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
    if rgb > 0xFF_FF_FF {
        return Err(invalid());
    }
    Ok(rgb)
}
