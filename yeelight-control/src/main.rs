use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use yeelight_control_lib::control_interface::{CliColors, CliPowerState, ControlInterface, Param};
use yeelight_control_lib::util::config::ControlConfig;
use yeelight_control_lib::util::discovery::Discovery;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    handle_cli(cli).await
}

/// This struct defines the command line interface of the application
#[derive(Parser)]
#[clap(
    name = "yeelight_control",
    about = "Controls Yeelight smart bulbs",
    version = "0.1.0"
)]
pub struct Cli {
    /// YAML file with timeouts and the discovery address
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Supported output formats for the `discover` command.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Plain text format.
    Plaintext,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

/// Subcommands available for the CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Subcommand for operations that require device communication
    #[clap(name = "device-call")]
    DeviceCall {
        /// Address of the bulb as host:port; discovered when omitted
        #[clap(long)]
        address: Option<String>,

        #[clap(subcommand)]
        action: DeviceAction,
    },
    /// Looks for a bulb on the local network
    #[clap(name = "discover")]
    Discover {
        /// Output format (plaintext, json, yaml)
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Plaintext)]
        output: OutputFormat,

        /// Search timeout in milliseconds
        #[clap(short = 't', long = "timeout", value_parser = parse_duration)]
        timeout: Option<Duration>,
    },
}

fn parse_duration(s: &str) -> Result<Duration, &'static str> {
    let millis = s
        .parse::<u64>()
        .map_err(|_| "could not parse duration in milliseconds")?;
    Ok(Duration::from_millis(millis))
}

/// Actions available under the `device-call` subcommand
#[derive(Subcommand)]
pub enum DeviceAction {
    /// Reads the named properties, e.g. `power bright rgb`.
    #[clap(name = "get-prop")]
    GetProp {
        #[clap(required = true)]
        properties: Vec<String>,
    },
    /// Switches the bulb on or off.
    #[clap(name = "set-power")]
    SetPower {
        #[clap(value_enum)]
        state: CliPowerState,
    },
    /// Sets the color from a hex RGB string such as FF0000.
    #[clap(name = "set-color")]
    SetColor { hex_rgb: String },
    /// Sets the color by name.
    #[clap(name = "set-named-color")]
    SetNamedColor {
        #[clap(value_enum)]
        color: CliColors,
    },
}

/// What `discover` reports about a bulb.
#[derive(Serialize)]
struct DiscoveredDevice<'a> {
    address: &'a str,
}

/// Pairs property names with returned values, keeping whichever side is longer.
fn format_properties(names: &[&str], values: &[Param]) -> Vec<String> {
    (0..names.len().max(values.len()))
        .map(|i| {
            let name = names.get(i).copied().unwrap_or("<unrequested>");
            match values.get(i) {
                Some(value) => format!("{}: {}", name, value),
                None => format!("{}: <missing>", name),
            }
        })
        .collect()
}

fn load_config(path: Option<&Path>) -> Result<ControlConfig> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        }
        None => Ok(ControlConfig::default()),
    }
}

async fn handle_cli(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Discover { output, timeout } => {
            let config = match timeout {
                Some(timeout) => config.with_discovery_timeout(timeout),
                None => config,
            };
            let control = Discovery::find_device(&config).await?;
            let device = DiscoveredDevice {
                address: control.address(),
            };
            match output {
                OutputFormat::Plaintext => {
                    println!("Found device at {}", device.address);
                }
                OutputFormat::Json => {
                    let json = serde_json::to_string(&device)?;
                    println!("{}", json);
                }
                OutputFormat::Yaml => {
                    let yaml = serde_yaml::to_string(&device)?;
                    println!("{}", yaml);
                }
            }
        }
        Commands::DeviceCall { address, action } => {
            let control = match address {
                Some(address) => ControlInterface::with_config(&address, config),
                None => Discovery::find_device(&config).await?,
            };

            match action {
                DeviceAction::GetProp { properties } => {
                    let names: Vec<&str> = properties.iter().map(String::as_str).collect();
                    let values = control.get_prop(&names).await?;
                    if values.len() != names.len() {
                        eprintln!(
                            "Requested {} properties but the device returned {} values",
                            names.len(),
                            values.len()
                        );
                    }
                    for line in format_properties(&names, &values) {
                        println!("{}", line);
                    }
                }
                DeviceAction::SetPower { state } => {
                    control.set_power(state.into()).await?;
                    println!("Power set to {:?}", state);
                }
                DeviceAction::SetColor { hex_rgb } => {
                    control.set_color(&hex_rgb).await?;
                    println!("Color set to {}", hex_rgb);
                }
                DeviceAction::SetNamedColor { color } => {
                    control.set_color(color.hex_rgb()).await?;
                    println!("Color set to {:?}", color);
                }
            }
        }
    }

    Ok(())
}
