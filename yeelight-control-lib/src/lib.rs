//! # Yeelight Control Library
//!
//! `yeelight-control-lib` is a Rust library for controlling Yeelight smart bulbs on a
//! local network. It finds a bulb with an SSDP-style multicast probe and then talks to
//! it with the line-delimited JSON command protocol over TCP.
//!
//! This library is designed to be used by command-line tools or other client applications
//! that need to switch or recolor a bulb.
//!
//! ## Features
//!
//! - Device discovery on local networks
//! - Generic command execution with typed errors and configurable deadlines
//! - Power and RGB color control, property queries
//!
//! ## Example
//!
//! Here is a simple example of how to find a bulb and turn it red:
//!
//! ```no_run
//! use yeelight_control_lib::util::config::ControlConfig;
//! use yeelight_control_lib::util::discovery::Discovery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let control = Discovery::find_device(&ControlConfig::default()).await?;
//!
//!     control.set_power(true).await?;
//!     control.set_color("FF0000").await?;
//!     println!("Power: {:?}", control.get_prop(&["power"]).await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Disclaimer
//!
//! This project is not affiliated with, authorized by, endorsed by, or in any way officially connected
//! with Yeelight or its affiliates.
//!
//! ## License
//!
//! This project is dual-licensed under the MIT License and the Apache License, Version 2.0.
//! You may choose to use either license, depending on your project needs.

// The `control_interface` module provides the handle for one bulb. Each command
// opens its own connection, writes one JSON request and reads one JSON line back.
//
// Example usage:
//
// ```
// use yeelight_control_lib::control_interface::ControlInterface;
//
// #[tokio::main]
// async fn main() {
//     let control = ControlInterface::new("192.168.1.100:55443");
//     control.set_power(true).await.unwrap();
// }
// ```
pub mod control_interface;

// Error taxonomy shared by discovery and command execution.
pub mod error;

// The `util` module holds device discovery and the timing configuration used by
// both discovery and the command exchange.
//
// Example usage:
//
// ```
// use yeelight_control_lib::util::config::ControlConfig;
// use yeelight_control_lib::util::discovery::Discovery;
//
// #[tokio::main]
// async fn main() {
//     let control = Discovery::find_device(&ControlConfig::default()).await.unwrap();
//     println!("Found device at {}", control.address());
// }
// ```
pub mod util;

pub use error::{Result, YeelightError};
