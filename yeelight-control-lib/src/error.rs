//! Error types for device discovery and command execution.

use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong while finding or talking to a device.
#[derive(Debug, Error)]
pub enum YeelightError {
    /// No discovery reply arrived, or the discovery socket failed.
    #[error("no devices found: {reason}")]
    NoDevicesFound { reason: String },

    /// The discovery reply did not carry exactly one device location.
    #[error("unable to parse device location")]
    Parse,

    /// The device could not be reached, or the connection broke mid-exchange.
    #[error("cannot talk to device at {address}: {source}")]
    Connection {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no response from {address} within {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    /// The response line was not a valid command result.
    #[error("cannot parse command result from {address}: {source}")]
    Decode {
        address: String,
        #[source]
        source: serde_json::Error,
    },

    /// The device answered with an application-level error object.
    #[error("command execution error on {address}. Code: {code}, Message: {message}")]
    Command {
        address: String,
        code: i64,
        message: String,
    },

    /// A caller supplied argument was rejected before any I/O happened.
    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("cannot encode command: {0}")]
    Encode(#[source] serde_json::Error),
}

impl YeelightError {
    /// The device address the error relates to, if any.
    pub fn address(&self) -> Option<&str> {
        match self {
            YeelightError::Connection { address, .. }
            | YeelightError::Timeout { address, .. }
            | YeelightError::Decode { address, .. }
            | YeelightError::Command { address, .. } => Some(address),
            _ => None,
        }
    }
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, YeelightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        let err = YeelightError::Command {
            address: "192.168.1.2:55443".to_string(),
            code: -1,
            message: "bad params".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command execution error on 192.168.1.2:55443. Code: -1, Message: bad params"
        );
    }

    #[test]
    fn test_parse_error_display() {
        assert_eq!(
            YeelightError::Parse.to_string(),
            "unable to parse device location"
        );
    }

    #[test]
    fn test_address_context() {
        let err = YeelightError::Timeout {
            address: "10.0.0.5:55443".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.address(), Some("10.0.0.5:55443"));
        assert_eq!(YeelightError::Validation("zzz".into()).address(), None);
    }
}
