use std::fmt::{Display, Formatter};

use bytes::{BufMut, Bytes, BytesMut};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, YeelightError};

/// Request delimiter expected by the device.
pub const CRLF: &[u8] = b"\r\n";

/// A single loosely-typed value inside `params` or `result`.
///
/// Serialized untagged, so `Param::Int(500)` goes on the wire as `500`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Param {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Param::Bool(b) => write!(f, "{}", b),
            Param::Int(i) => write!(f, "{}", i),
            Param::Float(x) => write!(f, "{}", x),
            Param::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Param {
    fn from(value: bool) -> Self {
        Param::Bool(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<i32> for Param {
    fn from(value: i32) -> Self {
        Param::Int(value.into())
    }
}

impl From<u32> for Param {
    fn from(value: u32) -> Self {
        Param::Int(value.into())
    }
}

impl From<f64> for Param {
    fn from(value: f64) -> Self {
        Param::Float(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Str(value)
    }
}

/// A request sent to the device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Command {
    pub id: u32,
    pub method: String,
    pub params: Vec<Param>,
}

/// The error object a device returns when it rejects a command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceErrorBody {
    pub code: i64,
    pub message: String,
}

/// A response read back from the device.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandResult {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub result: Option<Vec<Param>>,
    #[serde(default)]
    pub error: Option<DeviceErrorBody>,
}

impl CommandResult {
    /**
    Converts the response into the device-supplied values.

    An `error` object wins over `result`, even when both are present.
     */
    pub fn into_values(self, address: &str) -> Result<Vec<Param>> {
        if let Some(error) = self.error {
            return Err(YeelightError::Command {
                address: address.to_string(),
                code: error.code,
                message: error.message,
            });
        }
        Ok(self.result.unwrap_or_default())
    }
}

/// Serializes a command as compact JSON terminated by CR-LF.
pub fn encode_command(command: &Command) -> Result<Bytes> {
    let json = serde_json::to_vec(command).map_err(YeelightError::Encode)?;
    let mut buffer = BytesMut::with_capacity(json.len() + CRLF.len());
    buffer.put_slice(&json);
    buffer.put_slice(CRLF);
    Ok(buffer.freeze())
}

/// Parses one raw response line. The trailing line terminator is optional.
pub fn decode_result(line: &[u8], address: &str) -> Result<CommandResult> {
    debug!(
        "Response from {}: {}",
        address,
        String::from_utf8_lossy(line).trim_end()
    );
    serde_json::from_slice(line).map_err(|source| YeelightError::Decode {
        address: address.to_string(),
        source,
    })
}
