use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The SSDP group and port Yeelight devices listen on.
pub const DEFAULT_DISCOVERY_ADDRESS: &str = "239.255.255.250:1982";

/**
Timing and addressing knobs shared by discovery and command execution.

All durations are stored in milliseconds so the struct reads naturally from
YAML or JSON. Missing keys fall back to the defaults.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// How long to wait for a command response, counted from connect.
    pub read_timeout_ms: u64,
    /// How long to wait for the TCP connection to be accepted.
    pub connect_timeout_ms: u64,
    /**
    Pause between connect and write.

    Some bulbs drop requests written immediately after accept. Zero disables
    the pause.
     */
    pub settle_delay_ms: u64,
    /// Longest response line accepted from a device, terminator included.
    pub max_response_bytes: u64,
    /// How long discovery waits for the first reply.
    pub discovery_timeout_ms: u64,
    /// Where the discovery probe is sent.
    pub discovery_address: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            read_timeout_ms: 30_000,
            connect_timeout_ms: 30_000,
            settle_delay_ms: 1_000,
            max_response_bytes: 64 * 1024,
            discovery_timeout_ms: 30_000,
            discovery_address: DEFAULT_DISCOVERY_ADDRESS.to_string(),
        }
    }
}

impl ControlConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }

    /// Overrides the discovery wait, keeping everything else.
    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControlConfig::default();
        assert_eq!(config.read_timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(30));
        assert_eq!(config.discovery_timeout(), Duration::from_secs(30));
        assert_eq!(config.settle_delay(), Duration::from_secs(1));
        assert_eq!(config.discovery_address, "239.255.255.250:1982");
        assert_eq!(config.max_response_bytes, 65_536);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ControlConfig =
            serde_json::from_str(r#"{"settle_delay_ms": 0, "read_timeout_ms": 500}"#).unwrap();
        assert_eq!(config.settle_delay(), Duration::ZERO);
        assert_eq!(config.read_timeout(), Duration::from_millis(500));
        assert_eq!(config.connect_timeout_ms, 30_000);
        assert_eq!(config.discovery_address, DEFAULT_DISCOVERY_ADDRESS);
    }

    #[test]
    fn test_with_discovery_timeout() {
        let config = ControlConfig::default().with_discovery_timeout(Duration::from_millis(1500));
        assert_eq!(config.discovery_timeout_ms, 1500);
        assert_eq!(config.read_timeout_ms, 30_000);
    }

    #[test]
    fn test_huge_discovery_timeout_saturates() {
        let config = ControlConfig::default().with_discovery_timeout(Duration::MAX);
        assert_eq!(config.discovery_timeout_ms, u64::MAX);
    }
}
