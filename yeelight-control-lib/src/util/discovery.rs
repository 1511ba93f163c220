use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::control_interface::ControlInterface;
use crate::error::{Result, YeelightError};
use crate::util::config::ControlConfig;

/// SSDP search request understood by Yeelight bulbs.
pub const DISCOVERY_MESSAGE: &str = concat!(
    "M-SEARCH * HTTP/1.1\r\n",
    "HOST:239.255.255.250:1982\r\n",
    "MAN:\"ssdp:discover\"\r\n",
    "ST:wifi_bulb\r\n",
);

lazy_static! {
    static ref LOCATION: Regex =
        Regex::new(r"Location: yeelight://(([A-Za-z0-9.\-]+):([0-9]+))").unwrap();
}

/**
Extracts the `host:port` a device advertises in its discovery reply.

The reply must contain exactly one `Location: yeelight://host:port` entry,
and the port must fit in 16 bits. Anything else in the reply is ignored.
 */
pub fn parse_location(reply: &str) -> Result<String> {
    let mut locations = LOCATION.captures_iter(reply);
    match (locations.next(), locations.next()) {
        (Some(captures), None) if captures[3].parse::<u16>().is_ok() => {
            Ok(captures[1].to_string())
        }
        _ => Err(YeelightError::Parse),
    }
}

pub struct Discovery;

impl Discovery {
    /**
    Finds a device on the local network.

    Sends a single probe and takes the first reply that arrives. With more
    than one bulb on the network, whichever answers first wins.
     */
    pub async fn find_device(config: &ControlConfig) -> Result<ControlInterface> {
        let no_devices = |reason: String| YeelightError::NoDevicesFound { reason };

        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| no_devices(format!("cannot bind discovery socket: {}", e)))?;
        socket
            .send_to(DISCOVERY_MESSAGE.as_bytes(), config.discovery_address.as_str())
            .await
            .map_err(|e| no_devices(format!("cannot send discovery probe: {}", e)))?;
        debug!("Discovery probe sent to {}", config.discovery_address);

        let mut buffer = [0; 2048];
        let (number_of_bytes, src_addr) =
            match timeout(config.discovery_timeout(), socket.recv_from(&mut buffer)).await {
                Ok(Ok(received)) => received,
                Ok(Err(e)) => return Err(no_devices(format!("failed to receive response: {}", e))),
                Err(_) => {
                    return Err(no_devices(format!(
                        "no reply within {:?}",
                        config.discovery_timeout()
                    )))
                }
            };

        let reply = String::from_utf8_lossy(&buffer[..number_of_bytes]);
        debug!("Discovery reply from {}: {}", src_addr, reply);
        let address = parse_location(&reply)?;
        info!("Device with address {} found", address);

        Ok(ControlInterface::with_config(&address, config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SAMPLE_REPLY: &str = "HTTP/1.1 200 OK\r\n\
        Cache-Control: max-age=3600\r\n\
        Date: \r\n\
        Ext: \r\n\
        Location: yeelight://192.168.5.243:55443\r\n\
        Server: POSIX UPnP/1.0 YGLC/1\r\n\
        id: 0x000000001b31eeee\r\n\
        model: colorb\r\n\
        fw_ver: 10\r\n\
        support: get_prop set_default set_power toggle set_bright set_rgb set_hsv\r\n\
        power: on\r\n\
        bright: 100\r\n\
        rgb: 16711680\r\n\
        name: \r\n";

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location(SAMPLE_REPLY).unwrap(), "192.168.5.243:55443");
    }

    #[test]
    fn test_parse_location_with_escaped_line_breaks() {
        let reply = r"HTTP/1.1 200 OK\r\nLocation: yeelight://10.0.0.7:55443\r\nmodel: mono\r\n";
        assert_eq!(parse_location(reply).unwrap(), "10.0.0.7:55443");
    }

    #[test]
    fn test_parse_location_missing() {
        let reply = "HTTP/1.1 200 OK\r\nServer: POSIX UPnP/1.0 YGLC/1\r\n";
        assert!(matches!(parse_location(reply), Err(YeelightError::Parse)));
        assert!(matches!(parse_location(""), Err(YeelightError::Parse)));
    }

    #[test]
    fn test_parse_location_wrong_scheme() {
        let reply = "Location: http://192.168.5.243:55443\r\n";
        assert!(matches!(parse_location(reply), Err(YeelightError::Parse)));
    }

    #[test]
    fn test_parse_location_overlong_port() {
        let reply = "Location: yeelight://192.168.5.243:554439\r\n";
        assert!(matches!(parse_location(reply), Err(YeelightError::Parse)));
        let reply = "Location: yeelight://192.168.5.243:65536\r\n";
        assert!(matches!(parse_location(reply), Err(YeelightError::Parse)));
        let reply = "Location: yeelight://192.168.5.243:65535\r\n";
        assert_eq!(parse_location(reply).unwrap(), "192.168.5.243:65535");
    }

    #[test]
    fn test_parse_location_ambiguous() {
        let reply = "Location: yeelight://192.168.5.243:55443\r\n\
                     Location: yeelight://192.168.5.244:55443\r\n";
        assert!(matches!(parse_location(reply), Err(YeelightError::Parse)));
    }

    #[test]
    fn test_discovery_message_lines() {
        let lines: Vec<&str> = DISCOVERY_MESSAGE.split_terminator("\r\n").collect();
        assert_eq!(
            lines,
            vec![
                "M-SEARCH * HTTP/1.1",
                "HOST:239.255.255.250:1982",
                "MAN:\"ssdp:discover\"",
                "ST:wifi_bulb",
            ]
        );
        assert!(DISCOVERY_MESSAGE.ends_with("\r\n"));
    }

    async fn fake_bulb(reply: &'static str) -> ControlConfig {
        let bulb = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let discovery_address = bulb.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let mut buffer = [0; 512];
            let (n, from) = bulb.recv_from(&mut buffer).await.unwrap();
            assert_eq!(&buffer[..n], DISCOVERY_MESSAGE.as_bytes());
            bulb.send_to(reply.as_bytes(), from).await.unwrap();
        });
        ControlConfig {
            discovery_address,
            discovery_timeout_ms: 2_000,
            ..ControlConfig::default()
        }
    }

    #[tokio::test]
    async fn test_find_device() {
        let config = fake_bulb(SAMPLE_REPLY).await;
        let control = Discovery::find_device(&config).await.unwrap();
        assert_eq!(control.address(), "192.168.5.243:55443");
        assert_eq!(control.config(), &config);
    }

    #[tokio::test]
    async fn test_find_device_unparsable_reply() {
        let config = fake_bulb("HTTP/1.1 200 OK\r\n\r\n").await;
        let err = Discovery::find_device(&config).await.unwrap_err();
        assert!(matches!(err, YeelightError::Parse));
    }

    #[tokio::test]
    async fn test_find_device_times_out() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = ControlConfig {
            discovery_address: silent.local_addr().unwrap().to_string(),
            ..ControlConfig::default()
        }
        .with_discovery_timeout(Duration::from_millis(200));

        let err = Discovery::find_device(&config).await.unwrap_err();
        assert!(matches!(err, YeelightError::NoDevicesFound { .. }));
        assert!(err.to_string().starts_with("no devices found"));
    }
}
