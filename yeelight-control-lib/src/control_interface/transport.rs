use std::io;

use log::debug;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, timeout_at, Instant};

use crate::error::{Result, YeelightError};
use crate::util::config::ControlConfig;

/**
Performs one request/response round trip with the device at `address`.

A fresh connection is opened for every call and dropped afterwards. The
read deadline starts as soon as the connection is accepted, so the settle
delay counts against it. Only the first LF-terminated line is read back,
as raw bytes, and it may not exceed `config.max_response_bytes`.
 */
pub async fn exchange(address: &str, request: &[u8], config: &ControlConfig) -> Result<Vec<u8>> {
    let connection_error = |source: io::Error| YeelightError::Connection {
        address: address.to_string(),
        source,
    };

    let stream = timeout(config.connect_timeout(), TcpStream::connect(address))
        .await
        .map_err(|_| {
            connection_error(io::Error::new(
                io::ErrorKind::TimedOut,
                "connection attempt timed out",
            ))
        })?
        .map_err(connection_error)?;
    let deadline = Instant::now() + config.read_timeout();

    if !config.settle_delay().is_zero() {
        sleep(config.settle_delay()).await;
    }

    debug!(
        "Request to {}: {}",
        address,
        String::from_utf8_lossy(request).trim_end()
    );
    let mut reader = BufReader::new(stream);
    reader
        .get_mut()
        .write_all(request)
        .await
        .map_err(connection_error)?;

    let limit = config.max_response_bytes;
    let mut line = Vec::new();
    let read = timeout_at(
        deadline,
        (&mut reader).take(limit).read_until(b'\n', &mut line),
    )
    .await
    .map_err(|_| YeelightError::Timeout {
        address: address.to_string(),
        timeout: config.read_timeout(),
    })?
    .map_err(connection_error)?;

    if line.last() != Some(&b'\n') {
        let source = if read as u64 >= limit {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("response line exceeds {} bytes", limit),
            )
        } else {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before a complete response line",
            )
        };
        return Err(connection_error(source));
    }
    Ok(line)
}
