use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use log::trace;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::protocol::{decode_response, encode_command};
use crate::{Command, Error, Response, Result};

pub const DEFAULT_PORT: u16 = 9999;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RESPONSE_SIZE: u64 = 64 * 1024;

/// Talks to plugs over a fresh TCP connection per command.
#[derive(Clone, Copy, Debug)]
pub struct Client {
    port: u16,
    timeout: Duration,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_TIMEOUT)
    }
}

impl Client {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn get_power(&self, ip: IpAddr) -> Option<Response> {
        self.send_command(&Command::get_power(), ip).await
    }

    /// Refused and reset connections, timeouts, empty replies and replies
    /// that can't be decrypted all end up as `None`.
    pub async fn send_command(&self, command: &Command, ip: IpAddr) -> Option<Response> {
        match self.try_send_command(command, ip).await {
            Ok(response) => Some(response),
            Err(err) => {
                trace!("{ip}:{} command failed: {err}", self.port);
                None
            }
        }
    }

    pub async fn try_send_command(&self, command: &Command, ip: IpAddr) -> Result<Response> {
        let addr = SocketAddr::new(ip, self.port);
        trace!("{addr} send command {command:?}");

        let request = encode_command(command)?;
        let data = timeout(self.timeout, exchange(addr, &request)).await??;

        if data.is_empty() {
            return Err(Error::EmptyResponse);
        }

        trace!("{addr} received response of size {}", data.len());

        decode_response(&data)
    }
}

async fn exchange(addr: SocketAddr, request: &[u8]) -> Result<Vec<u8>> {
    let mut stream = TcpStream::connect(addr).await?;

    stream.write_all(request).await?;
    stream.shutdown().await?;

    let mut data = vec![];
    stream.take(MAX_RESPONSE_SIZE).read_to_end(&mut data).await?;

    Ok(data)
}
