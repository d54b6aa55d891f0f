//! Pool address parsing and transport establishment
//!
//! The session only needs a byte stream. [`Connector`] produces one per
//! connection attempt so tests can hand the session in-memory pipes while the
//! binary uses [`TcpConnector`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{lookup_host, TcpStream};
use tracing::{debug, info};

/// Host and port of the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolAddress {
    /// Host name or IP literal, without brackets
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl PoolAddress {
    /// Parse `host:port`, `stratum+tcp://host:port` or `tcp://host:port`
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.contains("://") {
            return Self::parse_url(input);
        }

        let (host, port) = input
            .rsplit_once(':')
            .ok_or_else(|| Error::config(format!("Pool address '{}' has no port", input)))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(Error::config(format!("Pool address '{}' has no host", input)));
        }
        let port = port
            .parse::<u16>()
            .map_err(|e| Error::config(format!("Invalid port in '{}': {}", input, e)))?;

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    fn parse_url(input: &str) -> Result<Self> {
        let url = url::Url::parse(input)
            .map_err(|e| Error::config(format!("Invalid pool URL '{}': {}", input, e)))?;

        match url.scheme() {
            "stratum+tcp" | "tcp" => {}
            other => {
                return Err(Error::config(format!(
                    "Unsupported pool scheme '{}' (expected stratum+tcp)",
                    other
                )))
            }
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::config(format!("Pool URL '{}' has no host", input)))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = url
            .port()
            .ok_or_else(|| Error::config(format!("Pool URL '{}' has no port", input)))?;

        Ok(Self { host, port })
    }
}

impl fmt::Display for PoolAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Opens one transport per connection attempt
#[async_trait]
pub trait Connector: Send + Sync {
    /// Byte stream carrying line-delimited JSON
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// Open a new connection to the pool
    async fn connect(&self) -> Result<Self::Stream>;
}

/// Plain TCP connector
#[derive(Debug, Clone)]
pub struct TcpConnector {
    address: PoolAddress,
}

impl TcpConnector {
    /// Create a connector for the given pool
    pub fn new(address: PoolAddress) -> Self {
        Self { address }
    }

    /// Pool address this connector dials
    pub fn address(&self) -> &PoolAddress {
        &self.address
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self) -> Result<TcpStream> {
        let host = self.address.host.as_str();
        let endpoints: Vec<_> = lookup_host((host, self.address.port))
            .await
            .map_err(|e| Error::network(format!("Failed to resolve {}: {}", self.address, e)))?
            .collect();

        if endpoints.is_empty() {
            return Err(Error::network(format!(
                "{} did not resolve to any address",
                self.address
            )));
        }

        let mut last_error = None;
        for endpoint in endpoints {
            debug!(%endpoint, "Trying endpoint");
            match TcpStream::connect(endpoint).await {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    info!(pool = %self.address, %endpoint, "Connected to pool");
                    return Ok(stream);
                }
                Err(e) => {
                    debug!(%endpoint, error = %e, "Endpoint refused connection");
                    last_error = Some(e);
                }
            }
        }

        Err(Error::network(format!(
            "Could not connect to {}: {}",
            self.address,
            last_error.map_or_else(|| "no endpoints".to_string(), |e| e.to_string())
        )))
    }
}
