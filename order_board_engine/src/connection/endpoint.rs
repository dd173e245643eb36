use std::{fmt::Display, str::FromStr};

use url::Url;

use crate::errors::ConnectionError;

pub const RELAY_SCHEME: &str = "ws";

/// A validated relay address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    url: Url,
}

impl RelayEndpoint {
    /// Parses a `host:port` relay address. `ws://` is assumed when no scheme is given; `ws` and `wss` are accepted.
    pub fn parse(address: &str) -> Result<Self, ConnectionError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ConnectionError::invalid_address(address, "The address is empty"));
        }
        let full = if address.contains("://") { address.to_string() } else { format!("{RELAY_SCHEME}://{address}") };
        let url = Url::parse(&full).map_err(|e| ConnectionError::invalid_address(address, e.to_string()))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConnectionError::invalid_address(
                address,
                format!("'{}' is not a websocket scheme", url.scheme()),
            ));
        }
        match url.host_str() {
            Some(host) if !host.is_empty() => {},
            _ => return Err(ConnectionError::invalid_address(address, "No host was given")),
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(ConnectionError::invalid_address(address, "Credentials are not supported"));
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }
}

impl FromStr for RelayEndpoint {
    type Err = ConnectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for RelayEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}
