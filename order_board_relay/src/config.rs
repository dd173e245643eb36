use std::env;

use log::*;
use ob_common::env_value_or_default;

const DEFAULT_RELAY_HOST: &str = "0.0.0.0";
const DEFAULT_RELAY_PORT: u16 = 8080;

#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// The interface to listen on. All interfaces by default.
    pub host: String,
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { host: DEFAULT_RELAY_HOST.to_string(), port: DEFAULT_RELAY_PORT }
    }
}

impl RelayConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OB_RELAY_HOST").ok().unwrap_or_else(|| {
            info!("🪛️ OB_RELAY_HOST is not set. Listening on all interfaces ({DEFAULT_RELAY_HOST}).");
            DEFAULT_RELAY_HOST.into()
        });
        let port = env_value_or_default("OB_RELAY_PORT", DEFAULT_RELAY_PORT);
        Self { host, port }
    }
}
