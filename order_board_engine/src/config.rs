use std::{env, time::Duration};

use log::*;
use ob_common::{env_value_or_default, parse_boolean_flag};

use crate::view::{ProjectionSettings, DEFAULT_LONG_WAIT_THRESHOLD, DEFAULT_PAGE_SIZE};

pub const DEFAULT_RELAY_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_FADE_DELAY: Duration = Duration::from_millis(400);
pub const DEFAULT_WAIT_TICK: Duration = Duration::from_secs(60);

/// What happens when an update arrives for an order that has been hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HiddenUpdatePolicy {
    /// The update is merged and the order stays hidden
    #[default]
    StayHidden,
    /// The update is merged and the order is removed from the hidden stack, so that it shows up again
    Reveal,
}

#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// `host:port` of the relay. The `ws://` scheme is added when connecting.
    pub relay_address: String,
    pub page_size: usize,
    /// Orders waiting strictly longer than this many minutes are flagged
    pub long_wait_threshold: i64,
    /// How long an order fades before it is committed to the hidden stack
    pub fade_delay: Duration,
    /// How often wait times are recomputed
    pub wait_tick: Duration,
    pub hidden_update_policy: HiddenUpdatePolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            relay_address: DEFAULT_RELAY_ADDRESS.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            long_wait_threshold: DEFAULT_LONG_WAIT_THRESHOLD,
            fade_delay: DEFAULT_FADE_DELAY,
            wait_tick: DEFAULT_WAIT_TICK,
            hidden_update_policy: HiddenUpdatePolicy::default(),
        }
    }
}

impl BoardConfig {
    pub fn from_env_or_default() -> Self {
        let relay_address = env::var("OB_RELAY_ADDRESS").ok().unwrap_or_else(|| {
            info!("🪛️ OB_RELAY_ADDRESS is not set. Using the default, {DEFAULT_RELAY_ADDRESS}.");
            DEFAULT_RELAY_ADDRESS.into()
        });
        let mut page_size = env_value_or_default("OB_PAGE_SIZE", DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            warn!("🪛️ OB_PAGE_SIZE must be at least 1. Using the default, {DEFAULT_PAGE_SIZE}, instead.");
            page_size = DEFAULT_PAGE_SIZE;
        }
        let long_wait_threshold = env_value_or_default("OB_LONG_WAIT_MINUTES", DEFAULT_LONG_WAIT_THRESHOLD);
        let fade_delay =
            Duration::from_millis(env_value_or_default("OB_FADE_DELAY_MS", DEFAULT_FADE_DELAY.as_millis() as u64));
        let mut wait_tick_secs = env_value_or_default("OB_WAIT_TICK_SECS", DEFAULT_WAIT_TICK.as_secs());
        if wait_tick_secs == 0 {
            warn!("🪛️ OB_WAIT_TICK_SECS must be at least 1. Using the default, 60, instead.");
            wait_tick_secs = DEFAULT_WAIT_TICK.as_secs();
        }
        let hidden_update_policy = if parse_boolean_flag(env::var("OB_REVEAL_UPDATED_HIDDEN").ok(), false) {
            HiddenUpdatePolicy::Reveal
        } else {
            HiddenUpdatePolicy::StayHidden
        };
        Self {
            relay_address,
            page_size,
            long_wait_threshold,
            fade_delay,
            wait_tick: Duration::from_secs(wait_tick_secs),
            hidden_update_policy,
        }
    }

    pub fn projection_settings(&self) -> ProjectionSettings {
        ProjectionSettings { page_size: self.page_size.max(1), long_wait_threshold: self.long_wait_threshold }
    }
}
