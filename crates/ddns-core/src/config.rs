//! Configuration types for the DDNS updater
//!
//! The daemon resolves flags and environment variables once at startup into a
//! [`DdnsConfig`], which is then handed to the engine by value.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default interface name prefix
pub const DEFAULT_INTERFACE_PREFIX: &str = "wlan";

/// Main DDNS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Prefix matched against interface names; the first match is used
    #[serde(default = "default_interface_prefix")]
    pub interface_prefix: String,

    /// Hosted zone to upsert records into
    pub hosted_zone_id: String,

    /// Optional label inserted between the device name and the zone domain
    #[serde(default)]
    pub subdomain: String,

    /// Device name override; the system hostname is used when unset
    #[serde(default)]
    pub device_name: Option<String>,

    /// Skip fe80::/10 addresses when choosing the IPv6 address
    #[serde(default)]
    pub exclude_link_local: bool,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration for a hosted zone with defaults everywhere else
    pub fn new(hosted_zone_id: impl Into<String>) -> Self {
        Self {
            interface_prefix: default_interface_prefix(),
            hosted_zone_id: hosted_zone_id.into(),
            subdomain: String::new(),
            device_name: None,
            exclude_link_local: false,
            engine: EngineConfig::default(),
        }
    }

    /// Set the interface prefix
    pub fn with_interface_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.interface_prefix = prefix.into();
        self
    }

    /// Set the subdomain label
    pub fn with_subdomain(mut self, subdomain: impl Into<String>) -> Self {
        self.subdomain = subdomain.into();
        self
    }

    /// Set the device name override
    pub fn with_device_name(mut self, device_name: Option<String>) -> Self {
        self.device_name = device_name.filter(|name| !name.is_empty());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.hosted_zone_id.trim().is_empty() {
            return Err(crate::Error::config("Hosted zone ID is required"));
        }

        if self.subdomain.starts_with('.') || self.subdomain.ends_with('.') {
            return Err(crate::Error::config(format!(
                "Subdomain must not start or end with a dot: '{}'",
                self.subdomain
            )));
        }

        self.engine.validate()
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Delay between the end of one poll cycle and the start of the next (in seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("Poll interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_interface_prefix() -> String {
    DEFAULT_INTERFACE_PREFIX.to_string()
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    100
}
