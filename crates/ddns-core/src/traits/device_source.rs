// # Device Source Trait
//
// Defines the interface for observing the local device's identity and
// addresses.
//
// ## Implementations
//
// - Interface enumeration (getifaddrs) + hostname: `ddns-device-ifaddrs` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DeviceSource;
//
// let source = /* DeviceSource implementation */;
// let state = source.observe()?;
// println!("{} -> {} / {}", state.name, state.ipv4, state.ipv6);
// ```

use crate::device::DeviceState;

/// Trait for device source implementations
///
/// `observe()` is called once per poll cycle and must return promptly: it
/// may enumerate interfaces and read the hostname, nothing slower.
///
/// # Errors
///
/// Only a missing device identity is an error. An interface that does not
/// exist or has no addresses is reported as empty address fields.
pub trait DeviceSource: Send + Sync {
    /// Observe the device as it is right now
    fn observe(&self) -> Result<DeviceState, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
