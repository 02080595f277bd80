//! Core traits for the DDNS updater
//!
//! - [`DeviceSource`]: Observe the device name and addresses
//! - [`DnsProvider`]: Publish records through a hosted-zone API

pub mod device_source;
pub mod dns_provider;

pub use device_source::DeviceSource;
pub use dns_provider::DnsProvider;
