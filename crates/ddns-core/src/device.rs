//! Device identity and address selection
//!
//! A [`DeviceState`] is observed fresh on every poll cycle. The selection
//! helpers here are platform independent; they operate on an already
//! enumerated list of `(interface, address)` pairs so that the OS-facing
//! source stays a thin adapter.

use crate::error::{Error, Result};
use serde::Serialize;
use std::net::{IpAddr, Ipv6Addr};

/// Observed device identity and addresses
///
/// Empty strings mean "not found". The name is always lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceState {
    /// Lower-cased device name
    pub name: String,
    /// First IPv4 address of the selected interface
    pub ipv4: String,
    /// First IPv6 address of the selected interface
    pub ipv6: String,
}

impl DeviceState {
    /// Create a device state, normalizing the name to lower case
    pub fn new(name: impl AsRef<str>, ipv4: impl Into<String>, ipv6: impl Into<String>) -> Self {
        Self {
            name: name.as_ref().to_lowercase(),
            ipv4: ipv4.into(),
            ipv6: ipv6.into(),
        }
    }

    /// True for the state the change detector starts from
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    /// Whether an IPv6 address was found
    pub fn has_ipv6(&self) -> bool {
        !self.ipv6.is_empty()
    }
}

/// One address of one interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddr {
    /// Interface name (e.g., "wlan0")
    pub name: String,
    /// Address assigned to the interface
    pub ip: IpAddr,
}

impl InterfaceAddr {
    pub fn new(name: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            name: name.into(),
            ip,
        }
    }
}

/// Knobs for choosing addresses on the selected interface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressOptions {
    /// Skip fe80::/10 when choosing the IPv6 address
    pub exclude_link_local: bool,
}

/// Result of scanning the enumerated interfaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedAddresses {
    /// Name of the interface that matched the prefix, if any
    pub interface: Option<String>,
    /// First IPv4 address, or empty
    pub ipv4: String,
    /// First IPv6 address, or empty
    pub ipv6: String,
}

/// Pick the device name: the override if non-empty, else the hostname.
///
/// Neither yielding a value is fatal; there is no device identity to publish.
pub fn resolve_device_name(
    override_name: Option<&str>,
    hostname: Option<&str>,
) -> Result<String> {
    override_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or_else(|| hostname.map(str::trim).filter(|name| !name.is_empty()))
        .map(str::to_lowercase)
        .ok_or_else(|| {
            Error::device_name("no override set and the system hostname is empty")
        })
}

/// Name of the first interface (in the order given) starting with `prefix`
pub fn select_interface<'a>(addrs: &'a [InterfaceAddr], prefix: &str) -> Option<&'a str> {
    addrs
        .iter()
        .find(|addr| addr.name.starts_with(prefix))
        .map(|addr| addr.name.as_str())
}

/// Choose the IPv4/IPv6 pair of the first interface matching `prefix`.
///
/// Only the first address of each family is kept. Later interfaces are never
/// considered, even when they also match. No match leaves both fields empty.
pub fn select_addresses(
    addrs: &[InterfaceAddr],
    prefix: &str,
    options: AddressOptions,
) -> SelectedAddresses {
    let Some(interface) = select_interface(addrs, prefix) else {
        return SelectedAddresses::default();
    };

    let mut selected = SelectedAddresses {
        interface: Some(interface.to_string()),
        ..SelectedAddresses::default()
    };

    for addr in addrs.iter().filter(|addr| addr.name == interface) {
        match addr.ip {
            IpAddr::V4(v4) => {
                if selected.ipv4.is_empty() {
                    selected.ipv4 = v4.to_string();
                }
            }
            // IPv4-mapped addresses render dotted, so they count as IPv4 only
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => {
                    if selected.ipv4.is_empty() {
                        selected.ipv4 = v4.to_string();
                    }
                }
                None => {
                    if selected.ipv6.is_empty()
                        && !(options.exclude_link_local && is_link_local_v6(&v6))
                    {
                        selected.ipv6 = v6.to_string();
                    }
                }
            },
        }
    }

    selected
}

fn is_link_local_v6(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfe80
}
