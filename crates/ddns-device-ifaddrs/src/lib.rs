// # Interface Device Source
//
// This crate provides a DeviceSource backed by the operating system's
// interface list (getifaddrs on Unix, GetAdaptersAddresses on Windows, via
// `if-addrs`) and the system hostname (via `hostname`).
//
// ## Behavior
//
// - Device name: the configured override, else the hostname. Neither → error.
// - Interface: the first one, in interface index order, whose name starts
//   with the configured prefix. Later matches are ignored. getifaddrs lists
//   every IPv4 entry before any IPv6 entry, so entries are regrouped by index
//   first.
// - Addresses: the first IPv4 and first IPv6 address of that interface.
// - No matching interface, or a failed enumeration, yields empty addresses.

use ddns_core::config::DdnsConfig;
use ddns_core::device::{self, AddressOptions, DeviceState, InterfaceAddr};
use ddns_core::traits::DeviceSource;
use ddns_core::Result;
use tracing::{info, warn};

/// Device source reading local interfaces and the hostname
#[derive(Debug, Clone)]
pub struct IfAddrsDeviceSource {
    /// Interface name prefix
    interface_prefix: String,

    /// Device name override, takes precedence over the hostname
    device_name: Option<String>,

    /// Address selection options
    options: AddressOptions,
}

impl IfAddrsDeviceSource {
    pub fn new(
        interface_prefix: impl Into<String>,
        device_name: Option<String>,
        options: AddressOptions,
    ) -> Self {
        Self {
            interface_prefix: interface_prefix.into(),
            device_name,
            options,
        }
    }

    /// Build a source from the daemon configuration
    pub fn from_config(config: &DdnsConfig) -> Self {
        Self::new(
            config.interface_prefix.clone(),
            config.device_name.clone(),
            AddressOptions {
                exclude_link_local: config.exclude_link_local,
            },
        )
    }

    fn system_hostname() -> Option<String> {
        match hostname::get() {
            Ok(name) => Some(name.to_string_lossy().into_owned()),
            Err(e) => {
                warn!("Failed to read system hostname: {}", e);
                None
            }
        }
    }

    fn interface_addrs() -> Vec<InterfaceAddr> {
        match if_addrs::get_if_addrs() {
            Ok(interfaces) => order_by_index(
                interfaces
                    .into_iter()
                    .map(|iface| {
                        let ip = iface.ip();
                        (iface.index, InterfaceAddr::new(iface.name, ip))
                    })
                    .collect(),
            ),
            Err(e) => {
                warn!("Failed to enumerate network interfaces: {}", e);
                Vec::new()
            }
        }
    }
}

/// Sort address entries by interface index, keeping each interface's own
/// entry order. Entries without an index go last.
fn order_by_index(mut entries: Vec<(Option<u32>, InterfaceAddr)>) -> Vec<InterfaceAddr> {
    entries.sort_by_key(|(index, _)| index.unwrap_or(u32::MAX));
    entries.into_iter().map(|(_, addr)| addr).collect()
}

impl DeviceSource for IfAddrsDeviceSource {
    fn observe(&self) -> Result<DeviceState> {
        let hostname = match self.device_name {
            Some(_) => None,
            None => Self::system_hostname(),
        };
        let name = device::resolve_device_name(self.device_name.as_deref(), hostname.as_deref())?;
        info!("Detected device name {}", name);
        info!(
            "Looking for network interface on prefix match {}",
            self.interface_prefix
        );

        let addrs = Self::interface_addrs();
        let selected = device::select_addresses(&addrs, &self.interface_prefix, self.options);

        match selected.interface {
            Some(ref interface) => info!("Using networking interface {}", interface),
            None => warn!(
                "No network interface matches prefix {}",
                self.interface_prefix
            ),
        }
        info!("Using IPv4 address {}", selected.ipv4);
        info!("Using IPv6 address {}", selected.ipv6);

        Ok(DeviceState::new(name, selected.ipv4, selected.ipv6))
    }

    fn source_name(&self) -> &'static str {
        "ifaddrs"
    }
}
