// # ddns-core
//
// Core library for the device DDNS updater.
//
// ## Architecture Overview
//
// - **DeviceSource**: Trait for observing the device name and addresses
// - **DnsProvider**: Trait for the hosted-zone API (zone lookup, change batch)
// - **ChangeDetector**: Compares each observation to the last published state
// - **RecordPublisher**: Builds and submits the A/AAAA upsert batch
// - **DdnsEngine**: Polling loop tying the three together
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Platform and provider code live in their own crates
// 2. **Explicit Configuration**: One config value built at startup, no globals
// 3. **Library-First**: The loop returns errors instead of exiting the process
// 4. **Fail Fast**: Provider errors stop the loop; a supervisor restarts the daemon

pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod publisher;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, EngineConfig};
pub use device::{AddressOptions, DeviceState, InterfaceAddr, SelectedAddresses};
pub use engine::{ChangeDetector, DdnsEngine, EngineEvent, TickOutcome};
pub use error::{Error, Result};
pub use publisher::{ChangeBatch, RecordChange, RecordPublisher, RecordType};
pub use traits::{DeviceSource, DnsProvider};
