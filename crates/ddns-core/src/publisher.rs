//! Record publishing
//!
//! Turns a changed [`DeviceState`] into one atomic upsert batch against the
//! configured hosted zone:
//!
//! 1. Fetch the zone's domain suffix
//! 2. Compose `<device>.[<subdomain>.]<zone domain>`
//! 3. Upsert an A record for the IPv4 address
//! 4. Upsert an AAAA record when an IPv6 address was found
//! 5. Submit both in a single change batch
//!
//! Any provider failure is returned as-is; there is no retry.

use crate::device::DeviceState;
use crate::error::Result;
use crate::traits::DnsProvider;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// TTL applied to every published record (in seconds)
pub const RECORD_TTL: i64 = 60;

/// Comment attached to every change batch
pub const DEFAULT_BATCH_COMMENT: &str = "Sample update.";

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[serde(rename = "A")]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA")]
    Aaaa,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Change action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    /// Create or update
    Upsert,
}

/// One record set change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordChange {
    pub action: ChangeAction,
    pub record_type: RecordType,
    pub name: String,
    pub value: String,
    pub ttl: i64,
}

impl RecordChange {
    /// Upsert `name` of `record_type` to `value` with the fixed TTL
    pub fn upsert(record_type: RecordType, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            action: ChangeAction::Upsert,
            record_type,
            name: name.into(),
            value: value.into(),
            ttl: RECORD_TTL,
        }
    }
}

/// Changes applied atomically by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeBatch {
    pub comment: String,
    pub changes: Vec<RecordChange>,
}

impl ChangeBatch {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Outcome of a publish attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The batch was accepted by the provider
    Published {
        record_name: String,
        changes: usize,
    },
    /// Nothing to publish: the device has no address at all
    Skipped { record_name: String },
}

/// Compose the record name for a device.
///
/// The subdomain segment is only included when non-empty. The whole name is
/// lower-cased.
pub fn record_name(device: &str, subdomain: &str, zone_domain: &str) -> String {
    let name = if subdomain.is_empty() {
        format!("{}.{}", device, zone_domain)
    } else {
        format!("{}.{}.{}", device, subdomain, zone_domain)
    };
    name.to_lowercase()
}

/// Build the upsert batch for `state` under `record_name`.
///
/// An empty IPv4 address produces no A change rather than an empty-valued
/// record. The AAAA change is only added when an IPv6 address was found.
pub fn build_change_batch(record_name: &str, state: &DeviceState) -> ChangeBatch {
    let mut changes = Vec::with_capacity(2);

    if !state.ipv4.is_empty() {
        changes.push(RecordChange::upsert(RecordType::A, record_name, &state.ipv4));
    }

    if state.has_ipv6() {
        changes.push(RecordChange::upsert(RecordType::Aaaa, record_name, &state.ipv6));
    }

    ChangeBatch {
        comment: DEFAULT_BATCH_COMMENT.to_string(),
        changes,
    }
}

/// Publishes device records into one hosted zone
pub struct RecordPublisher {
    provider: Arc<dyn DnsProvider>,
    hosted_zone_id: String,
    subdomain: String,
}

impl RecordPublisher {
    pub fn new(
        provider: Arc<dyn DnsProvider>,
        hosted_zone_id: impl Into<String>,
        subdomain: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            hosted_zone_id: hosted_zone_id.into(),
            subdomain: subdomain.into(),
        }
    }

    /// Upsert the A/AAAA records for `state`.
    ///
    /// Performs at most one zone lookup and one batch submission.
    pub async fn publish(&self, state: &DeviceState) -> Result<PublishOutcome> {
        let zone_domain = self.provider.zone_domain(&self.hosted_zone_id).await?;
        let record_name = record_name(&state.name, &self.subdomain, &zone_domain);

        let batch = build_change_batch(&record_name, state);
        if batch.is_empty() {
            warn!(
                "No IPv4 or IPv6 address for {}, not submitting an empty change batch",
                record_name
            );
            return Ok(PublishOutcome::Skipped { record_name });
        }

        if state.ipv4.is_empty() {
            warn!("No IPv4 address for {}, skipping A record", record_name);
        }

        for change in &batch.changes {
            info!(
                "Creating DDNS {} record {} with value {}",
                change.record_type, change.name, change.value
            );
        }

        self.provider
            .submit_changes(&self.hosted_zone_id, &batch)
            .await?;

        info!("Record updated!");
        Ok(PublishOutcome::Published {
            record_name,
            changes: batch.len(),
        })
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }
}
