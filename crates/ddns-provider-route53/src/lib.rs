// # Route53 DNS Provider
//
// This crate provides an AWS Route53 provider implementation for the DDNS
// updater.
//
// ## Behavior
//
// - One API call per trait method: `GetHostedZone` or `ChangeResourceRecordSets`
// - Errors are returned to the engine as-is (no retry, no backoff)
// - Credentials and region come from the ambient AWS provider chain
//   (environment, profile, instance metadata); nothing is configured here
// - Dry-run mode performs the zone lookup but only logs the change batch
//
// ## API Reference
//
// - GetHostedZone: `GET /2013-04-01/hostedzone/{Id}`
// - ChangeResourceRecordSets: `POST /2013-04-01/hostedzone/{Id}/rrset`

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction as SdkChangeAction, ChangeBatch as SdkChangeBatch, ResourceRecord,
    ResourceRecordSet, RrType,
};
use aws_sdk_route53::Client;
use ddns_core::publisher::{ChangeAction, ChangeBatch, RecordChange, RecordType};
use ddns_core::traits::DnsProvider;
use ddns_core::{Error, Result};

/// Route53 is a global service; the SDK still wants a signing region
const FALLBACK_REGION: &str = "us-east-1";

/// Route53 DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform the hosted zone lookup
/// - Log the intended change batch as JSON
/// - **NOT** submit it
pub struct Route53Provider {
    /// Route53 API client
    client: Client,

    /// Dry-run mode: if true, look up the zone but skip submissions
    dry_run: bool,
}

impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl Route53Provider {
    /// Create a provider around an existing client
    pub fn new(client: Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Create a provider from the ambient AWS configuration
    pub async fn from_env(dry_run: bool) -> Self {
        let region = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        if dry_run {
            tracing::warn!("Route53 provider running in DRY-RUN mode - no changes will be made");
        }

        Self::new(Client::new(&sdk_config), dry_run)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Translate a core change batch into the SDK's change batch
pub fn to_sdk_batch(batch: &ChangeBatch) -> Result<SdkChangeBatch> {
    let changes = batch
        .changes
        .iter()
        .map(to_sdk_change)
        .collect::<Result<Vec<_>>>()?;

    SdkChangeBatch::builder()
        .comment(&batch.comment)
        .set_changes(Some(changes))
        .build()
        .map_err(|e| Error::invalid_input(format!("Invalid change batch: {}", e)))
}

fn to_sdk_change(change: &RecordChange) -> Result<Change> {
    let record = ResourceRecord::builder()
        .value(&change.value)
        .build()
        .map_err(|e| Error::invalid_input(format!("Invalid resource record: {}", e)))?;

    let record_set = ResourceRecordSet::builder()
        .name(&change.name)
        .r#type(rr_type(change.record_type))
        .ttl(change.ttl)
        .resource_records(record)
        .build()
        .map_err(|e| Error::invalid_input(format!("Invalid record set: {}", e)))?;

    let action = match change.action {
        ChangeAction::Upsert => SdkChangeAction::Upsert,
    };

    Change::builder()
        .action(action)
        .resource_record_set(record_set)
        .build()
        .map_err(|e| Error::invalid_input(format!("Invalid change: {}", e)))
}

fn rr_type(record_type: RecordType) -> RrType {
    match record_type {
        RecordType::A => RrType::A,
        RecordType::Aaaa => RrType::Aaaa,
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn zone_domain(&self, zone_id: &str) -> Result<String> {
        tracing::debug!("Looking up hosted zone {}", zone_id);

        let output = self
            .client
            .get_hosted_zone()
            .id(zone_id)
            .send()
            .await
            .map_err(|e| Error::zone_lookup(zone_id, DisplayErrorContext(&e).to_string()))?;

        let zone = output
            .hosted_zone()
            .ok_or_else(|| Error::zone_lookup(zone_id, "response has no hosted zone"))?;

        tracing::debug!("Hosted zone {} is {}", zone_id, zone.name());
        Ok(zone.name().to_string())
    }

    async fn submit_changes(&self, zone_id: &str, batch: &ChangeBatch) -> Result<()> {
        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would submit change batch to hosted zone {}: {}",
                zone_id,
                serde_json::to_string(batch)
                    .unwrap_or_else(|e| format!("<unserializable batch: {}>", e))
            );
            return Ok(());
        }

        let sdk_batch = to_sdk_batch(batch)?;

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(sdk_batch)
            .send()
            .await
            .map_err(|e| Error::change_submission(zone_id, DisplayErrorContext(&e).to_string()))?;

        if let Some(info) = output.change_info() {
            tracing::debug!("Change {} is {}", info.id(), info.status().as_str());
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "route53"
    }
}
