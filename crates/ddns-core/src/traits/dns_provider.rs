// # DNS Provider Trait
//
// Defines the interface to the hosted-zone API used to publish device records.
//
// ## Implementations
//
// - AWS Route53: `ddns-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// let provider = /* DnsProvider implementation */;
// let domain = provider.zone_domain("Z0123456789").await?;
// provider.submit_changes("Z0123456789", &batch).await?;
// ```

use crate::publisher::ChangeBatch;
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// Providers are single-shot: one API call per method invocation, no retry,
/// no backoff, no caching between calls. A failure is returned to the
/// engine, which stops.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the hosted zone's fully-qualified domain (e.g., "example.com.")
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ZoneLookup`] when the metadata fetch fails.
    async fn zone_domain(&self, zone_id: &str) -> Result<String, crate::Error>;

    /// Submit all changes of `batch` as one atomic change set
    ///
    /// The provider applies either every change or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ChangeSubmission`] when the batch is rejected
    /// or cannot be sent.
    async fn submit_changes(&self, zone_id: &str, batch: &ChangeBatch)
    -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
