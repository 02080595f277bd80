//! Test doubles and common utilities for the engine contract tests

#![allow(dead_code)]

use async_trait::async_trait;
use ddns_core::config::{DdnsConfig, EngineConfig};
use ddns_core::error::{Error, Result};
use ddns_core::publisher::ChangeBatch;
use ddns_core::traits::{DeviceSource, DnsProvider};
use ddns_core::DeviceState;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A device source that replays a script of observations
///
/// `None` entries fail with a device-name error. Once the script runs out the
/// last entry repeats.
#[derive(Clone)]
pub struct ScriptedDeviceSource {
    script: Arc<Mutex<VecDeque<Option<DeviceState>>>>,
    last: Arc<Mutex<Option<DeviceState>>>,
    observe_call_count: Arc<AtomicUsize>,
}

impl ScriptedDeviceSource {
    pub fn new(script: Vec<Option<DeviceState>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(None)),
            observe_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that always reports the same state
    pub fn constant(state: DeviceState) -> Self {
        Self::new(vec![Some(state)])
    }

    /// Get the number of times observe() was called
    pub fn observe_call_count(&self) -> usize {
        self.observe_call_count.load(Ordering::SeqCst)
    }
}

impl DeviceSource for ScriptedDeviceSource {
    fn observe(&self) -> Result<DeviceState> {
        self.observe_call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        let entry = match next {
            Some(entry) => {
                *self.last.lock().unwrap() = entry.clone();
                entry
            }
            None => self.last.lock().unwrap().clone(),
        };

        entry.ok_or_else(|| Error::device_name("scripted failure"))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// Which provider call should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    None,
    ZoneLookup,
    Submit,
    /// Only the first submission is rejected
    FirstSubmit,
}

/// A mock DnsProvider that records every call
#[derive(Clone)]
pub struct MockDnsProvider {
    zone_domain: String,
    failure: FailureMode,
    zone_call_count: Arc<AtomicUsize>,
    submitted: Arc<Mutex<Vec<(String, ChangeBatch)>>>,
}

impl MockDnsProvider {
    pub fn new(zone_domain: &str) -> Self {
        Self {
            zone_domain: zone_domain.to_string(),
            failure: FailureMode::None,
            zone_call_count: Arc::new(AtomicUsize::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(zone_domain: &str, failure: FailureMode) -> Self {
        Self {
            failure,
            ..Self::new(zone_domain)
        }
    }

    /// Get the number of times zone_domain() was called
    pub fn zone_call_count(&self) -> usize {
        self.zone_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of batches submitted
    pub fn submit_call_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    /// Get the submitted (zone id, batch) pairs
    pub fn submitted(&self) -> Vec<(String, ChangeBatch)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsProvider for MockDnsProvider {
    async fn zone_domain(&self, zone_id: &str) -> Result<String> {
        self.zone_call_count.fetch_add(1, Ordering::SeqCst);
        if self.failure == FailureMode::ZoneLookup {
            return Err(Error::zone_lookup(zone_id, "NoSuchHostedZone"));
        }
        Ok(self.zone_domain.clone())
    }

    async fn submit_changes(&self, zone_id: &str, batch: &ChangeBatch) -> Result<()> {
        let attempt = {
            let mut submitted = self.submitted.lock().unwrap();
            submitted.push((zone_id.to_string(), batch.clone()));
            submitted.len()
        };
        let rejected = match self.failure {
            FailureMode::Submit => true,
            FailureMode::FirstSubmit => attempt == 1,
            FailureMode::None | FailureMode::ZoneLookup => false,
        };
        if rejected {
            return Err(Error::change_submission(zone_id, "InvalidChangeBatch"));
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(subdomain: &str) -> DdnsConfig {
    DdnsConfig {
        interface_prefix: "wlan".to_string(),
        hosted_zone_id: "ZTEST".to_string(),
        subdomain: subdomain.to_string(),
        device_name: None,
        exclude_link_local: false,
        engine: EngineConfig {
            poll_interval_secs: 30,
            event_channel_capacity: 100,
        },
    }
}

pub fn device(name: &str, ipv4: &str, ipv6: &str) -> DeviceState {
    DeviceState::new(name, ipv4, ipv6)
}
