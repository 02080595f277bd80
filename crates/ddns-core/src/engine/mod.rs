//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Observing the device via DeviceSource on a fixed interval
//! - Comparing the observation to the last published state
//! - Publishing A/AAAA records via RecordPublisher when it changed
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   DeviceState   ┌────────────────┐  changed  ┌─────────────────┐
//! │ DeviceSource │────────────────▶│ ChangeDetector │──────────▶│ RecordPublisher │
//! └──────────────┘                 └────────────────┘           └─────────────────┘
//!        ▲                                                               │
//!        └──────────────────── sleep(poll_interval) ◀────────────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Observe the device
//! 2. Compare to the stored state by value
//! 3. Equal: log and do nothing. Different: publish it
//! 4. Store the state once the publish succeeded
//! 5. Sleep, repeat
//!
//! A failed observation or publish stops the loop and is returned to the
//! caller. There is no retry, but the state is left untouched so a restarted
//! loop publishes the same observation again.

use crate::config::DdnsConfig;
use crate::device::DeviceState;
use crate::error::Result;
use crate::publisher::{PublishOutcome, RecordPublisher};
use crate::traits::{DeviceSource, DnsProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started { poll_interval: Duration },

    /// Observation matched the stored state
    Unchanged { state: DeviceState },

    /// Records were upserted
    Published {
        record_name: String,
        changes: usize,
    },

    /// State changed but there was nothing to submit
    Skipped { record_name: String },

    /// A cycle failed; the engine is stopping
    Failed { error: String },

    /// Engine stopped
    Stopped { reason: String },
}

/// What a single poll cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Unchanged,
    Published {
        record_name: String,
        changes: usize,
    },
    Skipped {
        record_name: String,
    },
}

/// Holds the last observed device state and detects changes by value
///
/// Starts from the empty state, so the first real observation always counts
/// as a change.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last: DeviceState,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `current` differs from the last stored state
    pub fn has_changed(&self, current: &DeviceState) -> bool {
        *current != self.last
    }

    /// Record `state` as the last acted-on state
    pub fn commit(&mut self, state: DeviceState) {
        self.last = state;
    }

    /// The last stored state
    pub fn last(&self) -> &DeviceState {
        &self.last
    }
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`], passing a cancellation token
/// 3. The engine runs until the token is cancelled (`Ok`) or a cycle fails (`Err`)
///
/// ## Threading
///
/// All work happens on the task that calls `run()`. Each cycle runs to
/// completion before the next sleep starts.
pub struct DdnsEngine {
    /// Device observer
    source: Box<dyn DeviceSource>,

    /// Publishes records for changed states
    publisher: RecordPublisher,

    /// Last published state
    detector: ChangeDetector,

    /// Delay between cycles
    poll_interval: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        source: Box<dyn DeviceSource>,
        provider: Box<dyn DnsProvider>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);
        let provider: Arc<dyn DnsProvider> = Arc::from(provider);

        let engine = Self {
            source,
            publisher: RecordPublisher::new(provider, config.hosted_zone_id, config.subdomain),
            detector: ChangeDetector::new(),
            poll_interval: config.engine.poll_interval(),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the polling loop until `shutdown` is cancelled.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Cancelled
    /// - `Err(Error)`: A cycle failed; nothing was retried
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<()> {
        info!(
            "Starting DDNS engine (source: {}, provider: {}, interval: {:?})",
            self.source.source_name(),
            self.publisher.provider_name(),
            self.poll_interval
        );
        self.emit_event(EngineEvent::Started {
            poll_interval: self.poll_interval,
        });

        loop {
            let result = tokio::select! {
                biased;
                _ = shutdown.cancelled() => None,
                result = self.tick() => Some(result),
            };

            match result {
                None => break,
                Some(Ok(outcome)) => debug!("Cycle finished: {:?}", outcome),
                Some(Err(e)) => {
                    error!("DDNS cycle failed: {}", e);
                    self.emit_event(EngineEvent::Failed {
                        error: e.to_string(),
                    });
                    return Err(e);
                }
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("Shutdown signal received");
        self.emit_event(EngineEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
        Ok(())
    }

    /// Run a single observe → compare → publish cycle
    pub async fn tick(&mut self) -> Result<TickOutcome> {
        let current = self.source.observe()?;

        if !self.detector.has_changed(&current) {
            info!("No changes, not updating record");
            self.emit_event(EngineEvent::Unchanged { state: current });
            return Ok(TickOutcome::Unchanged);
        }

        debug!("Device state changed: {:?}", current);

        let outcome = self.publisher.publish(&current).await?;
        self.detector.commit(current);

        match outcome {
            PublishOutcome::Published {
                record_name,
                changes,
            } => {
                self.emit_event(EngineEvent::Published {
                    record_name: record_name.clone(),
                    changes,
                });
                Ok(TickOutcome::Published {
                    record_name,
                    changes,
                })
            }
            PublishOutcome::Skipped { record_name } => {
                self.emit_event(EngineEvent::Skipped {
                    record_name: record_name.clone(),
                });
                Ok(TickOutcome::Skipped { record_name })
            }
        }
    }

    /// The last state the engine acted on
    pub fn last_state(&self) -> &DeviceState {
        self.detector.last()
    }

    fn emit_event(&self, event: EngineEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
