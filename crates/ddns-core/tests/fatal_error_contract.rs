//! Contract Test: Fatal Errors
//!
//! Constraints verified:
//! - A failed zone lookup stops the loop without retrying
//! - A rejected change batch stops the loop without retrying
//! - A missing device name stops the loop before any provider call
//! - The error is returned to the caller instead of exiting the process
//! - A failed publish leaves the stored state alone, so a restarted loop
//!   publishes the same observation again

mod common;

use common::*;
use ddns_core::{DdnsEngine, DeviceState, EngineEvent, Error, TickOutcome};
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn zone_lookup_failure_stops_engine() {
    let source = ScriptedDeviceSource::constant(device("pi", "10.0.0.2", ""));
    let provider = MockDnsProvider::failing("example.com.", FailureMode::ZoneLookup);

    let (mut engine, mut event_rx) = DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        minimal_config(""),
    )
    .expect("engine construction succeeds");

    let result = engine.run(CancellationToken::new()).await;

    let err = result.expect_err("zone lookup failure must end the loop");
    assert!(matches!(err, Error::ZoneLookup { .. }));
    assert!(err.is_fatal());
    assert_eq!(provider.zone_call_count(), 1, "No retry expected");
    assert_eq!(provider.submit_call_count(), 0);
    assert_eq!(source.observe_call_count(), 1);

    let mut saw_failed = false;
    while let Ok(event) = event_rx.try_recv() {
        saw_failed |= matches!(event, EngineEvent::Failed { .. });
    }
    assert!(saw_failed, "Failure must be reported as an event");
}

#[tokio::test(start_paused = true)]
async fn change_submission_failure_stops_engine() {
    let source = ScriptedDeviceSource::constant(device("pi", "10.0.0.2", "2001:db8::2"));
    let provider = MockDnsProvider::failing("example.com.", FailureMode::Submit);

    let (mut engine, _event_rx) = DdnsEngine::new(
        Box::new(source),
        Box::new(provider.clone()),
        minimal_config(""),
    )
    .expect("engine construction succeeds");

    let err = engine
        .run(CancellationToken::new())
        .await
        .expect_err("rejected batch must end the loop");

    assert!(matches!(err, Error::ChangeSubmission { .. }));
    assert_eq!(provider.submit_call_count(), 1, "No retry expected");
}

#[tokio::test(start_paused = true)]
async fn failed_submission_is_retried_when_loop_restarts() {
    let source = ScriptedDeviceSource::constant(device("pi", "10.0.0.2", ""));
    let provider = MockDnsProvider::failing("example.com.", FailureMode::FirstSubmit);

    let (mut engine, _event_rx) = DdnsEngine::new(
        Box::new(source),
        Box::new(provider.clone()),
        minimal_config(""),
    )
    .expect("engine construction succeeds");

    let err = engine.run(CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, Error::ChangeSubmission { .. }));
    assert_eq!(engine.last_state(), &DeviceState::default());

    let outcome = engine.tick().await.expect("second submission is accepted");
    assert_eq!(
        outcome,
        TickOutcome::Published {
            record_name: "pi.example.com.".to_string(),
            changes: 1,
        }
    );
    assert_eq!(provider.submit_call_count(), 2);
    assert_eq!(engine.last_state(), &device("pi", "10.0.0.2", ""));

    let outcome = engine.tick().await.unwrap();
    assert_eq!(outcome, TickOutcome::Unchanged);
    assert_eq!(provider.submit_call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_zone_lookup_keeps_change_pending() {
    let source = ScriptedDeviceSource::constant(device("pi", "10.0.0.2", ""));
    let provider = MockDnsProvider::failing("example.com.", FailureMode::ZoneLookup);

    let (mut engine, _event_rx) = DdnsEngine::new(
        Box::new(source),
        Box::new(provider.clone()),
        minimal_config(""),
    )
    .expect("engine construction succeeds");

    assert!(engine.tick().await.is_err());
    assert!(engine.tick().await.is_err());
    assert_eq!(provider.zone_call_count(), 2);
    assert!(engine.last_state().is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_device_name_stops_engine_before_publishing() {
    let source = ScriptedDeviceSource::new(vec![None]);
    let provider = MockDnsProvider::new("example.com.");

    let (mut engine, _event_rx) = DdnsEngine::new(
        Box::new(source),
        Box::new(provider.clone()),
        minimal_config(""),
    )
    .expect("engine construction succeeds");

    let err = engine
        .run(CancellationToken::new())
        .await
        .expect_err("missing device name must end the loop");

    assert!(matches!(err, Error::DeviceName(_)));
    assert_eq!(provider.zone_call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn failure_after_quiet_cycles_still_stops_engine() {
    let source = ScriptedDeviceSource::new(vec![
        Some(device("pi", "10.0.0.2", "")),
        Some(device("pi", "10.0.0.2", "")),
        None,
    ]);
    let provider = MockDnsProvider::new("example.com.");

    let (mut engine, _event_rx) = DdnsEngine::new(
        Box::new(source.clone()),
        Box::new(provider.clone()),
        minimal_config(""),
    )
    .expect("engine construction succeeds");

    let err = engine.run(CancellationToken::new()).await.unwrap_err();

    assert!(matches!(err, Error::DeviceName(_)));
    assert_eq!(source.observe_call_count(), 3);
    assert_eq!(provider.submit_call_count(), 1);
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let source = ScriptedDeviceSource::constant(device("pi", "10.0.0.2", ""));
    let provider = MockDnsProvider::new("example.com.");

    let mut config = minimal_config("");
    config.hosted_zone_id = String::new();

    let result = DdnsEngine::new(Box::new(source), Box::new(provider), config);
    assert!(matches!(result, Err(Error::Config(_))));
}
