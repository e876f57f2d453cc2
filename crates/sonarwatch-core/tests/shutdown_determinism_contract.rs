//! Contract tests for loop lifecycle and shutdown behaviour
//!
//! The engine sleeps before its first tick, observes shutdown only
//! between ticks, and returns an error only for the single fatal
//! condition. These tests drive the real loop with short intervals.

mod common;

use common::*;
use sonarwatch_core::engine::{WatchdogEngine, WatchdogEvent};
use sonarwatch_core::error::Error;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

fn drain(rx: &mut mpsc::Receiver<WatchdogEvent>) -> Vec<WatchdogEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_shutdown_before_first_interval_touches_nothing() {
    // The first tick only happens one full interval after start. A
    // shutdown that arrives earlier must produce a clean exit with zero
    // collaborator calls.
    let directory = FixedDirectory::new(Some("https://127.0.0.1:10000"));
    let directory_probe = FixedDirectory::sharing_counters_with(&directory);
    let routing = MockRoutingSubsystem::healthy();
    let routing_probe = MockRoutingSubsystem::sharing_counters_with(&routing);
    let services = MockServiceManager::running();
    let services_probe = MockServiceManager::sharing_counters_with(&services);

    let (engine, mut rx) = WatchdogEngine::new(
        Box::new(directory),
        Box::new(routing),
        Box::new(services),
        test_config(),
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    // Give the loop a moment to start sleeping, then stop it well before
    // the 1s poll interval elapses.
    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).unwrap();

    let result = handle.await.unwrap();
    assert!(result.is_ok());

    assert_eq!(services_probe.query_call_count(), 0);
    assert_eq!(directory_probe.resolve_call_count(), 0);
    assert_eq!(routing_probe.devices_call_count(), 0);

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![
            WatchdogEvent::Started {
                poll_interval_secs: 1,
            },
            WatchdogEvent::Stopped {
                reason: "Shutdown signal".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_loop_ticks_repeatedly_until_shutdown() {
    let services = MockServiceManager::running();
    let services_probe = MockServiceManager::sharing_counters_with(&services);

    let (engine, _rx) = WatchdogEngine::new(
        Box::new(FixedDirectory::new(Some("https://127.0.0.1:10000"))),
        Box::new(MockRoutingSubsystem::healthy()),
        Box::new(services),
        test_config(),
    )
    .unwrap();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move { engine.run_with_shutdown(Some(shutdown_rx)).await });

    // A 1s poll interval fits at least two ticks into 2.5s.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    shutdown_tx.send(()).unwrap();

    let result = handle.await.unwrap();
    assert!(result.is_ok());

    assert!(
        services_probe.query_call_count() >= 2,
        "expected at least 2 ticks, saw {}",
        services_probe.query_call_count()
    );
}

#[tokio::test]
async fn test_missing_service_terminates_the_loop() {
    let (engine, mut rx) = WatchdogEngine::new(
        Box::new(FixedDirectory::new(Some("https://127.0.0.1:10000"))),
        Box::new(MockRoutingSubsystem::healthy()),
        Box::new(MockServiceManager::not_installed()),
        test_config(),
    )
    .unwrap();

    // Never fire the shutdown sender; the fatal tick must end the loop
    // on its own shortly after the first interval.
    let (_shutdown_tx, shutdown_rx) = oneshot::channel();
    let result = tokio::time::timeout(
        Duration::from_secs(3),
        engine.run_with_shutdown(Some(shutdown_rx)),
    )
    .await
    .expect("loop should have terminated on its own");

    let err = result.unwrap_err();
    assert!(matches!(err, Error::ServiceNotFound(_)));

    let events = drain(&mut rx);
    assert_eq!(
        events,
        vec![
            WatchdogEvent::Started {
                poll_interval_secs: 1,
            },
            WatchdogEvent::Stopped {
                reason: "Service not found: audiosrv".to_string(),
            },
        ]
    );
}
