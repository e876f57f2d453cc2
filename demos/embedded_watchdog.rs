//! Minimal embedding example for sonarwatch-core
//!
//! This example demonstrates using sonarwatch-core as a library in a custom
//! application. The engine lifecycle is fully managed by the application,
//! and every collaborator is an in-memory fake, so the example runs on any
//! machine with nothing installed.

#![allow(dead_code)]

use sonarwatch_core::config::WatchdogConfig;
use sonarwatch_core::engine::WatchdogEngine;
use sonarwatch_core::traits::{
    AudioEndpoint, DataFlow, DefaultRole, EndpointDirectory, RedirectionLink, RoutingSubsystem,
    ServiceManager, ServiceStatus,
};
use sonarwatch_core::Result;
use std::sync::{Arc, Mutex};

/// Directory that always answers with the same local address
struct ScriptedDirectory;

#[async_trait::async_trait]
impl EndpointDirectory for ScriptedDirectory {
    async fn resolve(&self, _sub_app: &str) -> Result<Option<String>> {
        Ok(Some("https://127.0.0.1:10000".to_string()))
    }
}

/// Routing subsystem whose device list lives in shared memory
///
/// The application can break the topology mid-run; the auto-configure
/// call repairs it, the same way the real Sonar would.
struct ScriptedRouting {
    devices: Arc<Mutex<Vec<AudioEndpoint>>>,
}

impl ScriptedRouting {
    fn new() -> (Self, Arc<Mutex<Vec<AudioEndpoint>>>) {
        let devices = Arc::new(Mutex::new(full_topology()));
        (
            Self {
                devices: Arc::clone(&devices),
            },
            devices,
        )
    }
}

#[async_trait::async_trait]
impl RoutingSubsystem for ScriptedRouting {
    async fn audio_devices(&self, _base_url: &str) -> Result<Vec<AudioEndpoint>> {
        Ok(self.devices.lock().unwrap().clone())
    }

    async fn classic_redirections(&self, _base_url: &str) -> Result<Vec<RedirectionLink>> {
        Ok(vec![RedirectionLink {
            device_id: "demo-headset".to_string(),
            link_id: "demo-link".to_string(),
            is_running: true,
        }])
    }

    async fn trigger_auto_configure(&self, _base_url: &str) -> Result<()> {
        println!("[Sonar] auto-configure requested, rebuilding device topology");
        *self.devices.lock().unwrap() = full_topology();
        Ok(())
    }
}

/// Service manager for a host where the audio service never misbehaves
struct HealthyServiceManager;

#[async_trait::async_trait]
impl ServiceManager for HealthyServiceManager {
    async fn query_status(&self, _name: &str) -> Result<Option<ServiceStatus>> {
        Ok(Some(ServiceStatus::Running))
    }

    async fn start(&self, _name: &str) -> Result<()> {
        Ok(())
    }
}

fn device(name: &str, flow: DataFlow, role: DefaultRole) -> AudioEndpoint {
    AudioEndpoint {
        friendly_name: name.to_string(),
        data_flow: flow,
        default_role: role,
        state: "active".to_string(),
    }
}

/// Every endpoint a healthy install enumerates
fn full_topology() -> Vec<AudioEndpoint> {
    vec![
        device(
            "SteelSeries Sonar - Gaming (SteelSeries Sonar Virtual Audio Device)",
            DataFlow::Render,
            DefaultRole::Multimedia,
        ),
        device(
            "SteelSeries Sonar - Chat (SteelSeries Sonar Virtual Audio Device)",
            DataFlow::Render,
            DefaultRole::Communications,
        ),
        device(
            "SteelSeries Sonar - Microphone (SteelSeries Sonar Virtual Audio Device)",
            DataFlow::Capture,
            DefaultRole::All,
        ),
        device("Headphones (Arctis Nova 7)", DataFlow::Render, DefaultRole::Console),
        device("Mic (Arctis Nova 7)", DataFlow::Capture, DefaultRole::Console),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded sonarwatch-core Example ===\n");

    // Create custom components
    let (routing, devices) = ScriptedRouting::new();

    let config = WatchdogConfig {
        poll_interval_secs: 1,
        ..WatchdogConfig::new()
    };

    // Create engine
    println!("1. Creating engine...");
    let (engine, mut event_rx) = WatchdogEngine::new(
        Box::new(ScriptedDirectory),
        Box::new(routing),
        Box::new(HealthyServiceManager),
        config,
    )?;

    // Spawn event listener (optional)
    let event_listener = tokio::spawn(async move {
        println!("2. Event listener started");
        while let Some(event) = event_rx.recv().await {
            println!("[Event] {:?}", event);
        }
        println!("Event listener stopped");
    });

    // Run engine in background
    println!("3. Starting engine in background...");
    let engine_handle = tokio::spawn(async move { engine.run().await });

    // Let the first healthy tick go by
    tokio::time::sleep(tokio::time::Duration::from_millis(1500)).await;

    // Break the topology: the gaming device disappears, as it would if
    // the virtual driver glitched
    println!("\n4. Removing the gaming endpoint to simulate a driver glitch...");
    devices
        .lock()
        .unwrap()
        .retain(|d| !d.friendly_name.starts_with("SteelSeries Sonar - Gaming"));

    // The next tick notices and repairs it through auto-configure
    tokio::time::sleep(tokio::time::Duration::from_millis(1500)).await;

    // One more tick to observe the healed state
    tokio::time::sleep(tokio::time::Duration::from_millis(1000)).await;

    println!("\n5. Stopping engine...");
    engine_handle.abort();

    // Wait for event listener to drain
    let _ = tokio::time::timeout(tokio::time::Duration::from_millis(200), event_listener).await;

    println!("\n=== Embedding Successful ===");
    println!("Key Points:");
    println!("- Engine lifecycle is fully controlled by application");
    println!("- All collaborators are custom (not sonarwatchd defaults)");
    println!("- A broken topology heals within one poll interval");

    Ok(())
}
