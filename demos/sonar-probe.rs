// # Sonar Real Environment Probe
//
// This is a validation tool for inspecting a live SteelSeries GG install
// with the same resolution and classification logic the watchdog runs.
// It performs one reconciliation pass, prints what it sees, and only
// touches anything when explicitly asked to.
//
// ## Usage
//
// ```bash
// # Dry-run mode (default - safe)
// cargo run --bin sonar_probe
//
// # Live mode (may trigger Sonar's auto-configuration!)
// SONARWATCH_MODE=live cargo run --bin sonar_probe
// ```
//
// ## Environment Variables
//
// Optional:
// - `SONARWATCH_COREPROPS_PATH`: Path to coreProps.json (default: GG install location)
// - `SONARWATCH_HEADSET_SUFFIX`: Headset friendly-name suffix (default: "(Arctis Nova 7)")
// - `SONARWATCH_MODE`: "dry-run" or "live" (default: dry-run)

use sonarwatch_core::policy::ReconciliationDecision;
use sonarwatch_core::traits::{EndpointDirectory, ROUTING_SUB_APP, RoutingSubsystem};
use sonarwatch_core::{any_inactive, classify, decide};
use sonarwatch_directory_gg::{DEFAULT_CORE_PROPS_PATH, GgEndpointDirectory};
use sonarwatch_routing_sonar::SonarClient;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("=== Sonar Real Environment Probe ===");

    let core_props_path = env::var("SONARWATCH_COREPROPS_PATH")
        .unwrap_or_else(|_| DEFAULT_CORE_PROPS_PATH.to_string());
    let headset_suffix =
        env::var("SONARWATCH_HEADSET_SUFFIX").unwrap_or_else(|_| "(Arctis Nova 7)".to_string());
    let mode = env::var("SONARWATCH_MODE").unwrap_or_else(|_| "dry-run".to_string());

    tracing::info!("Address registry: {}", core_props_path);
    tracing::info!("Headset suffix: {}", headset_suffix);
    tracing::info!("Mode: {}", mode);

    // Resolve Sonar through GG
    let directory = GgEndpointDirectory::with_core_props_path(&core_props_path);
    let base_url = match directory.resolve(ROUTING_SUB_APP).await? {
        Some(url) => url,
        None => {
            tracing::error!("Sonar is not discoverable through GG on this machine");
            std::process::exit(1);
        }
    };
    tracing::info!("Sonar resolved at {}", base_url);

    // Fetch both listings
    let client = SonarClient::new();
    let endpoints = client.audio_devices(&base_url).await?;
    let links = client.classic_redirections(&base_url).await?;

    tracing::info!("Sonar reports {} endpoint(s):", endpoints.len());
    for endpoint in &endpoints {
        tracing::info!(
            "  {:?}/{:?}  {}",
            endpoint.data_flow,
            endpoint.default_role,
            endpoint.friendly_name
        );
    }

    tracing::info!("Sonar reports {} redirection(s):", links.len());
    for link in &links {
        tracing::info!(
            "  {} (device {}) running={}",
            link.link_id,
            link.device_id,
            link.is_running
        );
    }

    // Classify and decide exactly like a watchdog tick
    let snapshot = classify(&endpoints, &headset_suffix);
    let decision = decide(&snapshot, any_inactive(&links));

    tracing::info!("Snapshot: {:?}", snapshot);
    match &decision {
        ReconciliationDecision::NoAction => {
            tracing::info!("Verdict: healthy, nothing to do");
        }
        ReconciliationDecision::WaitForHardware { reason } => {
            tracing::warn!("Verdict: waiting for hardware ({})", reason);
        }
        ReconciliationDecision::TriggerReset { reason } => {
            tracing::warn!("Verdict: reset required ({})", reason);

            if mode == "live" {
                tracing::warn!("Live mode: triggering Sonar auto-configuration");
                client.trigger_auto_configure(&base_url).await?;
                tracing::info!("Auto-configuration triggered");
            } else {
                tracing::info!("Dry-run mode: set SONARWATCH_MODE=live to trigger the reset");
            }
        }
    }

    Ok(())
}
