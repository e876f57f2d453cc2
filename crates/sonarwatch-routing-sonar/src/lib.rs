// # Sonar Routing Client
//
// This crate talks to the Sonar sub-app's local web API.
//
// ## Endpoints
//
// - `GET /audioDevices` lists every audio endpoint Sonar can see
// - `GET /classicRedirections` lists physical-device redirection links
// - `PUT /onboarding/configure` makes Sonar rebuild its device wiring
//
// ## Error Contract
//
// Transport failures surface as errors so the caller can skip a cycle.
// A response body that does not parse is treated as an empty listing
// instead: Sonar briefly serves partial JSON while starting up, and an
// empty listing simply defers action to a later poll.
//
// ## TLS
//
// The base URL usually points at a local TLS port with a self-signed
// certificate, so certificate validation is disabled for this client.

use serde::de::DeserializeOwned;
use sonarwatch_core::error::{Error, Result};
use sonarwatch_core::traits::{AudioEndpoint, RedirectionLink, RoutingSubsystem};
use std::time::Duration;

/// Device endpoint listing
const AUDIO_DEVICES_PATH: &str = "/audioDevices";

/// Redirection link listing
const CLASSIC_REDIRECTIONS_PATH: &str = "/classicRedirections";

/// Auto-configuration trigger
const AUTO_CONFIGURE_PATH: &str = "/onboarding/configure";

/// Decode a JSON listing, degrading a malformed body to an empty list
fn decode_list<T: DeserializeOwned>(path: &str, body: &str) -> Vec<T> {
    match serde_json::from_str(body) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Malformed {} body, treating as empty: {}", path, e);
            Vec::new()
        }
    }
}

/// HTTP client for the Sonar web API
///
/// The client is address-free: every call takes the base URL resolved
/// for the current cycle, because Sonar's port can move between polls.
pub struct SonarClient {
    /// HTTP client accepting Sonar's self-signed certificate
    client: reqwest::Client,
}

impl SonarClient {
    /// Create a new Sonar client
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .danger_accept_invalid_certs(true)
                .build()
                .unwrap_or_default(),
        }
    }

    /// GET a JSON listing from the given path
    async fn fetch_list<T: DeserializeOwned>(&self, base_url: &str, path: &str) -> Result<Vec<T>> {
        let response = self
            .client
            .get(format!("{}{}", base_url, path))
            .send()
            .await
            .map_err(|e| Error::routing(format!("GET {} failed: {}", path, e)))?;

        if !response.status().is_success() {
            return Err(Error::routing(format!(
                "GET {} returned {}",
                path,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::routing(format!("failed to read {} response: {}", path, e)))?;

        Ok(decode_list(path, &body))
    }
}

impl Default for SonarClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RoutingSubsystem for SonarClient {
    async fn audio_devices(&self, base_url: &str) -> Result<Vec<AudioEndpoint>> {
        self.fetch_list(base_url, AUDIO_DEVICES_PATH).await
    }

    async fn classic_redirections(&self, base_url: &str) -> Result<Vec<RedirectionLink>> {
        self.fetch_list(base_url, CLASSIC_REDIRECTIONS_PATH).await
    }

    async fn trigger_auto_configure(&self, base_url: &str) -> Result<()> {
        self.client
            .put(format!("{}{}", base_url, AUTO_CONFIGURE_PATH))
            .send()
            .await
            .map_err(|e| Error::routing(format!("PUT {} failed: {}", AUTO_CONFIGURE_PATH, e)))?;

        // Fire and forget: Sonar rebuilds its wiring in the background
        // and neither status nor body carries anything actionable.
        Ok(())
    }
}
