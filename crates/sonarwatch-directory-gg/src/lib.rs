// # GG Endpoint Directory
//
// This crate resolves routing sub-app addresses through SteelSeries GG.
//
// ## Resolution Pipeline
//
// 1. Read coreProps.json for the GG admin server address
// 2. GET `https://<ggEncryptedAddress>/subApps` for the sub-app listing
// 3. Pick the sub-app's web address by preference:
//    plain `webServerAddress`, then `https://` + `encryptedWebServerAddress`,
//    then `offlineFrontendAddress` verbatim
//
// ## Freshness
//
// GG rewrites coreProps.json with new ports whenever it restarts, so the
// registry file is re-read on every resolution attempt. Nothing in this
// crate caches an address.
//
// ## TLS
//
// The GG admin server presents a self-signed certificate on localhost,
// so certificate validation is disabled for this client.

use serde::Deserialize;
use sonarwatch_core::error::{Error, Result};
use sonarwatch_core::traits::EndpointDirectory;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default location of the GG address registry file
pub const DEFAULT_CORE_PROPS_PATH: &str =
    "C:/ProgramData/SteelSeries/SteelSeries Engine 3/coreProps.json";

/// Contents of coreProps.json
///
/// The registry also carries the plain and encrypted addresses of the
/// main GG server; the watchdog only needs the admin server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoreProps {
    /// TLS address of the GG admin server (host:port)
    #[serde(default)]
    gg_encrypted_address: String,
}

impl CoreProps {
    /// TLS base URL of the GG admin server, if the registry lists one
    fn admin_base_url(&self) -> Option<String> {
        if self.gg_encrypted_address.is_empty() {
            None
        } else {
            Some(format!("https://{}", self.gg_encrypted_address))
        }
    }
}

/// Response shape of GET /subApps
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubAppsResponse {
    #[serde(default)]
    sub_apps: HashMap<String, SubApp>,
}

/// One sub-app entry in the listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubApp {
    #[serde(default)]
    metadata: SubAppMetadata,
}

/// Addresses advertised for a sub-app
///
/// Any subset of these may be present depending on how far the sub-app
/// has come up.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubAppMetadata {
    /// Complete web server URL, usable as-is
    #[serde(default)]
    web_server_address: Option<String>,

    /// TLS host:port, needs the scheme prepended
    #[serde(default)]
    encrypted_web_server_address: Option<String>,

    /// Offline fallback address, passed through verbatim
    #[serde(default)]
    offline_frontend_address: Option<String>,
}

/// Pick the best advertised address for a sub-app
fn preferred_address(metadata: &SubAppMetadata) -> Option<String> {
    if let Some(url) = metadata.web_server_address.as_deref() {
        if !url.is_empty() {
            return Some(url.to_string());
        }
    }

    if let Some(addr) = metadata.encrypted_web_server_address.as_deref() {
        if !addr.is_empty() {
            return Some(format!("https://{}", addr));
        }
    }

    if let Some(addr) = metadata.offline_frontend_address.as_deref() {
        if !addr.is_empty() {
            return Some(addr.to_string());
        }
    }

    None
}

/// Endpoint directory backed by the local SteelSeries GG install
pub struct GgEndpointDirectory {
    /// Path to coreProps.json
    core_props_path: PathBuf,

    /// HTTP client accepting GG's self-signed certificate
    client: reqwest::Client,
}

impl GgEndpointDirectory {
    /// Create a directory reading the default coreProps.json location
    pub fn new() -> Self {
        Self::with_core_props_path(DEFAULT_CORE_PROPS_PATH)
    }

    /// Create a directory reading a custom registry path
    ///
    /// # Parameters
    ///
    /// - `path`: Location of coreProps.json
    pub fn with_core_props_path(path: impl Into<PathBuf>) -> Self {
        Self {
            core_props_path: path.into(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .danger_accept_invalid_certs(true)
                .build()
                .unwrap_or_default(),
        }
    }

    /// Read the registry file and extract the admin base URL
    ///
    /// The file is read fresh on every call.
    async fn read_admin_base_url(&self) -> Result<Option<String>> {
        let text = tokio::fs::read_to_string(&self.core_props_path)
            .await
            .map_err(|e| {
                Error::discovery(format!(
                    "failed to read {}: {}",
                    self.core_props_path.display(),
                    e
                ))
            })?;

        let props: CoreProps = serde_json::from_str(&text)
            .map_err(|e| Error::discovery(format!("invalid address registry: {}", e)))?;

        Ok(props.admin_base_url())
    }

    /// Fetch the sub-app listing from the GG admin server
    async fn fetch_sub_apps(&self, admin_url: &str) -> Result<Option<SubAppsResponse>> {
        let response = self
            .client
            .get(format!("{}/subApps", admin_url))
            .send()
            .await
            .map_err(|e| Error::discovery(format!("subApps query failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::discovery(format!(
                "subApps query returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::discovery(format!("failed to read subApps response: {}", e)))?;

        match serde_json::from_str(&body) {
            Ok(listing) => Ok(Some(listing)),
            Err(e) => {
                tracing::warn!("Malformed subApps listing: {}", e);
                Ok(None)
            }
        }
    }
}

impl Default for GgEndpointDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EndpointDirectory for GgEndpointDirectory {
    async fn resolve(&self, sub_app: &str) -> Result<Option<String>> {
        let admin_url = match self.read_admin_base_url().await? {
            Some(url) => url,
            None => {
                tracing::debug!("Address registry has no GG admin address yet");
                return Ok(None);
            }
        };

        let listing = match self.fetch_sub_apps(&admin_url).await? {
            Some(listing) => listing,
            None => return Ok(None),
        };

        let entry = match listing.sub_apps.get(sub_app) {
            Some(entry) => entry,
            None => {
                tracing::debug!("Sub-app {} not present in GG listing", sub_app);
                return Ok(None);
            }
        };

        let address = preferred_address(&entry.metadata);
        if address.is_none() {
            tracing::debug!("Sub-app {} has no usable address yet", sub_app);
        }
        Ok(address)
    }
}
