// # Routing Subsystem Trait
//
// Defines the interface for talking to the vendor's virtual-audio-device
// service: reading its device and redirection state, and triggering its
// auto-configuration.
//
// ## Implementations
//
// - Sonar HTTP API: `sonarwatch-routing-sonar` crate
//
// ## Trust Level
//
// Routing subsystem clients are thin, stateless integrations:
//
// - ✅ Perform HTTP calls against the resolved base URL only
// - ✅ Parse responses into the wire types below
// - ✅ Return transport failures to the engine (engine decides what to skip)
// - ❌ No retry logic (the poll interval is the retry policy)
// - ❌ No caching between calls (every tick re-reads the world)
// - ❌ No decisions about whether a reset is needed (owned by the engine)
//
// ## Usage
//
// ```rust,ignore
// use sonarwatch_core::traits::RoutingSubsystem;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let routing = /* RoutingSubsystem implementation */;
//     let base = "http://127.0.0.1:63676";
//
//     let devices = routing.audio_devices(base).await?;
//     println!("{} endpoints", devices.len());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::Deserialize;

/// Direction of an audio endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFlow {
    /// Playback endpoint
    Render,
    /// Recording endpoint
    Capture,
    /// Anything the OS reports that we do not care about
    #[serde(other)]
    Other,
}

/// Default role assigned to an audio endpoint by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultRole {
    Multimedia,
    Communications,
    /// Default for every role at once
    All,
    Console,
    None,
    /// Catch-all so one unexpected role cannot poison a whole device list
    #[serde(other)]
    Other,
}

/// One audio endpoint as reported by the routing subsystem
///
/// Produced fresh on every poll and discarded after the reconciliation
/// pass; never persisted or mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEndpoint {
    /// Display name, e.g. `"Headphones (Arctis Nova 7)"`
    pub friendly_name: String,

    /// Render or capture
    pub data_flow: DataFlow,

    /// Which default role the endpoint currently holds
    pub default_role: DefaultRole,

    /// Raw endpoint state string as reported (informational)
    #[serde(default)]
    pub state: String,
}

/// One redirection link between a physical device and its virtual
/// counterpart
///
/// The link identifier is named `id` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectionLink {
    /// The physical device this link forwards
    pub device_id: String,

    /// The link's own identifier
    #[serde(rename = "id")]
    pub link_id: String,

    /// Whether the link is currently forwarding audio
    pub is_running: bool,
}

/// Trait for routing subsystem implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Error Contract
///
/// Transport failures (timeout, refused connection) surface as `Err`; the
/// engine logs them and skips the tick. A response that arrives but does
/// not decode as the expected JSON shape is an *empty result*, not an
/// error; implementations return `Ok(vec![])` for it.
#[async_trait]
pub trait RoutingSubsystem: Send + Sync {
    /// Fetch the current audio endpoint list
    ///
    /// # Parameters
    ///
    /// - `base_url`: The routing subsystem base URL resolved this tick
    ///
    /// # Returns
    ///
    /// - `Ok(endpoints)`: Possibly empty list (empty also covers malformed
    ///   response bodies)
    /// - `Err(Error)`: Transport failure
    async fn audio_devices(&self, base_url: &str) -> Result<Vec<AudioEndpoint>, crate::Error>;

    /// Fetch the current classic redirection links
    ///
    /// Same contract as [`RoutingSubsystem::audio_devices`].
    async fn classic_redirections(
        &self,
        base_url: &str,
    ) -> Result<Vec<RedirectionLink>, crate::Error>;

    /// Trigger the subsystem's auto-configuration
    ///
    /// Fire-and-forget: implementations must not inspect the response
    /// status or body. Success means the request was delivered.
    ///
    /// # Idempotency
    ///
    /// The subsystem rebuilds its full device/redirection state on every
    /// call, so repeated triggers are safe.
    async fn trigger_auto_configure(&self, base_url: &str) -> Result<(), crate::Error>;
}
