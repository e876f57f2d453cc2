// # Endpoint Directory Trait
//
// Defines the interface for resolving symbolic sub-application names to
// concrete base URLs.
//
// ## Implementations
//
// - SteelSeries GG directory: `sonarwatch-directory-gg` crate
//   (coreProps registry file + `/subApps` discovery)
//
// ## Usage
//
// ```rust,ignore
// use sonarwatch_core::traits::{EndpointDirectory, ROUTING_SUB_APP};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let directory = /* EndpointDirectory implementation */;
//
//     match directory.resolve(ROUTING_SUB_APP).await? {
//         Some(base_url) => println!("Sonar at {}", base_url),
//         None => println!("Sonar not discoverable right now"),
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Directory name of the routing subsystem sub-application
pub const ROUTING_SUB_APP: &str = "sonar";

/// Trait for endpoint directory implementations
///
/// The directory performs the two-stage lookup that locates the routing
/// subsystem: read the local address-registry file, then query the admin
/// daemon's discovery endpoint.
///
/// # Freshness
///
/// Implementations must re-read the registry file on every call. The vendor
/// stack rewrites it whenever its daemons restart, so a cached address can
/// go stale at any moment.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait EndpointDirectory: Send + Sync {
    /// Resolve a sub-application name to a base URL
    ///
    /// # Parameters
    ///
    /// - `sub_app`: The sub-application name as registered with the admin
    ///   daemon (e.g. [`ROUTING_SUB_APP`])
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))`: The resolved base URL
    /// - `Ok(None)`: Directory reachable but the sub-application is not
    ///   discoverable right now (not running, no address published)
    /// - `Err(Error)`: Registry file unreadable or discovery transport
    ///   failure
    ///
    /// The engine treats `Ok(None)` and `Err` the same way: skip this
    /// tick's reconciliation and try again next poll.
    async fn resolve(&self, sub_app: &str) -> Result<Option<String>, crate::Error>;
}
