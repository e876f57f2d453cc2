// # Service Manager Trait
//
// Defines the interface for querying and starting OS services by name.
//
// ## Implementations
//
// - Windows service control: `sonarwatch-svc-windows` crate
//   (`sc query` / `net start` child processes)
//
// ## Trust Level
//
// Service managers execute OS commands on behalf of the engine:
//
// - ✅ Run service-control commands for the named service only
// - ✅ Parse command output into [`ServiceStatus`]
// - ❌ No restart policy (the engine decides when to start what)
// - ❌ No waiting or polling for state transitions (the engine owns timing)

use async_trait::async_trait;

/// Lifecycle state of an OS service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Stopped,
    StartPending,
    StopPending,
    Paused,
    PausePending,
    ContinuePending,
    /// Reported state did not match any known value
    Unknown,
}

impl ServiceStatus {
    /// Whether the service is fully up
    ///
    /// Pending and paused states count as not running; the watchdog
    /// restarts a service stuck in them just like a stopped one.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Trait for OS service control implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Query the status of a service
    ///
    /// # Parameters
    ///
    /// - `name`: The service name (e.g. `"audiosrv"`)
    ///
    /// # Returns
    ///
    /// - `Ok(Some(status))`: The service exists and reports this status
    /// - `Ok(None)`: The service is not installed on this host; for the
    ///   audio service this is the watchdog's one fatal condition
    /// - `Err(Error)`: The query itself failed (command error); treated as
    ///   transient by the engine
    async fn query_status(&self, name: &str) -> Result<Option<ServiceStatus>, crate::Error>;

    /// Start a service
    ///
    /// # Parameters
    ///
    /// - `name`: The service name
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The start command was accepted
    /// - `Err(Error)`: The command failed (already running, access denied,
    ///   unknown service); the engine logs and continues
    async fn start(&self, name: &str) -> Result<(), crate::Error>;
}
