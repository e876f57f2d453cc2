// # Windows Service Control
//
// This crate drives the Windows service control manager through its
// command-line tools, the way an administrator at a prompt would.
//
// ## Commands
//
// - `sc query <name>` reports installation and run state
// - `net start <name>` starts a stopped service
//
// ## Exit Code 1060
//
// `sc` reports "the specified service does not exist" with code 1060.
// That is the one outcome mapped to `Ok(None)`; the caller decides
// whether a missing service is fatal. Any other command failure is an
// ordinary error.
//
// ## Portability
//
// The crate compiles on every platform (it only spawns processes), but
// the commands it runs exist on Windows alone. The output parsing is
// pure and covered by tests everywhere.

use sonarwatch_core::error::{Error, Result};
use sonarwatch_core::traits::{ServiceManager, ServiceStatus};
use tokio::process::Command;
use tracing::debug;

/// Windows error code for "the specified service does not exist"
const ERROR_SERVICE_DOES_NOT_EXIST: i32 = 1060;

/// Whether a finished `sc query` reported a service that is not installed
fn service_does_not_exist(exit_code: Option<i32>, output: &str) -> bool {
    exit_code == Some(ERROR_SERVICE_DOES_NOT_EXIST) || output.contains("FAILED 1060")
}

/// Parse the STATE line of `sc query` output
///
/// The line looks like:
///
/// ```text
///         STATE              : 4  RUNNING
/// ```
///
/// The numeric code is authoritative; the trailing word is display text.
fn parse_sc_query_output(output: &str) -> Option<ServiceStatus> {
    for line in output.lines() {
        let line = line.trim_start();
        if let Some(rest) = line.strip_prefix("STATE") {
            let rest = rest.trim_start().strip_prefix(':')?.trim_start();
            let code = rest.split_whitespace().next()?;
            return Some(match code {
                "1" => ServiceStatus::Stopped,
                "2" => ServiceStatus::StartPending,
                "3" => ServiceStatus::StopPending,
                "4" => ServiceStatus::Running,
                "5" => ServiceStatus::ContinuePending,
                "6" => ServiceStatus::PausePending,
                "7" => ServiceStatus::Paused,
                _ => ServiceStatus::Unknown,
            });
        }
    }
    None
}

/// Service manager backed by the `sc` and `net` command-line tools
pub struct WindowsServiceManager;

impl WindowsServiceManager {
    /// Create a new Windows service manager
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ServiceManager for WindowsServiceManager {
    async fn query_status(&self, name: &str) -> Result<Option<ServiceStatus>> {
        let output = Command::new("sc")
            .args(["query", name])
            .output()
            .await
            .map_err(|e| Error::service(format!("failed to run sc query: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if service_does_not_exist(output.status.code(), &stdout) {
            return Ok(None);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::service(format!(
                "sc query {} exited with {}: {}",
                name,
                output.status,
                stderr.trim()
            )));
        }

        match parse_sc_query_output(&stdout) {
            Some(status) => {
                debug!("Service {} reported {:?}", name, status);
                Ok(Some(status))
            }
            None => Err(Error::service(format!(
                "sc query {} output had no STATE line",
                name
            ))),
        }
    }

    async fn start(&self, name: &str) -> Result<()> {
        let output = Command::new("net")
            .args(["start", name])
            .output()
            .await
            .map_err(|e| Error::service(format!("failed to run net start: {}", e)))?;

        if output.status.success() {
            return Ok(());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);

        // The service racing up on its own between the query and the
        // start command is not a failure.
        if stdout.contains("already been started") {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::service(format!(
            "net start {} failed: {} {}",
            name,
            stdout.trim(),
            stderr.trim()
        )))
    }
}
