//! Configuration types for the watchdog
//!
//! The headset name, poll interval, and service names form a single
//! immutable struct that is validated once and handed to the engine at
//! construction.

use serde::{Deserialize, Serialize};

/// Watchdog configuration
///
/// Built once at startup (typically from environment variables by the
/// daemon), validated, then never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Suffix that identifies the physical headset's endpoints by friendly
    /// name, e.g. `"(Arctis Nova 7)"`
    #[serde(default = "default_headset_suffix")]
    pub headset_suffix: String,

    /// Seconds between poll ticks
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Name of the OS audio service to watch (Windows: `audiosrv`)
    #[serde(default = "default_audio_service")]
    pub audio_service: String,

    /// Name of the vendor audio driver service restarted alongside the
    /// audio service
    #[serde(default = "default_driver_service")]
    pub driver_service: String,

    /// Seconds to wait after issuing service restarts before reconciling,
    /// so the OS has time to bring the service back
    #[serde(default = "default_restart_settle_secs")]
    pub restart_settle_secs: u64,

    /// Capacity of the internal event channel
    ///
    /// When full, new events are dropped (with a warning log) so a slow
    /// consumer can never stall the watchdog loop.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl WatchdogConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self {
            headset_suffix: default_headset_suffix(),
            poll_interval_secs: default_poll_interval_secs(),
            audio_service: default_audio_service(),
            driver_service: default_driver_service(),
            restart_settle_secs: default_restart_settle_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.headset_suffix.is_empty() {
            return Err(crate::Error::config("Headset suffix cannot be empty"));
        }

        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("Poll interval must be > 0"));
        }

        if self.audio_service.is_empty() {
            return Err(crate::Error::config("Audio service name cannot be empty"));
        }

        if self.driver_service.is_empty() {
            return Err(crate::Error::config("Driver service name cannot be empty"));
        }

        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }

        Ok(())
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_headset_suffix() -> String {
    "(Arctis Nova 7)".to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_audio_service() -> String {
    "audiosrv".to_string()
}

fn default_driver_service() -> String {
    "RtkAudioUniversalService".to_string()
}

fn default_restart_settle_secs() -> u64 {
    1
}

fn default_event_channel_capacity() -> usize {
    64
}
