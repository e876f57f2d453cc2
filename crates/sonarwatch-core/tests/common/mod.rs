//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that verify the engine's
//! orchestration contract without any real I/O.

use sonarwatch_core::config::WatchdogConfig;
use sonarwatch_core::error::{Error, Result};
use sonarwatch_core::traits::{
    AudioEndpoint, DataFlow, DefaultRole, EndpointDirectory, RedirectionLink, RoutingSubsystem,
    ServiceManager, ServiceStatus,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Headset suffix used by all test fixtures
pub const TEST_SUFFIX: &str = "(Arctis Nova 7)";

/// A directory that always resolves to a fixed answer
pub struct FixedDirectory {
    /// Address to hand out; `None` means "not discoverable"
    address: Option<String>,
    /// When true, resolve() returns an error instead
    fail: bool,
    /// Call counter for resolve()
    resolve_call_count: Arc<AtomicUsize>,
}

impl FixedDirectory {
    pub fn new(address: Option<&str>) -> Self {
        Self {
            address: address.map(|s| s.to_string()),
            fail: false,
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A directory whose resolve() always fails
    pub fn failing() -> Self {
        Self {
            address: None,
            fail: true,
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }

    /// Create a new FixedDirectory that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            address: other.address.clone(),
            fail: other.fail,
            resolve_call_count: Arc::clone(&other.resolve_call_count),
        }
    }
}

#[async_trait::async_trait]
impl EndpointDirectory for FixedDirectory {
    async fn resolve(&self, _sub_app: &str) -> Result<Option<String>> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::discovery("directory unavailable"));
        }
        Ok(self.address.clone())
    }
}

/// A mock RoutingSubsystem serving canned lists and tracking calls
pub struct MockRoutingSubsystem {
    devices: Vec<AudioEndpoint>,
    redirections: Vec<RedirectionLink>,
    fail_devices: bool,
    fail_redirections: bool,
    fail_reset: bool,
    /// Call counter for audio_devices()
    devices_call_count: Arc<AtomicUsize>,
    /// Call counter for classic_redirections()
    redirections_call_count: Arc<AtomicUsize>,
    /// Call counter for trigger_auto_configure()
    reset_call_count: Arc<AtomicUsize>,
}

impl MockRoutingSubsystem {
    pub fn new(devices: Vec<AudioEndpoint>, redirections: Vec<RedirectionLink>) -> Self {
        Self {
            devices,
            redirections,
            fail_devices: false,
            fail_redirections: false,
            fail_reset: false,
            devices_call_count: Arc::new(AtomicUsize::new(0)),
            redirections_call_count: Arc::new(AtomicUsize::new(0)),
            reset_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A subsystem reporting the complete healthy topology
    pub fn healthy() -> Self {
        Self::new(healthy_endpoints(), vec![running_link("physical-out")])
    }

    /// Make audio_devices() fail with a transport error
    pub fn with_failing_devices(mut self) -> Self {
        self.fail_devices = true;
        self
    }

    /// Make classic_redirections() fail with a transport error
    pub fn with_failing_redirections(mut self) -> Self {
        self.fail_redirections = true;
        self
    }

    /// Make trigger_auto_configure() fail with a transport error
    pub fn with_failing_reset(mut self) -> Self {
        self.fail_reset = true;
        self
    }

    /// Get the number of times audio_devices() was called
    pub fn devices_call_count(&self) -> usize {
        self.devices_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times classic_redirections() was called
    pub fn redirections_call_count(&self) -> usize {
        self.redirections_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times trigger_auto_configure() was called
    pub fn reset_call_count(&self) -> usize {
        self.reset_call_count.load(Ordering::SeqCst)
    }

    /// Create a new MockRoutingSubsystem that shares counters with an
    /// existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            devices: other.devices.clone(),
            redirections: other.redirections.clone(),
            fail_devices: other.fail_devices,
            fail_redirections: other.fail_redirections,
            fail_reset: other.fail_reset,
            devices_call_count: Arc::clone(&other.devices_call_count),
            redirections_call_count: Arc::clone(&other.redirections_call_count),
            reset_call_count: Arc::clone(&other.reset_call_count),
        }
    }
}

#[async_trait::async_trait]
impl RoutingSubsystem for MockRoutingSubsystem {
    async fn audio_devices(&self, _base_url: &str) -> Result<Vec<AudioEndpoint>> {
        self.devices_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_devices {
            return Err(Error::routing("device fetch refused"));
        }
        Ok(self.devices.clone())
    }

    async fn classic_redirections(&self, _base_url: &str) -> Result<Vec<RedirectionLink>> {
        self.redirections_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_redirections {
            return Err(Error::routing("redirection fetch refused"));
        }
        Ok(self.redirections.clone())
    }

    async fn trigger_auto_configure(&self, _base_url: &str) -> Result<()> {
        self.reset_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_reset {
            return Err(Error::routing("reset call refused"));
        }
        Ok(())
    }
}

/// A mock ServiceManager with a fixed status and call tracking
pub struct MockServiceManager {
    /// Status query_status() reports; `None` means "not installed"
    status: Option<ServiceStatus>,
    /// When true, query_status() returns an error instead
    fail_query: bool,
    /// When true, start() returns an error
    fail_start: bool,
    /// Call counter for query_status()
    query_call_count: Arc<AtomicUsize>,
    /// Call counter for start()
    start_call_count: Arc<AtomicUsize>,
    /// Service names passed to start(), in order
    started_services: Arc<std::sync::Mutex<Vec<String>>>,
}

impl MockServiceManager {
    pub fn new(status: Option<ServiceStatus>) -> Self {
        Self {
            status,
            fail_query: false,
            fail_start: false,
            query_call_count: Arc::new(AtomicUsize::new(0)),
            start_call_count: Arc::new(AtomicUsize::new(0)),
            started_services: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// A manager reporting the service as running
    pub fn running() -> Self {
        Self::new(Some(ServiceStatus::Running))
    }

    /// A manager reporting the service as stopped
    pub fn stopped() -> Self {
        Self::new(Some(ServiceStatus::Stopped))
    }

    /// A manager reporting the service as not installed
    pub fn not_installed() -> Self {
        Self::new(None)
    }

    /// Make query_status() fail with a command error
    pub fn with_failing_query(mut self) -> Self {
        self.fail_query = true;
        self
    }

    /// Make start() fail with a command error
    pub fn with_failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Get the number of times query_status() was called
    pub fn query_call_count(&self) -> usize {
        self.query_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times start() was called
    pub fn start_call_count(&self) -> usize {
        self.start_call_count.load(Ordering::SeqCst)
    }

    /// Get the service names passed to start(), in call order
    pub fn started_services(&self) -> Vec<String> {
        self.started_services.lock().unwrap().clone()
    }

    /// Create a new MockServiceManager that shares counters with an
    /// existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            status: other.status,
            fail_query: other.fail_query,
            fail_start: other.fail_start,
            query_call_count: Arc::clone(&other.query_call_count),
            start_call_count: Arc::clone(&other.start_call_count),
            started_services: Arc::clone(&other.started_services),
        }
    }
}

#[async_trait::async_trait]
impl ServiceManager for MockServiceManager {
    async fn query_status(&self, _name: &str) -> Result<Option<ServiceStatus>> {
        self.query_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_query {
            return Err(Error::service("query command failed"));
        }
        Ok(self.status)
    }

    async fn start(&self, name: &str) -> Result<()> {
        self.start_call_count.fetch_add(1, Ordering::SeqCst);
        self.started_services.lock().unwrap().push(name.to_string());
        if self.fail_start {
            return Err(Error::service("start command failed"));
        }
        Ok(())
    }
}

/// Build one endpoint with the given shape
pub fn endpoint(name: &str, flow: DataFlow, role: DefaultRole) -> AudioEndpoint {
    AudioEndpoint {
        friendly_name: name.to_string(),
        data_flow: flow,
        default_role: role,
        state: "active".to_string(),
    }
}

/// The virtual gaming output endpoint
pub fn virtual_gaming() -> AudioEndpoint {
    endpoint(
        "SteelSeries Sonar - Gaming (SteelSeries Sonar Virtual Audio Device)",
        DataFlow::Render,
        DefaultRole::Multimedia,
    )
}

/// The virtual chat output endpoint
pub fn virtual_chat() -> AudioEndpoint {
    endpoint(
        "SteelSeries Sonar - Chat (SteelSeries Sonar Virtual Audio Device)",
        DataFlow::Render,
        DefaultRole::Communications,
    )
}

/// The virtual microphone endpoint
pub fn virtual_mic() -> AudioEndpoint {
    endpoint(
        "SteelSeries Sonar - Microphone (SteelSeries Sonar Virtual Audio Device)",
        DataFlow::Capture,
        DefaultRole::All,
    )
}

/// The physical headset output endpoint
pub fn physical_out() -> AudioEndpoint {
    endpoint("Headphones (Arctis Nova 7)", DataFlow::Render, DefaultRole::Console)
}

/// The physical headset input endpoint
pub fn physical_in() -> AudioEndpoint {
    endpoint("Mic (Arctis Nova 7)", DataFlow::Capture, DefaultRole::Console)
}

/// All five expected endpoints
pub fn healthy_endpoints() -> Vec<AudioEndpoint> {
    vec![
        virtual_gaming(),
        virtual_chat(),
        virtual_mic(),
        physical_out(),
        physical_in(),
    ]
}

/// A redirection link that is forwarding audio
pub fn running_link(device_id: &str) -> RedirectionLink {
    RedirectionLink {
        device_id: device_id.to_string(),
        link_id: format!("link-{}", device_id),
        is_running: true,
    }
}

/// A redirection link that has stopped forwarding
pub fn stopped_link(device_id: &str) -> RedirectionLink {
    RedirectionLink {
        device_id: device_id.to_string(),
        link_id: format!("link-{}", device_id),
        is_running: false,
    }
}

/// Helper to create a WatchdogConfig suitable for tests
///
/// The settle delay is zeroed so restart paths run instantly.
pub fn test_config() -> WatchdogConfig {
    WatchdogConfig {
        headset_suffix: TEST_SUFFIX.to_string(),
        poll_interval_secs: 1,
        audio_service: "audiosrv".to_string(),
        driver_service: "RtkAudioUniversalService".to_string(),
        restart_settle_secs: 0,
        event_channel_capacity: 64,
    }
}
