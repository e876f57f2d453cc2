//! Core traits for the watchdog
//!
//! This module defines the capability interfaces the engine depends on.
//!
//! - [`EndpointDirectory`]: Resolve the routing subsystem's base URL
//! - [`RoutingSubsystem`]: Fetch device/redirection state and trigger resets
//! - [`ServiceManager`]: Query and start OS services by name

pub mod endpoint_directory;
pub mod routing_subsystem;
pub mod service_manager;

pub use endpoint_directory::{EndpointDirectory, ROUTING_SUB_APP};
pub use routing_subsystem::{
    AudioEndpoint, DataFlow, DefaultRole, RedirectionLink, RoutingSubsystem,
};
pub use service_manager::{ServiceManager, ServiceStatus};
