// # sonarwatch-core
//
// Core library for the Sonar audio-routing watchdog.
//
// ## Architecture Overview
//
// This library provides the reconciliation logic that keeps the vendor's
// virtual audio devices correctly wired:
//
// - **EndpointDirectory**: Trait for resolving the routing subsystem's base URL
// - **RoutingSubsystem**: Trait for reading device/redirection state and
//   triggering the subsystem's auto-configuration
// - **ServiceManager**: Trait for querying and starting OS services
// - **classify / any_inactive / decide**: Pure per-tick reconciliation functions
// - **WatchdogEngine**: Poll loop that orchestrates the above
//
// ## Design Principles
//
// 1. **Stateless ticks**: Every poll re-derives the full device picture;
//    nothing is carried between cycles, so transients self-correct
// 2. **Capability seams**: All I/O lives behind the three traits; the
//    decision logic is pure and synchronous
// 3. **One fatal condition**: Only a missing audio service terminates the
//    process; every other failure skips a tick and is retried by the clock
// 4. **Library-First**: The engine can be embedded and driven tick-by-tick

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod traits;

// Re-export core types for convenience
pub use classify::{DeviceStatusSnapshot, any_inactive, classify};
pub use config::WatchdogConfig;
pub use engine::{WatchdogEngine, WatchdogEvent};
pub use error::{Error, Result};
pub use policy::{ReconciliationDecision, decide};
pub use traits::{EndpointDirectory, RoutingSubsystem, ServiceManager};
