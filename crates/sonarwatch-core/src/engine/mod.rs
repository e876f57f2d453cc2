//! Core watchdog engine
//!
//! The WatchdogEngine is responsible for:
//! - Polling OS audio-service health via ServiceManager
//! - Restarting the audio stack when the service is down
//! - Resolving the routing subsystem via EndpointDirectory
//! - Classifying device state and deciding on corrective action
//! - Triggering the subsystem's auto-configuration when needed
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ sleep(interval) │◀────────────────────────────────┐
//! └────────┬────────┘                                 │
//!          ▼                                          │
//! ┌─────────────────┐  not installed → fatal          │
//! │ ServiceManager  │─────────────────────▶ exit      │
//! │ (query/start)   │                                 │
//! └────────┬────────┘                                 │
//!          ▼                                          │
//! ┌─────────────────┐  not discoverable → skip tick ──┤
//! │ EndpointDir     │                                 │
//! └────────┬────────┘                                 │
//!          ▼                                          │
//! ┌─────────────────┐    ┌───────────────┐           │
//! │ RoutingSubsys   │───▶│ classify +    │───────────┘
//! │ (fetch lists)   │    │ decide (+PUT) │
//! └─────────────────┘    └───────────────┘
//! ```
//!
//! ## Tick Flow
//!
//! 1. Query the audio service; restart it (and the driver service) if down
//! 2. Resolve the routing subsystem address (fresh every tick)
//! 3. Fetch endpoint and redirection lists
//! 4. Classify, check redirections, decide
//! 5. If the decision is a reset, issue the corrective call
//!
//! No state survives between ticks: every cycle re-derives the full
//! picture, so a transient misreading self-corrects on the next poll.

use crate::classify::{any_inactive, classify};
use crate::config::WatchdogConfig;
use crate::error::{Error, Result};
use crate::policy::{ReconciliationDecision, decide};
use crate::traits::{EndpointDirectory, ROUTING_SUB_APP, RoutingSubsystem, ServiceManager};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the WatchdogEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchdogEvent {
    /// Engine started
    Started {
        poll_interval_secs: u64,
    },

    /// A start command was issued for a service
    ServiceRestartIssued {
        service: String,
    },

    /// The tick ended early without a reconciliation decision
    TickSkipped {
        reason: String,
    },

    /// A reconciliation decision was reached
    Decided {
        decision: ReconciliationDecision,
    },

    /// The corrective call was delivered
    ResetTriggered,

    /// The corrective call failed at the transport level
    ResetFailed {
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Core watchdog engine
///
/// The engine orchestrates the poll → classify → decide → correct flow.
/// It runs continuously, one tick per poll interval, until shutdown or the
/// single fatal condition (audio service not installed).
///
/// ## Lifecycle
///
/// 1. Create with [`WatchdogEngine::new()`]
/// 2. Start with [`WatchdogEngine::run()`]
/// 3. Engine runs until shutdown signal received
/// 4. Drop to cleanup
///
/// ## Threading
///
/// All work happens on a single async task; ticks never overlap because
/// the next sleep only begins after the previous tick completes.
pub struct WatchdogEngine {
    /// Resolves the routing subsystem's base URL
    directory: Box<dyn EndpointDirectory>,

    /// Reads device/redirection state and triggers resets
    routing: Box<dyn RoutingSubsystem>,

    /// Queries and starts OS services
    services: Box<dyn ServiceManager>,

    /// Immutable watchdog configuration
    config: WatchdogConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<WatchdogEvent>,
}

impl WatchdogEngine {
    /// Create a new watchdog engine
    ///
    /// # Parameters
    ///
    /// - `directory`: Endpoint directory implementation
    /// - `routing`: Routing subsystem implementation
    /// - `services`: Service manager implementation
    /// - `config`: Watchdog configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields
    /// engine events
    pub fn new(
        directory: Box<dyn EndpointDirectory>,
        routing: Box<dyn RoutingSubsystem>,
        services: Box<dyn ServiceManager>,
        config: WatchdogConfig,
    ) -> Result<(Self, mpsc::Receiver<WatchdogEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let engine = Self {
            directory,
            routing,
            services,
            config,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine
    ///
    /// Sleeps one poll interval, runs one tick, repeats. The first tick
    /// happens one full interval after startup.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown (Ctrl-C)
    /// - `Err(Error)`: The audio service is not installed on this host
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    ///
    /// # Parameters
    ///
    /// - `shutdown_rx`: Optional oneshot receiver to trigger shutdown (for testing)
    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.emit_event(WatchdogEvent::Started {
            poll_interval_secs: self.config.poll_interval_secs,
        });
        info!(
            "Watchdog running (headset: \"{}\", interval: {}s)",
            self.config.headset_suffix, self.config.poll_interval_secs
        );

        let poll_interval = Duration::from_secs(self.config.poll_interval_secs);

        // Main poll loop. A tick in progress always completes; shutdown is
        // only observed between ticks.
        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for provided shutdown signal
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(poll_interval) => {
                        if let Err(e) = self.tick().await {
                            error!("Fatal watchdog error: {}", e);
                            self.emit_event(WatchdogEvent::Stopped {
                                reason: e.to_string(),
                            });
                            return Err(e);
                        }
                    }

                    // Handle test shutdown signal
                    _ = &mut rx => {
                        info!("Shutdown signal received");
                        self.emit_event(WatchdogEvent::Stopped {
                            reason: "Shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for Ctrl-C
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(poll_interval) => {
                        if let Err(e) = self.tick().await {
                            error!("Fatal watchdog error: {}", e);
                            self.emit_event(WatchdogEvent::Stopped {
                                reason: e.to_string(),
                            });
                            return Err(e);
                        }
                    }

                    _ = tokio::signal::ctrl_c() => {
                        info!("Shutdown signal received");
                        self.emit_event(WatchdogEvent::Stopped {
                            reason: "Shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        info!("Watchdog stopped");
        Ok(())
    }

    /// Run one complete poll cycle
    ///
    /// Public so tests (and embedders) can drive cycles deterministically
    /// without waiting out the poll interval.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Tick completed (including ticks skipped for transient
    ///   reasons; those are logged and emitted as [`WatchdogEvent::TickSkipped`])
    /// - `Err(Error)`: The audio service is not installed; this is the only
    ///   error a tick can return
    pub async fn tick(&self) -> Result<()> {
        match self.services.query_status(&self.config.audio_service).await {
            Ok(Some(status)) if status.is_running() => {
                debug!("Audio service {} is running", self.config.audio_service);
            }
            Ok(Some(status)) => {
                info!(
                    "Audio service {} is {:?}, restarting audio stack",
                    self.config.audio_service, status
                );
                self.restart_audio_stack().await;
            }
            Ok(None) => {
                error!(
                    "Audio service {} is not installed on this host",
                    self.config.audio_service
                );
                return Err(Error::service_not_found(self.config.audio_service.clone()));
            }
            Err(e) => {
                warn!("Audio service status query failed: {}", e);
                self.emit_event(WatchdogEvent::TickSkipped {
                    reason: format!("service query failed: {}", e),
                });
                return Ok(());
            }
        }

        self.reconcile().await;
        Ok(())
    }

    /// Issue start commands for the audio and driver services, then wait
    /// for the configured settle delay
    ///
    /// Start failures are logged and tolerated; the services may already be
    /// coming back on their own.
    async fn restart_audio_stack(&self) {
        for service in [&self.config.audio_service, &self.config.driver_service] {
            match self.services.start(service).await {
                Ok(()) => {
                    info!("Issued start for service {}", service);
                    self.emit_event(WatchdogEvent::ServiceRestartIssued {
                        service: service.clone(),
                    });
                }
                Err(e) => {
                    warn!("Failed to start service {}: {}", service, e);
                }
            }
        }

        // Give the OS time to bring the services up before the endpoint
        // queries run
        tokio::time::sleep(Duration::from_secs(self.config.restart_settle_secs)).await;
    }

    /// Resolve, fetch, classify, decide, and possibly trigger a reset
    ///
    /// Every failure in here is transient: it is logged, the tick is
    /// skipped, and nothing escapes to the loop.
    async fn reconcile(&self) {
        let base_url = match self.directory.resolve(ROUTING_SUB_APP).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!("Routing subsystem not discoverable, skipping tick");
                self.emit_event(WatchdogEvent::TickSkipped {
                    reason: "routing subsystem not discoverable".to_string(),
                });
                return;
            }
            Err(e) => {
                warn!("Address resolution failed: {}", e);
                self.emit_event(WatchdogEvent::TickSkipped {
                    reason: format!("address resolution failed: {}", e),
                });
                return;
            }
        };
        debug!("Routing subsystem at {}", base_url);

        let endpoints = match self.routing.audio_devices(&base_url).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Device list fetch failed: {}", e);
                self.emit_event(WatchdogEvent::TickSkipped {
                    reason: format!("device list fetch failed: {}", e),
                });
                return;
            }
        };

        let links = match self.routing.classic_redirections(&base_url).await {
            Ok(list) => list,
            Err(e) => {
                warn!("Redirection list fetch failed: {}", e);
                self.emit_event(WatchdogEvent::TickSkipped {
                    reason: format!("redirection list fetch failed: {}", e),
                });
                return;
            }
        };

        for link in links.iter().filter(|link| !link.is_running) {
            debug!(
                "Redirection {} for device {} is not running",
                link.link_id, link.device_id
            );
        }

        let snapshot = classify(&endpoints, &self.config.headset_suffix);
        let decision = decide(&snapshot, any_inactive(&links));

        match &decision {
            ReconciliationDecision::NoAction => {
                debug!("Device state healthy, nothing to do");
            }
            ReconciliationDecision::WaitForHardware { reason } => {
                info!("Waiting for hardware: {}", reason);
            }
            ReconciliationDecision::TriggerReset { reason } => {
                info!("Reset required: {}", reason);
            }
        }

        let requires_reset = decision.requires_reset();
        self.emit_event(WatchdogEvent::Decided { decision });

        if requires_reset {
            match self.routing.trigger_auto_configure(&base_url).await {
                Ok(()) => {
                    info!("Auto-configuration triggered");
                    self.emit_event(WatchdogEvent::ResetTriggered);
                }
                Err(e) => {
                    warn!("Auto-configuration call failed: {}", e);
                    self.emit_event(WatchdogEvent::ResetFailed {
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    /// Emit an engine event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    fn emit_event(&self, event: WatchdogEvent) {
        // Send event, logging a warning if the channel is full. The event is
        // dropped rather than letting a slow consumer stall the loop.
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }

    /// Test-only helper to run the engine with a controlled shutdown signal
    ///
    /// # Visibility
    ///
    /// This is `pub` for testing purposes only.
    ///
    /// **TESTING ONLY**: Contract tests require controlled shutdown.
    /// Production daemon code should use `run()` instead, which manages
    /// shutdown via Ctrl-C rather than programmatic channels.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watchdog_event_clone_eq() {
        let event = WatchdogEvent::Decided {
            decision: ReconciliationDecision::NoAction,
        };

        // Just test that events can be created and cloned
        let _ = event.clone();
        assert_eq!(event.clone(), event);
    }
}
