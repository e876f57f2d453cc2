// # sonarwatchd - Sonar Watchdog Daemon
//
// The sonarwatchd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the GG directory, Sonar client, and service control together
// 4. Running the watchdog engine until shutdown
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `SONARWATCH_HEADSET_SUFFIX`: Friendly-name suffix identifying the
//   physical headset (default: "(Arctis Nova 7)")
// - `SONARWATCH_POLL_INTERVAL_SECS`: Seconds between polls (default: 10)
// - `SONARWATCH_COREPROPS_PATH`: Path to the GG address registry file
//   (default: C:/ProgramData/SteelSeries/SteelSeries Engine 3/coreProps.json)
// - `SONARWATCH_AUDIO_SERVICE`: OS audio service name (default: audiosrv)
// - `SONARWATCH_DRIVER_SERVICE`: Audio driver service name
//   (default: RtkAudioUniversalService)
// - `SONARWATCH_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export SONARWATCH_HEADSET_SUFFIX="(Arctis Nova 9)"
// export SONARWATCH_POLL_INTERVAL_SECS=5
//
// sonarwatchd
// ```

use anyhow::Result;
use sonarwatch_core::config::WatchdogConfig;
use sonarwatch_core::engine::WatchdogEngine;
use sonarwatch_directory_gg::{DEFAULT_CORE_PROPS_PATH, GgEndpointDirectory};
use sonarwatch_routing_sonar::SonarClient;
use sonarwatch_svc_windows::WindowsServiceManager;
use std::env;
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Unrecoverable error (bad configuration, audio service missing)
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum WatchdogExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or a host this watchdog cannot run on
    FatalError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<WatchdogExitCode> for ExitCode {
    fn from(code: WatchdogExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    headset_suffix: String,
    poll_interval_secs: u64,
    core_props_path: String,
    audio_service: String,
    driver_service: String,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            headset_suffix: env::var("SONARWATCH_HEADSET_SUFFIX")
                .unwrap_or_else(|_| "(Arctis Nova 7)".to_string()),
            poll_interval_secs: env::var("SONARWATCH_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            core_props_path: env::var("SONARWATCH_COREPROPS_PATH")
                .unwrap_or_else(|_| DEFAULT_CORE_PROPS_PATH.to_string()),
            audio_service: env::var("SONARWATCH_AUDIO_SERVICE")
                .unwrap_or_else(|_| "audiosrv".to_string()),
            driver_service: env::var("SONARWATCH_DRIVER_SERVICE")
                .unwrap_or_else(|_| "RtkAudioUniversalService".to_string()),
            log_level: env::var("SONARWATCH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.headset_suffix.is_empty() {
            anyhow::bail!(
                "SONARWATCH_HEADSET_SUFFIX cannot be empty. \
                Set it via: export SONARWATCH_HEADSET_SUFFIX=\"(Arctis Nova 7)\""
            );
        }

        if !(1..=3600).contains(&self.poll_interval_secs) {
            anyhow::bail!(
                "SONARWATCH_POLL_INTERVAL_SECS must be between 1 and 3600 seconds. Got: {}",
                self.poll_interval_secs
            );
        }

        if self.core_props_path.is_empty() {
            anyhow::bail!(
                "SONARWATCH_COREPROPS_PATH cannot be empty. \
                Unset it to use the default GG install location."
            );
        }

        if self.audio_service.is_empty() {
            anyhow::bail!("SONARWATCH_AUDIO_SERVICE cannot be empty");
        }

        if self.driver_service.is_empty() {
            anyhow::bail!("SONARWATCH_DRIVER_SERVICE cannot be empty");
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "SONARWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

/// Whether the error means the watchdog cannot run on this host at all
fn is_fatal_error(e: &anyhow::Error) -> bool {
    e.downcast_ref::<sonarwatch_core::Error>()
        .is_some_and(|err| err.is_fatal())
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = Config::from_env();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return WatchdogExitCode::FatalError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return WatchdogExitCode::FatalError.into();
    }

    info!("Starting sonarwatchd daemon");

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return WatchdogExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(config).await {
            Ok(()) => WatchdogExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {}", e);
                if is_fatal_error(&e) {
                    WatchdogExitCode::FatalError
                } else {
                    WatchdogExitCode::RuntimeError
                }
            }
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    info!("Audio service: {} (driver: {})", config.audio_service, config.driver_service);
    info!("Address registry: {}", config.core_props_path);

    let watchdog_config = WatchdogConfig {
        headset_suffix: config.headset_suffix,
        poll_interval_secs: config.poll_interval_secs,
        audio_service: config.audio_service,
        driver_service: config.driver_service,
        ..WatchdogConfig::new()
    };

    let directory = GgEndpointDirectory::with_core_props_path(&config.core_props_path);
    let routing = SonarClient::new();
    let services = WindowsServiceManager::new();

    let (engine, mut events) = WatchdogEngine::new(
        Box::new(directory),
        Box::new(routing),
        Box::new(services),
        watchdog_config,
    )?;

    // Drain engine events. The log stream already carries the same
    // information, so these are only surfaced at debug level.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    info!("Starting watchdog engine");
    engine.run().await?;

    Ok(())
}
