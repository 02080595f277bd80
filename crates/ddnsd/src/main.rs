// # ddnsd - Device DDNS Daemon
//
// This is a thin integration layer. All change detection and publishing
// logic lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from flags, falling back to environment variables
// 2. Initializing logging and the runtime
// 3. Building the device source and the Route53 provider
// 4. Running the DDNS engine until a signal or a fatal error
//
// ## Configuration
//
// | flag | environment | default |
// |---|---|---|
// | `--interface` | `INTERFACE` | `wlan` |
// | `--hosted-zone-id` | `HOSTED_ZONE_ID` | (required) |
// | `--subdomain` | `SUBDOMAIN` | empty |
// | `--device-name` | `BALENA_DEVICE_NAME_AT_INIT` | system hostname |
// | `--poll-interval` | `DDNS_POLL_INTERVAL_SECS` | `30` |
// | `--exclude-link-local` | `DDNS_EXCLUDE_LINK_LOCAL` | `false` |
// | `--dry-run` | `DDNS_DRY_RUN` | `false` |
// | `--log-level` | `DDNS_LOG_LEVEL` | `info` |
//
// AWS credentials and region are read by the AWS SDK from its usual sources.
//
// ## Example
//
// ```bash
// export HOSTED_ZONE_ID=Z0123456789ABCDEF
// export SUBDOMAIN=home
// ddnsd --interface eth
// ```

use anyhow::Result;
use clap::Parser;
use ddns_core::{DdnsConfig, DdnsEngine, EngineConfig, EngineEvent};
use ddns_device_ifaddrs::IfAddrsDeviceSource;
use ddns_provider_route53::Route53Provider;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Fatal runtime error (device name, zone lookup, change submission)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl DdnsExitCode {
    /// Map the daemon's result to its exit code
    fn for_result(result: &Result<()>) -> Self {
        match result {
            Ok(()) => Self::CleanShutdown,
            Err(_) => Self::RuntimeError,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ddnsd")]
#[command(about = "Publish this device's addresses as Route53 A/AAAA records", long_about = None)]
struct Args {
    /// Interface prefix match, will use first matching interface name
    #[arg(long = "interface", env = "INTERFACE", default_value = "wlan")]
    interface: String,

    /// Hosted zone ID to create a DDNS record in
    #[arg(long = "hosted-zone-id", env = "HOSTED_ZONE_ID", default_value = "")]
    hosted_zone_id: String,

    /// Subdomain section <deviceName>.<subdomain>.<domain>
    #[arg(long, env = "SUBDOMAIN", default_value = "")]
    subdomain: String,

    /// Device name, defaults to the system hostname
    #[arg(long = "device-name", env = "BALENA_DEVICE_NAME_AT_INIT")]
    device_name: Option<String>,

    /// Seconds to wait between polls
    #[arg(long = "poll-interval", env = "DDNS_POLL_INTERVAL_SECS", default_value_t = 30)]
    poll_interval: u64,

    /// Never publish fe80::/10 addresses as the AAAA record
    #[arg(long = "exclude-link-local", env = "DDNS_EXCLUDE_LINK_LOCAL")]
    exclude_link_local: bool,

    /// Look up the zone but only log the change batch
    #[arg(long = "dry-run", env = "DDNS_DRY_RUN")]
    dry_run: bool,

    /// Log level: trace, debug, info, warn, error
    #[arg(long = "log-level", env = "DDNS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    /// Resolve the parsed arguments into the engine configuration
    fn to_config(&self) -> DdnsConfig {
        let mut config = DdnsConfig::new(self.hosted_zone_id.trim())
            .with_interface_prefix(&self.interface)
            .with_subdomain(self.subdomain.trim())
            .with_device_name(self.device_name.clone());
        config.exclude_link_local = self.exclude_link_local;
        config.engine = EngineConfig {
            poll_interval_secs: self.poll_interval,
            ..EngineConfig::default()
        };
        config
    }

    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match args.log_level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let config = args.to_config();
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");
    info!(
        "Hosted zone: {}, interface prefix: {}, subdomain: '{}'",
        config.hosted_zone_id, config.interface_prefix, config.subdomain
    );

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run_daemon(config, args.dry_run));
    if let Err(ref e) = result {
        error!("Daemon error: {:#}", e);
    }

    DdnsExitCode::for_result(&result).into()
}

/// Run the daemon
async fn run_daemon(config: DdnsConfig, dry_run: bool) -> Result<()> {
    let source = IfAddrsDeviceSource::from_config(&config);
    let provider = Route53Provider::from_env(dry_run).await;

    let (mut engine, event_rx) = DdnsEngine::new(Box::new(source), Box::new(provider), config)?;
    tokio::spawn(log_events(event_rx));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Signal handler error: {}", e),
        }
        signal_token.cancel();
    });

    engine.run(shutdown).await?;
    info!("Shutting down daemon");
    Ok(())
}

/// Drain engine events into the debug log until the engine is dropped
///
/// Returns the number of events seen.
async fn log_events(mut event_rx: mpsc::Receiver<EngineEvent>) -> usize {
    let mut seen = 0;
    while let Some(event) = event_rx.recv().await {
        debug!("Engine event: {:?}", event);
        seen += 1;
    }
    seen
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
