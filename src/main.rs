//! `banner-rotator` service binary.
//!
//! Serves the rotator over HTTP (and gRPC with the `grpc` feature) backed by
//! in-memory storage, logging notifications instead of sending them to a
//! broker.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use banner_rotator::config::RotatorConfig;
use banner_rotator::{logger, Bandit, InMemoryStorage, LogPublisher, Rotator};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// CLI arguments for banner-rotator.
#[derive(Parser, Debug)]
#[command(name = "banner-rotator")]
#[command(about = "Banner rotation service with a UCB bandit")]
#[command(version)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config/rotator.toml")]
    config: PathBuf,
}

/// Termination signals, registered up front so none is missed between
/// startup and the first poll.
struct Shutdown {
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl Shutdown {
    fn listen() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                terminate: signal(SignalKind::terminate())?,
                hangup: signal(SignalKind::hangup())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Resolve on Ctrl-C, SIGTERM or SIGHUP.
    async fn wait(mut self) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    res?;
                    info!("Received Ctrl+C");
                }
                _ = self.terminate.recv() => info!("Received SIGTERM"),
                _ = self.hangup.recv() => info!("Received SIGHUP"),
            }
        }

        #[cfg(not(unix))]
        {
            let _ = &mut self;
            tokio::signal::ctrl_c().await?;
            info!("Received Ctrl+C");
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();

    let (config, missing) = match RotatorConfig::from_file(&args.config) {
        Ok(config) => (config, false),
        Err(err) if err.is_missing_file() => (RotatorConfig::default(), true),
        Err(err) => return Err(err.into()),
    };
    logger::init(&config.logger);
    if missing {
        warn!(path = %args.config.display(), "config file not found, using defaults");
    }

    let rotator = Arc::new(
        Rotator::new(
            InMemoryStorage::new(),
            LogPublisher::for_queue(config.queue.name.as_str()),
            Bandit::from_seed(config.bandit.seed),
        )
        .with_slot_locking(config.rotator.serialize_slot_selection),
    );
    info!(
        queue = %config.queue.name,
        serialize_slot_selection = config.rotator.serialize_slot_selection,
        "rotator ready"
    );

    let shutdown = Shutdown::listen()?;
    let http_addr = config.api.http_addr();

    #[cfg(feature = "grpc")]
    {
        let grpc_addr = config.api.grpc_addr();
        tokio::select! {
            res = banner_rotator::http::serve(rotator.clone(), &http_addr) => res?,
            res = banner_rotator::grpc::serve_grpc(rotator, &grpc_addr) => res?,
            res = shutdown.wait() => res?,
        }
    }

    #[cfg(not(feature = "grpc"))]
    {
        tokio::select! {
            res = banner_rotator::http::serve(rotator, &http_addr) => res?,
            res = shutdown.wait() => res?,
        }
    }

    Ok(())
}
