// Author: Dustin Pilgrim
// License: MIT

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::bayguard_log::{self, LogPolicy};
use crate::cli::Args;
use crate::daemon::Daemon;

type AnyError = Box<dyn std::error::Error + Send + Sync>;

pub async fn run(args: Args) -> Result<(), AnyError> {
    // single-instance
    let _instance_lock = crate::app::platform::acquire_single_instance_lock().map_err(|e| {
        eprintln!("bayguard: {e}");
        io::Error::new(io::ErrorKind::AlreadyExists, e)
    })?;

    init_logging(args.verbose);

    tracing::info!("bayguard starting");

    let config_path: PathBuf = match args.config.as_deref() {
        Some(p) => p.to_path_buf(),
        None => crate::config::resolve_default_config_path(),
    };

    let loaded = crate::config::load_from_path(&config_path).map_err(|e| {
        tracing::error!("{e}");
        eprintln!("bayguard: {e}");
        io::Error::new(io::ErrorKind::InvalidData, e.to_string())
    })?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let mut daemon = Daemon::new(loaded.cfg, loaded.path);

    let mut daemon_task = tokio::spawn({
        let shutdown_tx = shutdown_tx.clone();
        async move { daemon.run(shutdown_rx, shutdown_tx).await }
    });

    tokio::select! {
        res = &mut daemon_task => {
            match res {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e),
                Err(join_err) => Err(Box::new(join_err) as AnyError),
            }
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received Ctrl+C, shutting down");
            let _ = shutdown_tx.send(true);

            match daemon_task.await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e),
                Err(join_err) => Err(Box::new(join_err)),
            }
        }
    }
}

/// File sink always (when a home directory exists), console only with
/// `--verbose`. `RUST_LOG` overrides the level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = crate::app::platform::default_log_path().and_then(|path| {
        let needs_blank = bayguard_log::prepare_log_file(&path, LogPolicy::default()).unwrap_or(false);

        if needs_blank {
            let _ = bayguard_log::write_raw_blank_line(&path);
        }
        let _ = bayguard_log::write_raw_line(&path, &bayguard_log::run_header());

        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            ),
            Err(e) => {
                eprintln!("bayguard: failed to open log file {}: {e}", path.display());
                None
            }
        }
    });

    let console_layer = verbose.then(|| fmt::layer().with_target(false).boxed());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    if verbose {
        tracing::debug!("debug logging enabled");
    }
}
