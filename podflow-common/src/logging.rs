//! Tracing subscriber initialisation
//!
//! `RUST_LOG` wins over the configured level. When a log file is configured a
//! second, non-ANSI layer appends to it.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the env filter: `RUST_LOG` if set, otherwise `<crate>=<level>`
pub fn build_filter(config: &LoggingConfig, crate_target: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", crate_target, config.level)))
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &LoggingConfig, crate_target: &str) -> Result<()> {
    let file_layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| Error::Io {
                    path: path.clone(),
                    source,
                })?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(build_filter(config, crate_target))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Internal(format!("Tracing already initialised: {}", e)))
}
