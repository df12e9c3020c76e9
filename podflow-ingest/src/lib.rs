//! podflow-ingest library interface
//!
//! Exposes the pipeline components and collaborator backends for the
//! `podflow-ingest` binary and for integration testing.

pub mod backends;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{IngestError, IngestResult};
pub use crate::services::{EpisodeDirectory, PipelineOrchestrator, PipelineSettings};

/// Git commit hash captured at build time
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Build timestamp (RFC 3339)
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");

/// Cargo profile the binary was built with
pub const BUILD_PROFILE: &str = env!("BUILD_PROFILE");

/// `--version` text: package version plus the build identification above
pub const LONG_VERSION: &str = env!("LONG_VERSION");
