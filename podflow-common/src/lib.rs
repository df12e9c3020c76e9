//! # podflow common library
//!
//! Shared code for the podflow crates:
//! - Error type and `Result` alias
//! - TOML bootstrap configuration and secret resolution
//! - Tracing subscriber initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigOrigin, PodflowConfig};
pub use error::{Error, Result};
