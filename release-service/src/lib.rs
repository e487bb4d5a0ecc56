//! Device release service.
//!
//! Serves the release registry over HTTP:
//!
//! - `GET /device/all`: every slot, normalized.
//! - `GET /device/latestRelease`: the highest approved version, or 404.
//! - `GET /health`: liveness.
//!
//! Every request reads the contract afresh through a
//! [`device_release_gateway::SlotSource`]; nothing is cached.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;

pub use api::ReleaseApi;
pub use config::{LoadedConfig, ServiceConfig};
pub use error::{ConfigError, ReleaseError};
