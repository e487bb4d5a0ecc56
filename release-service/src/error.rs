use std::path::PathBuf;

use device_release_abi::AbiError;
use device_release_gateway::QueryError;
use device_release_slots::AddressError;
use thiserror::Error;

/// Startup failures. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid contract address: {0}")]
    ContractAddress(#[source] AddressError),

    #[error("contract address {0} is not a smart contract")]
    NotAContract(String),

    #[error("failed to load contract ABI from {path}: {source}")]
    Abi { path: PathBuf, source: AbiError },

    #[error("contract ABI at {path} does not declare the {endpoint} endpoint")]
    MissingEndpoint { path: PathBuf, endpoint: &'static str },

    #[error("invalid gateway configuration: {0}")]
    Gateway(#[source] QueryError),

    #[error("failed to load .env file: {0}")]
    EnvFile(#[source] dotenvy::Error),
}

/// Outcomes of a release lookup that are not a record.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// The query, the network or the decoder failed.
    #[error("upstream query failed: {0}")]
    Upstream(#[from] QueryError),

    /// The lookup worked but nothing is approved yet.
    #[error("no approved release found")]
    NoApprovedRelease,
}

impl ReleaseError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Upstream(_) => 500,
            Self::NoApprovedRelease => 404,
        }
    }

    /// Message safe to hand to API clients.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Upstream(_) => "Failed to decode contract response",
            Self::NoApprovedRelease => "No approved releases found",
        }
    }
}
