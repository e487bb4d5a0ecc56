//! Service configuration: command-line flags with environment fallbacks.
//!
//! A `.env` file in the working directory is loaded first (see
//! [`load_env_file`]), so every option can come from the flag, the process
//! environment or `.env`, in that order of precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use device_release_abi::Abi;
use device_release_gateway::{ContractSlotSource, GatewayQueryExecutor};
use device_release_slots::{Address, GET_SLOTS_ENDPOINT};
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_ABI_PATH: &str = "./blockchain-contract.abi.json";
pub const DEFAULT_GATEWAY_URL: &str = "https://devnet-gateway.multiversx.com";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Args)]
pub struct ServiceConfig {
    /// Port the HTTP service listens on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Interface the HTTP service binds to.
    #[arg(long, env = "BIND_ADDRESS", default_value_t = DEFAULT_BIND)]
    pub bind: IpAddr,

    /// Bech32 address of the release registry contract.
    #[arg(long, env = "CONTRACT_ADDRESS")]
    pub contract_address: String,

    /// Path to the contract's JSON ABI.
    #[arg(long, env = "CONTRACT_ABI_PATH", default_value = DEFAULT_ABI_PATH)]
    pub abi_path: PathBuf,

    /// Base URL of the gateway used for contract queries.
    #[arg(long, env = "GATEWAY_URL", default_value = DEFAULT_GATEWAY_URL)]
    pub gateway_url: String,

    /// Per-query timeout in seconds.
    #[arg(
        long,
        env = "QUERY_TIMEOUT_SECS",
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub query_timeout_secs: u64,
}

/// Validated configuration plus everything derived from it at startup.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ServiceConfig,
    pub contract: Address,
    pub abi: Arc<Abi>,
    pub executor: GatewayQueryExecutor,
}

/// Load `.env` from the working directory into the process environment.
///
/// Only a missing file is tolerated. dotenvy stops at the first line it
/// cannot parse, so any other failure would silently drop later settings.
pub fn load_env_file() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::EnvFile(err)),
    }
}

impl ServiceConfig {
    /// Check every option and load the ABI.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let contract =
            Address::from_bech32(&self.contract_address).map_err(ConfigError::ContractAddress)?;
        if !contract.is_smart_contract() {
            return Err(ConfigError::NotAContract(contract.to_bech32()));
        }

        let abi = Abi::from_file(&self.abi_path).map_err(|source| ConfigError::Abi {
            path: self.abi_path.clone(),
            source,
        })?;
        if abi.endpoint(GET_SLOTS_ENDPOINT).is_err() {
            return Err(ConfigError::MissingEndpoint {
                path: self.abi_path.clone(),
                endpoint: GET_SLOTS_ENDPOINT,
            });
        }

        let executor = GatewayQueryExecutor::new(&self.gateway_url, contract, self.query_timeout())
            .map_err(ConfigError::Gateway)?;
        debug!(
            contract = %contract,
            abi = %self.abi_path.display(),
            endpoint = %executor.endpoint(),
            "configuration loaded"
        );

        Ok(LoadedConfig {
            config: self.clone(),
            contract,
            abi: Arc::new(abi),
            executor,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl LoadedConfig {
    pub fn slot_source(&self) -> ContractSlotSource {
        ContractSlotSource::new(Arc::clone(&self.abi), Arc::new(self.executor.clone()))
    }
}
