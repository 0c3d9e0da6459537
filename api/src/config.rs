//! Application configuration read from the environment.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::abi::AbiError;
use crate::abi::ContractInterface;
use crate::abi::LedgerAbi;
use crate::abi::DEFAULT_DESCRIPTOR;
use crate::address::Address;
use crate::address::ParseAddressError;

pub const CONTRACT_ADDRESS_VAR: &str = "LEDGER_CONTRACT_ADDRESS";
pub const CONTRACT_ABI_VAR: &str = "LEDGER_CONTRACT_ABI";
pub const GIPHY_API_KEY_VAR: &str = "GIPHY_API_KEY";
pub const RPC_URL_VAR: &str = "LEDGER_RPC_URL";
pub const EXPLORER_URL_VAR: &str = "EXPLORER_URL";
pub const POLL_INTERVAL_VAR: &str = "LEDGER_POLL_INTERVAL_MS";

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
const DEFAULT_EXPLORER_URL: &str = "https://sepolia.etherscan.io";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("LEDGER_CONTRACT_ADDRESS is not set")]
    MissingContractAddress,
    #[error("LEDGER_CONTRACT_ADDRESS is invalid: {0}")]
    InvalidContractAddress(#[from] ParseAddressError),
    #[error("cannot read contract interface from {path}: {source}")]
    AbiUnreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("contract interface is unusable: {0}")]
    InvalidAbi(#[from] AbiError),
    #[error("LEDGER_POLL_INTERVAL_MS must be a positive number of milliseconds, got {0:?}")]
    InvalidPollInterval(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub contract_address: Address,
    pub ledger_abi: LedgerAbi,
    /// GIF enrichment is disabled when absent.
    pub giphy_api_key: Option<String>,
    pub rpc_url: String,
    pub explorer_url: String,
    pub poll_interval: Duration,
}

impl AppConfig {
    /// Reads configuration from environment variables.
    ///
    /// Each variable is looked up at runtime first and then in the values
    /// baked in at compile time, which is the only source a browser build has.
    ///
    /// # Environment Variables
    /// - `LEDGER_CONTRACT_ADDRESS`: required.
    /// - `LEDGER_CONTRACT_ABI`: path to an ABI JSON file, or the JSON itself.
    ///   The bundled descriptor is used when unset.
    /// - `GIPHY_API_KEY`: optional.
    /// - `LEDGER_RPC_URL`: node URL for native builds.
    /// - `EXPLORER_URL`: block explorer used for links.
    /// - `LEDGER_POLL_INTERVAL_MS`: receipt polling interval.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok().or_else(|| compiled_in(key)))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let contract_address: Address = var(CONTRACT_ADDRESS_VAR)
            .ok_or(ConfigError::MissingContractAddress)?
            .trim()
            .parse()?;

        let interface = match var(CONTRACT_ABI_VAR) {
            Some(source) => load_interface(&source)?,
            None => ContractInterface::from_json(DEFAULT_DESCRIPTOR)?,
        };
        let ledger_abi = LedgerAbi::from_interface(&interface)?;

        let giphy_api_key = var(GIPHY_API_KEY_VAR);
        if giphy_api_key.is_none() {
            dioxus_logger::tracing::warn!(
                "{} is not set; transfer cards will use the fallback image",
                GIPHY_API_KEY_VAR
            );
        }

        let poll_interval = match var(POLL_INTERVAL_VAR) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => return Err(ConfigError::InvalidPollInterval(raw)),
            },
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            contract_address,
            ledger_abi,
            giphy_api_key,
            rpc_url: var(RPC_URL_VAR).unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            explorer_url: var(EXPLORER_URL_VAR)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_EXPLORER_URL.to_string()),
            poll_interval,
        })
    }

    pub fn explorer_address_url(&self, address: &Address) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}

/// Inline JSON is accepted so browser builds can bake the descriptor in.
fn load_interface(source: &str) -> Result<ContractInterface, ConfigError> {
    let trimmed = source.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Ok(ContractInterface::from_json(trimmed)?);
    }
    let json = std::fs::read_to_string(source).map_err(|source_err| ConfigError::AbiUnreadable {
        path: source.to_string(),
        source: source_err,
    })?;
    Ok(ContractInterface::from_json(&json)?)
}

fn compiled_in(key: &str) -> Option<String> {
    let value = match key {
        CONTRACT_ADDRESS_VAR => option_env!("LEDGER_CONTRACT_ADDRESS"),
        CONTRACT_ABI_VAR => option_env!("LEDGER_CONTRACT_ABI"),
        GIPHY_API_KEY_VAR => option_env!("GIPHY_API_KEY"),
        RPC_URL_VAR => option_env!("LEDGER_RPC_URL"),
        EXPLORER_URL_VAR => option_env!("EXPLORER_URL"),
        POLL_INTERVAL_VAR => option_env!("LEDGER_POLL_INTERVAL_MS"),
        _ => None,
    };
    value.map(str::to_string)
}
