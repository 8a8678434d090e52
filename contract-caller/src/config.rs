//! Network descriptor and runner settings.

use crate::error::{Result, RunnerError};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::{fs::File, path::Path, time::Duration};
use url::Url;

pub const DEFAULT_CONTRACT: &str = "0xc4cebdf3d4bbf14812dccb1ccb20ab26ea547f44";
pub const DEFAULT_AMOUNT: &str = "1.0";
pub const DEFAULT_GAS_LIMIT: u64 = 300_000;
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: Url,
    pub native_currency: NativeCurrency,
    #[serde(default)]
    pub block_explorer: Option<Url>,
}

impl NetworkConfig {
    /// OKC mainnet (chain id 66, native currency OKB).
    pub fn okc() -> Self {
        NetworkConfig {
            chain_id: 66,
            name: "OKC".to_string(),
            rpc_url: Url::parse("https://exchainrpc.okex.org").expect("static URL"),
            native_currency: NativeCurrency {
                name: "OKB".to_string(),
                symbol: "OKB".to_string(),
                decimals: 18,
            },
            block_explorer: Some(Url::parse("https://www.oklink.com/okc").expect("static URL")),
        }
    }

    /// Load a descriptor from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn tx_link(&self, tx_hash: &str) -> Option<String> {
        self.block_explorer
            .as_ref()
            .map(|base| format!("{}/tx/{}", base.as_str().trim_end_matches('/'), tx_hash))
    }
}

/// Everything one run needs apart from the signing key.
#[derive(Clone, Debug)]
pub struct RunnerConfig {
    pub network: NetworkConfig,
    pub contract: Address,
    /// Raw 4-byte selector to call instead of the ABI encoding of `fun()`.
    pub selector: Option<[u8; 4]>,
    /// Value attached to each call, in wei.
    pub amount: U256,
    pub gas_limit: U256,
    /// Pause between successful calls in batch mode.
    pub call_delay: Duration,
    /// Upper bound on the confirmation wait; `None` waits forever.
    pub confirmation_timeout: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            network: NetworkConfig::okc(),
            contract: parse_address(DEFAULT_CONTRACT).expect("static address"),
            selector: None,
            amount: U256::exp10(18),
            gas_limit: U256::from(DEFAULT_GAS_LIMIT),
            call_delay: DEFAULT_CALL_DELAY,
            confirmation_timeout: Some(DEFAULT_CONFIRMATION_TIMEOUT),
        }
    }
}

// Helper function to parse an address string without ENS resolution
pub fn parse_address(address: &str) -> Result<Address> {
    let trimmed = address.trim().trim_start_matches("0x");
    trimmed
        .parse::<Address>()
        .map_err(|e| RunnerError::Config(format!("failed to parse address {}: {}", address, e)))
}

/// Parse a decimal amount of native currency ("1.0", "0.25") into wei.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let parsed = ethers::utils::parse_units(amount.trim(), decimals as u32)?;
    Ok(parsed.into())
}

pub fn parse_selector(selector: &str) -> Result<[u8; 4]> {
    let bytes = hex::decode(selector.trim().trim_start_matches("0x"))
        .map_err(|e| RunnerError::Config(format!("invalid selector {}: {}", selector, e)))?;
    bytes
        .try_into()
        .map_err(|_| RunnerError::Config(format!("selector {} must be exactly 4 bytes", selector)))
}

/// Private keys are accepted with or without the `0x` prefix.
pub fn normalize_private_key(key: &str) -> String {
    let key = key.trim();
    if key.starts_with("0x") {
        key.to_string()
    } else {
        format!("0x{}", key)
    }
}
