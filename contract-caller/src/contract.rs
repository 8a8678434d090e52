//! ABI of the DYOR contract and calldata for its payable entry point.

use crate::error::{Result, RunnerError};
use ethers::{
    abi::{parse_abi, Abi},
    contract::BaseContract,
    types::Bytes,
};

const DYOR_ABI: &[&str] = &[
    "function fun() payable",
    "function balanceOf(address account) view returns (uint256)",
    "function transfer(address to, uint256 value) returns (bool)",
];

pub struct DyorContract {
    base: BaseContract,
}

impl DyorContract {
    pub fn new() -> Result<Self> {
        let abi: Abi = parse_abi(DYOR_ABI)
            .map_err(|e| RunnerError::Config(format!("failed to parse contract ABI: {}", e)))?;
        Ok(DyorContract {
            base: BaseContract::from(abi),
        })
    }

    /// Calldata for `fun()`, or the bare selector when one is forced.
    pub fn fun_calldata(&self, selector: Option<[u8; 4]>) -> Result<Bytes> {
        match selector {
            Some(selector) => Ok(Bytes::from(selector.to_vec())),
            None => self
                .base
                .encode("fun", ())
                .map_err(|e| RunnerError::Config(format!("failed to encode fun(): {}", e))),
        }
    }

    pub fn abi(&self) -> &Abi {
        self.base.abi()
    }
}
