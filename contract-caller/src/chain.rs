//! Chain access used by the runner.
//!
//! `ChainClient` is the narrow set of RPC capabilities a submission needs. The
//! production implementation signs with a `LocalWallet` through ethers'
//! `SignerMiddleware` over an HTTP provider.

use crate::config::normalize_private_key;
use crate::error::{ChainError, Result};
use async_trait::async_trait;
use ethers::{
    core::types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, TransactionReceipt,
        TransactionRequest, H256, U256,
    },
    middleware::SignerMiddleware,
    providers::{Http as EthersHttp, Middleware, PendingTransaction, Provider as EthersProvider},
    signers::{LocalWallet, Signer},
};
use url::Url;

/// A single contract invocation, ready to be estimated or signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: Option<U256>,
    pub gas_price: Option<U256>,
}

impl CallRequest {
    pub fn to_transaction(&self, from: Address) -> TransactionRequest {
        let mut tx = TransactionRequest::new()
            .from(from)
            .to(self.to)
            .value(self.value)
            .data(self.data.clone());
        if let Some(gas) = self.gas_limit {
            tx = tx.gas(gas);
        }
        if let Some(gas_price) = self.gas_price {
            tx = tx.gas_price(gas_price);
        }
        tx
    }
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address of the signing account.
    fn address(&self) -> Address;

    async fn chain_id(&self) -> std::result::Result<u64, ChainError>;

    async fn balance(&self, account: Address) -> std::result::Result<U256, ChainError>;

    async fn gas_price(&self) -> std::result::Result<U256, ChainError>;

    async fn estimate_gas(&self, call: &CallRequest) -> std::result::Result<U256, ChainError>;

    /// Sign and broadcast, returning the transaction hash.
    async fn send(&self, call: &CallRequest) -> std::result::Result<H256, ChainError>;

    /// Wait for one confirmation. `None` means the transaction was dropped.
    async fn wait_for_receipt(
        &self,
        tx_hash: H256,
    ) -> std::result::Result<Option<TransactionReceipt>, ChainError>;
}

fn chain_err(err: impl std::fmt::Display) -> ChainError {
    ChainError::from_message(err.to_string())
}

pub struct EthersClient {
    client: SignerMiddleware<EthersProvider<EthersHttp>, LocalWallet>,
}

impl EthersClient {
    /// Build a signing client. The wallet is bound to `chain_id` so that a
    /// signature is never valid on another chain.
    pub fn connect(rpc_url: &Url, private_key: &str, chain_id: u64) -> Result<Self> {
        let provider = EthersProvider::new(EthersHttp::new(rpc_url.clone()));
        let wallet = normalize_private_key(private_key)
            .parse::<LocalWallet>()?
            .with_chain_id(chain_id);
        Ok(EthersClient {
            client: SignerMiddleware::new(provider, wallet),
        })
    }
}

#[async_trait]
impl ChainClient for EthersClient {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn chain_id(&self) -> std::result::Result<u64, ChainError> {
        let chain_id = self.client.get_chainid().await.map_err(chain_err)?;
        Ok(chain_id.as_u64())
    }

    async fn balance(&self, account: Address) -> std::result::Result<U256, ChainError> {
        self.client.get_balance(account, None).await.map_err(chain_err)
    }

    async fn gas_price(&self) -> std::result::Result<U256, ChainError> {
        self.client.get_gas_price().await.map_err(chain_err)
    }

    async fn estimate_gas(&self, call: &CallRequest) -> std::result::Result<U256, ChainError> {
        let tx: TypedTransaction = call.to_transaction(self.address()).into();
        self.client.estimate_gas(&tx, None).await.map_err(chain_err)
    }

    async fn send(&self, call: &CallRequest) -> std::result::Result<H256, ChainError> {
        let tx = call.to_transaction(self.address());
        let pending_tx = self.client.send_transaction(tx, None).await.map_err(chain_err)?;
        Ok(pending_tx.tx_hash())
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: H256,
    ) -> std::result::Result<Option<TransactionReceipt>, ChainError> {
        PendingTransaction::new(tx_hash, self.client.provider())
            .confirmations(1)
            .await
            .map_err(chain_err)
    }
}
