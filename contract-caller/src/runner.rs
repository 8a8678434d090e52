// Transaction runner: validate, estimate, submit, confirm, report.

use crate::chain::{CallRequest, ChainClient};
use crate::config::RunnerConfig;
use crate::contract::DyorContract;
use crate::error::{Result, RunnerError};
use ethers::{
    types::{Bytes, TransactionReceipt, H256, U256},
    utils::format_units,
};
use log::{error, info, warn};
use serde::Serialize;
use tokio::time;

/// Outcome of a confirmed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallReceipt {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
    /// Balance read after confirmation; `None` if that read failed.
    pub balance_after: Option<U256>,
}

/// Results of a batch run, in submission order.
#[derive(Debug)]
pub struct BatchReport {
    pub requested: usize,
    pub amount: U256,
    pub results: Vec<Result<CallReceipt>>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// Iterations never started because an earlier one failed.
    pub fn skipped(&self) -> usize {
        self.requested - self.attempted()
    }

    pub fn is_success(&self) -> bool {
        self.succeeded() == self.requested
    }
}

pub struct Runner<C> {
    client: C,
    config: RunnerConfig,
    calldata: Bytes,
}

impl<C: ChainClient> Runner<C> {
    pub fn new(client: C, config: RunnerConfig) -> Result<Self> {
        let calldata = DyorContract::new()?.fun_calldata(config.selector)?;
        Ok(Runner {
            client,
            config,
            calldata,
        })
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Submit one call carrying the configured amount.
    pub async fn submit_once(&self) -> Result<CallReceipt> {
        self.submit(self.config.amount).await
    }

    /// Submit one call carrying `amount` wei. Failures are logged and returned, never raised.
    pub async fn submit(&self, amount: U256) -> Result<CallReceipt> {
        match self.try_submit(amount).await {
            Ok(receipt) => Ok(receipt),
            Err(e) => {
                error!("Transaction failed: {}", e);
                if let Some(hint) = e.hint() {
                    warn!("Hint: {}", hint);
                }
                Err(e)
            }
        }
    }

    /// Submit `count` calls one after another, pausing between successes and
    /// stopping at the first failure.
    pub async fn submit_many(&self, amount: U256, count: usize) -> BatchReport {
        info!(
            "Starting batch of {} calls, {} {} each",
            count,
            self.display_amount(amount),
            self.config.network.native_currency.symbol
        );

        let mut results = Vec::with_capacity(count);
        for i in 0..count {
            info!("--- Call {}/{} ---", i + 1, count);
            let result = self.submit(amount).await;
            let failed = result.is_err();
            results.push(result);

            if failed {
                warn!("Batch interrupted after call {}/{}", i + 1, count);
                break;
            }

            if i + 1 < count {
                info!("Waiting {:?} before the next call...", self.config.call_delay);
                time::sleep(self.config.call_delay).await;
            }
        }

        let report = BatchReport {
            requested: count,
            amount,
            results,
        };
        info!("Batch summary:");
        info!("  Succeeded: {}/{}", report.succeeded(), report.requested);
        info!("  Failed: {}/{}", report.failed(), report.requested);
        if report.skipped() > 0 {
            info!("  Skipped: {}/{}", report.skipped(), report.requested);
        }
        report
    }

    async fn try_submit(&self, amount: U256) -> Result<CallReceipt> {
        let network = &self.config.network;
        let symbol = &network.native_currency.symbol;
        let account = self.client.address();
        info!("Wallet address: {:?}", account);

        let chain_id = self.client.chain_id().await?;
        info!("Connected to {} (chain ID: {})", network.name, chain_id);
        if chain_id != network.chain_id {
            return Err(RunnerError::WrongNetwork {
                name: network.name.clone(),
                expected: network.chain_id,
                actual: chain_id,
            });
        }

        let balance = self.client.balance(account).await?;
        info!("Balance: {} {}", self.display_amount(balance), symbol);
        if balance < amount {
            return Err(RunnerError::InsufficientFunds {
                balance,
                required: amount,
            });
        }

        let gas_price = self.client.gas_price().await?;
        let mut call = CallRequest {
            to: self.config.contract,
            data: self.calldata.clone(),
            value: amount,
            gas_limit: None,
            gas_price: None,
        };

        info!("Transaction parameters:");
        info!("  Contract: {:?}", call.to);
        info!("  Selector: 0x{}", hex::encode(self.calldata.get(..4).unwrap_or_default()));
        info!("  Value: {} {}", self.display_amount(amount), symbol);
        info!("  Gas price: {} Gwei", display_units(gas_price, 9));
        info!("  Gas limit: {}", self.config.gas_limit);

        let estimated_gas = self.client.estimate_gas(&call).await?;
        info!("Estimated gas: {}", estimated_gas);
        if estimated_gas > self.config.gas_limit {
            warn!(
                "Estimate {} exceeds the gas limit {}; the call may run out of gas",
                estimated_gas, self.config.gas_limit
            );
        }

        call.gas_limit = Some(self.config.gas_limit);
        call.gas_price = Some(gas_price);

        info!("Sending transaction...");
        let tx_hash = self.client.send(&call).await?;
        info!("Transaction hash: {:?}", tx_hash);
        if let Some(link) = network.tx_link(&format!("{:?}", tx_hash)) {
            info!("Explorer: {}", link);
        }

        info!("Waiting for confirmation...");
        let receipt = self.confirm(tx_hash).await?;
        let block_number = receipt.block_number.map(|n| n.as_u64());

        if receipt.status.map(|s| s.as_u64()) == Some(0) {
            return Err(RunnerError::Reverted {
                tx_hash,
                block_number: receipt.block_number,
            });
        }

        info!("Transaction confirmed");
        info!("  Hash: {:?}", receipt.transaction_hash);
        info!("  Block: {}", block_number.map_or_else(|| "pending".to_string(), |n| n.to_string()));
        info!(
            "  Gas used: {}",
            receipt.gas_used.map_or_else(|| "unknown".to_string(), |g| g.to_string())
        );

        let balance_after = match self.client.balance(account).await {
            Ok(balance) => {
                info!("Balance after: {} {}", self.display_amount(balance), symbol);
                Some(balance)
            }
            Err(e) => {
                warn!("Could not read balance after confirmation: {}", e);
                None
            }
        };

        Ok(CallReceipt {
            tx_hash: receipt.transaction_hash,
            block_number,
            gas_used: receipt.gas_used,
            balance_after,
        })
    }

    async fn confirm(&self, tx_hash: H256) -> Result<TransactionReceipt> {
        let receipt = match self.config.confirmation_timeout {
            Some(limit) => time::timeout(limit, self.client.wait_for_receipt(tx_hash))
                .await
                .map_err(|_| RunnerError::Timeout(limit))??,
            None => self.client.wait_for_receipt(tx_hash).await?,
        };
        receipt.ok_or(RunnerError::Dropped(tx_hash))
    }

    fn display_amount(&self, wei: U256) -> String {
        display_units(wei, self.config.network.native_currency.decimals as u32)
    }
}

fn display_units(value: U256, decimals: u32) -> String {
    format_units(value, decimals).unwrap_or_else(|_| value.to_string())
}
