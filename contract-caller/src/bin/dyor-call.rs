// src/bin/dyor-call.rs for contract-caller

use clap::{Parser, Subcommand};
use contract_caller::{
    config::{self, DEFAULT_AMOUNT, DEFAULT_CONTRACT, DEFAULT_GAS_LIMIT},
    report, BatchReport, EthersClient, NetworkConfig, Runner, RunnerConfig,
};
use dotenv::dotenv;
use ethers::types::U256;
use log::info;
use std::{path::PathBuf, time::Duration};
use url::Url;

// CLI argument parsing
#[derive(Parser, Debug)]
#[command(author, version, about = "Call the DYOR contract's payable fun() with native currency attached", long_about = None)]
struct Cli {
    /// Private key of the paying account (hex, 0x prefix optional)
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    private_key: String,

    /// JSON file describing the target network (defaults to OKC mainnet)
    #[arg(global = true, long)]
    network: Option<PathBuf>,

    /// RPC endpoint URL, overriding the one from the network description
    #[arg(global = true, short = 'u', long)]
    rpc_url: Option<Url>,

    /// Contract to call
    #[arg(global = true, long, default_value = DEFAULT_CONTRACT)]
    contract: String,

    /// Native currency attached to a single call (batch takes its own amount)
    #[arg(global = true, short = 'a', long, default_value = DEFAULT_AMOUNT)]
    amount: String,

    /// Gas limit for each call
    #[arg(global = true, long, default_value_t = DEFAULT_GAS_LIMIT)]
    gas_limit: u64,

    /// Seconds to wait between calls in batch mode
    #[arg(global = true, long, default_value_t = 5)]
    delay_secs: u64,

    /// Seconds to wait for a confirmation (0 = wait forever)
    #[arg(global = true, long, default_value_t = 180)]
    timeout_secs: u64,

    /// Raw 4-byte function selector to call instead of fun()
    #[arg(global = true, long)]
    selector: Option<String>,

    /// Write a JSON report of the run to this file
    #[arg(global = true, long)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Call repeatedly, stopping at the first failure (e.g. `batch 1.0 5`)
    Batch {
        /// Native currency attached to every call
        amount: String,

        /// Number of calls
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
}

impl Cli {
    fn runner_config(&self) -> contract_caller::Result<RunnerConfig> {
        let mut network = match &self.network {
            Some(path) => NetworkConfig::from_file(path)?,
            None => NetworkConfig::okc(),
        };
        if let Some(rpc_url) = &self.rpc_url {
            network.rpc_url = rpc_url.clone();
        }

        let decimals = network.native_currency.decimals;
        Ok(RunnerConfig {
            contract: config::parse_address(&self.contract)?,
            selector: self.selector.as_deref().map(config::parse_selector).transpose()?,
            amount: config::parse_amount(&self.amount, decimals)?,
            gas_limit: U256::from(self.gas_limit),
            call_delay: Duration::from_secs(self.delay_secs),
            confirmation_timeout: match self.timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            network,
        })
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.runner_config()?;

    info!("DYOR contract caller");
    info!("{}", "=".repeat(50));

    let client = EthersClient::connect(
        &config.network.rpc_url,
        &cli.private_key,
        config.network.chain_id,
    )?;
    let network = config.network.clone();
    let runner = Runner::new(client, config)?;

    let report = match &cli.command {
        None => BatchReport {
            requested: 1,
            amount: runner.config().amount,
            results: vec![runner.submit_once().await],
        },
        Some(Command::Batch { amount, count }) => {
            let amount = config::parse_amount(amount, network.native_currency.decimals)?;
            runner.submit_many(amount, *count as usize).await
        }
    };

    if let Some(path) = &cli.report {
        report::save(path, &network, &report)?;
    }

    if !report.is_success() {
        eyre::bail!(
            "{} of {} calls did not succeed",
            report.requested - report.succeeded(),
            report.requested
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn no_arguments_means_single_call() {
        let cli = Cli::try_parse_from(["dyor-call", "--private-key", KEY]).unwrap();
        assert_eq!(cli.command, None);

        let config = cli.runner_config().unwrap();
        assert_eq!(config.network.chain_id, 66);
        assert_eq!(config.amount, U256::exp10(18));
        assert_eq!(config.confirmation_timeout, Some(Duration::from_secs(180)));
        assert_eq!(config.selector, None);
    }

    #[test]
    fn batch_takes_amount_and_count() {
        let cli =
            Cli::try_parse_from(["dyor-call", "--private-key", KEY, "batch", "1.0", "5"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Batch {
                amount: "1.0".to_string(),
                count: 5
            })
        );
    }

    #[test]
    fn anything_else_is_rejected() {
        assert!(Cli::try_parse_from(["dyor-call", "--private-key", KEY, "batch", "1.0"]).is_err());
        assert!(Cli::try_parse_from(["dyor-call", "--private-key", KEY, "batch", "1.0", "0"]).is_err());
        assert!(Cli::try_parse_from(["dyor-call", "--private-key", KEY, "loop"]).is_err());
    }

    #[test]
    fn options_may_follow_the_batch_subcommand() {
        let cli = Cli::try_parse_from([
            "dyor-call",
            "--private-key",
            KEY,
            "batch",
            "1.0",
            "5",
            "--delay-secs",
            "2",
            "--gas-limit",
            "400000",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Batch { count: 5, .. })));

        let config = cli.runner_config().unwrap();
        assert_eq!(config.call_delay, Duration::from_secs(2));
        assert_eq!(config.gas_limit, U256::from(400_000u64));
    }

    #[test]
    fn options_shape_the_config() {
        let cli = Cli::try_parse_from([
            "dyor-call",
            "--private-key",
            KEY,
            "--rpc-url",
            "http://localhost:8545",
            "--gas-limit",
            "500000",
            "--timeout-secs",
            "0",
            "--selector",
            "0x51b401a0",
            "--amount",
            "0.1",
        ])
        .unwrap();

        let config = cli.runner_config().unwrap();
        assert_eq!(config.network.rpc_url.as_str(), "http://localhost:8545/");
        assert_eq!(config.gas_limit, U256::from(500_000u64));
        assert_eq!(config.confirmation_timeout, None);
        assert_eq!(config.selector, Some([0x51, 0xb4, 0x01, 0xa0]));
        assert_eq!(config.amount, U256::exp10(17));
    }
}
