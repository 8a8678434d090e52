//! Sign and submit payable calls to the DYOR contract, once or in a paced batch.

pub mod chain;
pub mod config;
pub mod contract;
pub mod error;
pub mod report;
pub mod runner;

pub use chain::{CallRequest, ChainClient, EthersClient};
pub use config::{NativeCurrency, NetworkConfig, RunnerConfig};
pub use error::{ChainError, ChainErrorKind, Result, RunnerError};
pub use runner::{BatchReport, CallReceipt, Runner};
