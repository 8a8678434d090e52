// JSON report of a run, written on request.

use crate::config::NetworkConfig;
use crate::error::Result;
use crate::runner::{BatchReport, CallReceipt};
use serde::Serialize;
use serde_json::{json, Value};
use std::{fs::File, path::Path};

#[derive(Debug, Serialize)]
struct CallEntry<'a> {
    success: bool,
    #[serde(flatten)]
    receipt: Option<&'a CallReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

fn entry(result: &Result<CallReceipt>) -> CallEntry<'_> {
    match result {
        Ok(receipt) => CallEntry {
            success: true,
            receipt: Some(receipt),
            error: None,
            hint: None,
        },
        Err(e) => CallEntry {
            success: false,
            receipt: None,
            error: Some(e.to_string()),
            hint: e.hint(),
        },
    }
}

pub fn to_json(network: &NetworkConfig, report: &BatchReport) -> Result<Value> {
    let calls = report
        .results
        .iter()
        .map(|r| serde_json::to_value(entry(r)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "network": {
            "name": network.name,
            "chain_id": network.chain_id,
        },
        "amount_wei": report.amount.to_string(),
        "requested": report.requested,
        "succeeded": report.succeeded(),
        "failed": report.failed(),
        "skipped": report.skipped(),
        "calls": calls,
    }))
}

pub fn save(path: impl AsRef<Path>, network: &NetworkConfig, report: &BatchReport) -> Result<()> {
    let path = path.as_ref();
    let value = to_json(network, report)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &value)?;

    log::info!("Report saved to {}", path.display());
    Ok(())
}
