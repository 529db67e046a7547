//! Line formatting for headless output.

use crate::model::{OwnerLookup, Phase, ReadState, StatusRecord};
use anyhow::Result;
use serde_json::json;

pub(crate) fn timestamp_utc() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| time::OffsetDateTime::now_utc().unix_timestamp().to_string())
}

pub(crate) fn status_text(record: &StatusRecord<'_>) -> String {
    let status = record.status;
    let label = match status.phase {
        Phase::Idle => "idle",
        Phase::Pending => "pending",
        Phase::Succeeded => "ok",
        Phase::Failed => "failed",
    };
    let mut line = format!("[{}] {label:<7}", record.timestamp_utc);
    if let Some(op) = status.operation {
        line.push_str(&format!(" {op}:"));
    }
    if !status.message.is_empty() {
        line.push(' ');
        line.push_str(&status.message);
    }
    if let Some(ttl) = record.expires_in {
        line.push_str(&format!(" (clears in {})", humantime::format_duration(ttl)));
    }
    line
}

pub(crate) fn balance_line(balance: &ReadState<u64>, json: bool) -> Result<String> {
    if json {
        let value = match balance {
            ReadState::Ready(n) => json!({ "balance": n }),
            ReadState::Loading => json!({ "balance": null }),
            ReadState::Failed(e) => json!({ "balance": null, "error": e }),
        };
        return Ok(serde_json::to_string(&value)?);
    }
    Ok(match balance {
        ReadState::Ready(n) => format!("Balance: {n}"),
        ReadState::Loading => "Balance: -".to_string(),
        ReadState::Failed(e) => format!("Balance: unavailable ({e})"),
    })
}

pub(crate) fn owner_line(lookup: &OwnerLookup, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(lookup)?);
    }
    Ok(format!("Token {} owner: {}", lookup.token_id, lookup.owner))
}
