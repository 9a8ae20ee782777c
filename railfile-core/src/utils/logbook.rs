// src/utils/logbook.rs
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::{fs, io::Write, path::Path};

/// Append one `{"ts", "event", "data"}` line to the JSONL logbook at `path`.
pub fn emit_event(path: &Path, event: &str, data: Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create_dir_all({:?})", parent))?;
    }
    let line = serde_json::json!({
        "ts": Utc::now().to_rfc3339(),
        "event": event,
        "data": data
    });
    let json = serde_json::to_string(&line)?;
    let mut f = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open logbook {:?}", path))?;
    writeln!(f, "{}", json)?;
    Ok(())
}

/// Read back every event in the logbook, skipping lines that do not parse.
pub fn read_events(path: &Path) -> Result<Vec<Value>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(path).with_context(|| format!("read logbook {:?}", path))?;
    Ok(text
        .lines()
        .filter_map(|l| serde_json::from_str::<Value>(l).ok())
        .collect())
}
