use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use slotplan_core::{BlockKey, ExportedBlock};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub fn slotplan_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".slotplan"))
}

pub fn ensure_slotplan_home() -> Result<PathBuf> {
    let dir = slotplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn tasks_path() -> Result<PathBuf> {
    Ok(ensure_slotplan_home()?.join("tasks.json"))
}

/// Cached calendar events written by `calendar pull`.
pub fn events_cache_path() -> Result<PathBuf> {
    Ok(ensure_slotplan_home()?.join("events.json"))
}

pub fn ledger_path() -> Result<PathBuf> {
    Ok(ensure_slotplan_home()?.join("exported.json"))
}

/// A JSON state file, or `None` when it has not been written yet.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(value))
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))
}

/// One trimmed line from stdin.
pub fn prompt_line(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin().read_line(&mut line).context("reading stdin")?;
    Ok(line.trim().to_string())
}

/// Blocks already pushed to a calendar.
pub fn read_ledger(path: &Path) -> Result<Vec<ExportedBlock>> {
    Ok(read_json(path)?.unwrap_or_default())
}

pub fn write_ledger(path: &Path, blocks: &[ExportedBlock]) -> Result<()> {
    write_json(path, blocks)
}

pub fn ledger_keys(blocks: &[ExportedBlock]) -> HashSet<BlockKey> {
    blocks.iter().map(|b| b.key.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn ledger_survives_write_and_read() {
        let path = std::env::temp_dir().join(format!("slotplan-ledger-{}.json", std::process::id()));
        let block = ExportedBlock {
            key: BlockKey("abc_2026-03-02_08:00:00".into()),
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            title: "Essay".into(),
        };
        write_ledger(&path, std::slice::from_ref(&block)).unwrap();
        let back = read_ledger(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(back, vec![block]);
        assert!(ledger_keys(&back).contains(&BlockKey("abc_2026-03-02_08:00:00".into())));
    }

    #[test]
    fn missing_ledger_is_empty() {
        let path = std::env::temp_dir().join("slotplan-ledger-does-not-exist.json");
        assert!(read_ledger(&path).unwrap().is_empty());
    }

    #[test]
    fn unparsable_state_file_names_the_path() {
        let path = std::env::temp_dir().join(format!("slotplan-bad-{}.json", std::process::id()));
        fs::write(&path, "{not json").unwrap();
        let err = read_ledger(&path).unwrap_err();
        fs::remove_file(&path).ok();

        assert!(format!("{err:#}").contains("slotplan-bad-"));
    }
}
