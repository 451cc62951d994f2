use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::state::{ensure_slotplan_home, prompt_line, read_json, write_json};

pub const API_KEY_ENV: &str = "SLOTPLAN_API_KEY";

/// Contents of `~/.slotplan/auth.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

fn credentials_path() -> Result<PathBuf> {
    Ok(ensure_slotplan_home()?.join("auth.json"))
}

fn check_key(key: &str) -> Result<&str> {
    let key = key.trim();
    if key.len() < 8 || key.contains(char::is_whitespace) {
        bail!("that does not look like an API key");
    }
    Ok(key)
}

/// First non-blank candidate, env before file.
fn pick_key(from_env: Option<String>, stored: Option<String>) -> Option<String> {
    [from_env, stored]
        .into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
}

pub fn set_key() -> Result<()> {
    let entered = prompt_line("Paste LLM API key")?;
    let key = check_key(&entered)?;

    let path = credentials_path()?;
    let mut creds: StoredCredentials = read_json(&path)?.unwrap_or_default();
    creds.api_key = Some(key.to_string());
    write_json(&path, &creds)?;

    println!("Saved API key to {}", path.display());
    Ok(())
}

pub fn api_key() -> Result<String> {
    let stored: Option<StoredCredentials> = read_json(&credentials_path()?)?;
    pick_key(std::env::var(API_KEY_ENV).ok(), stored.and_then(|c| c.api_key)).with_context(
        || format!("no API key configured; set {API_KEY_ENV} or run: slotplan auth set-key"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_key_wins_unless_blank() {
        let stored = Some("sk-stored-123".to_string());
        assert_eq!(
            pick_key(Some(" sk-env-456 ".into()), stored.clone()).as_deref(),
            Some("sk-env-456")
        );
        assert_eq!(pick_key(Some("  ".into()), stored).as_deref(), Some("sk-stored-123"));
        assert_eq!(pick_key(None, None), None);
    }

    #[test]
    fn short_or_spaced_keys_are_refused() {
        assert!(check_key("abc").is_err());
        assert!(check_key("sk-abc def-123").is_err());
        assert_eq!(check_key("  pplx-0123456789\n").unwrap(), "pplx-0123456789");
    }

    #[test]
    fn credentials_file_omits_missing_key() {
        let json = serde_json::to_string(&StoredCredentials::default()).unwrap();
        assert_eq!(json, "{}");
        let back: StoredCredentials = serde_json::from_str(r#"{"api_key":"sk-1234567"}"#).unwrap();
        assert_eq!(back.api_key.as_deref(), Some("sk-1234567"));
    }
}
