use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use slotplan_core::{Constraints, DEFAULT_HORIZON_DAYS};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_slotplan_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub constraints: Constraints,
    pub planner: PlannerSection,
    pub llm: LlmSection,
    pub calendar: CalendarSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSection {
    pub horizon_days: u32,
}

impl Default for PlannerSection {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// "perplexity" or "openai"; both speak the chat-completions protocol.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "perplexity".to_string(),
            model: "sonar".to_string(),
            base_url: "https://api.perplexity.ai".to_string(),
            temperature: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSection {
    /// IANA zone the planner's wall-clock times are expressed in.
    pub timezone: String,
    /// Calendars read by `calendar pull`.
    pub calendar_ids: Vec<String>,
    /// Calendar written by `export --gcal`.
    pub target_calendar: String,
}

impl Default for CalendarSection {
    fn default() -> Self {
        Self {
            timezone: "Europe/Paris".to_string(),
            calendar_ids: vec!["primary".to_string()],
            target_calendar: "primary".to_string(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_slotplan_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).context("parse config.toml")?;
    cfg.constraints
        .validate()
        .with_context(|| format!("invalid [constraints] in {}", p.display()))?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[constraints]
max_hours_per_day = 6.0
no_sunday = false

[llm]
provider = "openai"
"#,
        )
        .unwrap();

        assert_eq!(cfg.constraints.max_hours_per_day, 6.0);
        assert!(!cfg.constraints.no_sunday);
        assert_eq!(cfg.constraints.start_hour, 8);
        assert_eq!(cfg.planner.horizon_days, DEFAULT_HORIZON_DAYS);
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.model, "sonar");
        assert_eq!(cfg.calendar.calendar_ids, vec!["primary".to_string()]);
    }

    #[test]
    fn default_config_serializes() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back, Config::default());
    }
}
