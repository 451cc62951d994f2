use anyhow::{bail, Context, Result};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth;
use crate::config::LlmSection;

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

pub fn completions_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") || base.contains("perplexity.ai") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}

/// Blocking wrapper usable from inside the `#[tokio::main]` runtime.
pub fn chat_complete(config: &LlmSection, turns: &[ChatTurn], temperature: f32) -> Result<String> {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        tokio::task::block_in_place(|| handle.block_on(chat_complete_async(config, turns, temperature)))
    } else {
        let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
        rt.block_on(chat_complete_async(config, turns, temperature))
    }
}

async fn chat_complete_async(config: &LlmSection, turns: &[ChatTurn], temperature: f32) -> Result<String> {
    let key = auth::api_key()?;

    #[derive(Serialize)]
    struct Req<'a> {
        model: &'a str,
        messages: &'a [ChatTurn],
        temperature: f32,
    }

    #[derive(Deserialize)]
    struct Resp {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: MsgOut,
    }

    #[derive(Deserialize)]
    struct MsgOut {
        content: Option<String>,
    }

    let body = Req {
        model: &config.model,
        messages: turns,
        temperature,
    };

    let url = completions_url(&config.base_url);
    debug!(provider = %config.provider, %url, model = %config.model, "chat completion request");

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .header(AUTHORIZATION, format!("Bearer {key}"))
        .json(&body)
        .send()
        .await
        .with_context(|| format!("{} request", config.provider))?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("{} error: {status} {txt}", config.provider);
    }

    let out: Resp = resp
        .json()
        .await
        .with_context(|| format!("parse {} response", config.provider))?;
    let content = out
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .unwrap_or_default();

    Ok(content.trim().to_string())
}
