use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use thiserror::Error;

use crate::config::{ApiStyle, Config, resolve_api_key};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("invalid JSON response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    #[error("response contained no text ({0})")]
    EmptyResponse(String),
}

/// Text generation backend. The review path only ever sees this trait.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

pub struct HttpGenerator {
    client: Client,
    api_style: ApiStyle,
    base_url: String,
    model: String,
    api_key: String,
}

impl HttpGenerator {
    /// Resolves the credential up front so a missing key fails at startup.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let api_key = resolve_api_key(cfg)?;
        let client = Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            api_style: cfg.api_style,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        match self.api_style {
            ApiStyle::Gemini => format!("{}/models/{}:generateContent", self.base_url, self.model),
            ApiStyle::Openai => self.base_url.clone(),
        }
    }

    fn request_body(&self, prompt: &str) -> Value {
        match self.api_style {
            ApiStyle::Gemini => json!({
                "contents": [{"role": "user", "parts": [{"text": prompt}]}]
            }),
            ApiStyle::Openai => json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}]
            }),
        }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = self.endpoint();
        let req = self.client.post(&url).json(&self.request_body(prompt));
        let req = match self.api_style {
            ApiStyle::Gemini => req.header("x-goog-api-key", &self.api_key),
            ApiStyle::Openai => req.bearer_auth(&self.api_key),
        };

        tracing::debug!(%url, model = %self.model, "sending generation request");
        let resp = req.send().await.map_err(|source| GenerateError::Request {
            url: url.clone(),
            source,
        })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|source| GenerateError::Request { url, source })?;
        if !status.is_success() {
            return Err(GenerateError::Api { status, body: text });
        }

        let val: Value = serde_json::from_str(&text)?;
        match self.api_style {
            ApiStyle::Gemini => extract_gemini_text(&val),
            ApiStyle::Openai => extract_chat_content(&val)
                .ok_or_else(|| GenerateError::EmptyResponse("no message content".to_string())),
        }
    }
}

fn extract_gemini_text(value: &Value) -> Result<String, GenerateError> {
    let Some(candidate) = value
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
    else {
        let reason = value
            .get("promptFeedback")
            .and_then(|f| f.get("blockReason"))
            .and_then(|r| r.as_str())
            .map(|r| format!("prompt blocked: {r}"))
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(GenerateError::EmptyResponse(reason));
    };

    let parts = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array());
    let mut out = String::new();
    for part in parts.into_iter().flatten() {
        if let Some(t) = part.get("text").and_then(|t| t.as_str()) {
            out.push_str(t);
        }
    }
    if out.is_empty() {
        let reason = candidate
            .get("finishReason")
            .and_then(|r| r.as_str())
            .map(|r| format!("finish reason: {r}"))
            .unwrap_or_else(|| "candidate has no text parts".to_string());
        return Err(GenerateError::EmptyResponse(reason));
    }
    Ok(out)
}

fn extract_chat_content(value: &Value) -> Option<String> {
    let content = value.get("choices")?.get(0)?.get("message")?.get("content")?;

    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => {
            let mut out = String::new();
            for item in items {
                if item.get("type").and_then(|t| t.as_str()) == Some("text")
                    && let Some(t) = item.get("text").and_then(|t| t.as_str())
                {
                    out.push_str(t);
                }
            }
            if out.is_empty() { None } else { Some(out) }
        }
        _ => None,
    }
}
