use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ProviderPreset {
    Gemini,
    Openai,
    Deepseek,
    Openrouter,
}

/// Wire format spoken by the generation backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStyle {
    /// Google Generative Language `generateContent`.
    Gemini,
    /// OpenAI-compatible `chat/completions`.
    Openai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_style")]
    pub api_style: ApiStyle,
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        let (api_style, base_url, model, api_key_env) = preset_defaults(ProviderPreset::Gemini);
        Self {
            api_style,
            base_url,
            model,
            api_key_env,
            api_key: None,
            theme: default_theme(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_api_style() -> ApiStyle {
    ApiStyle::Gemini
}

fn default_theme() -> String {
    "base16-ocean.dark".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn preset_defaults(provider: ProviderPreset) -> (ApiStyle, String, String, String) {
    match provider {
        ProviderPreset::Gemini => (
            ApiStyle::Gemini,
            "https://generativelanguage.googleapis.com/v1beta".to_string(),
            "gemini-1.5-flash".to_string(),
            "GEMINI_API_KEY".to_string(),
        ),
        ProviderPreset::Openai => (
            ApiStyle::Openai,
            "https://api.openai.com/v1/chat/completions".to_string(),
            "gpt-4o-mini".to_string(),
            "OPENAI_API_KEY".to_string(),
        ),
        ProviderPreset::Deepseek => (
            ApiStyle::Openai,
            "https://api.deepseek.com/chat/completions".to_string(),
            "deepseek-chat".to_string(),
            "DEEPSEEK_API_KEY".to_string(),
        ),
        ProviderPreset::Openrouter => (
            ApiStyle::Openai,
            "https://openrouter.ai/api/v1/chat/completions".to_string(),
            "openai/gpt-4o-mini".to_string(),
            "OPENROUTER_API_KEY".to_string(),
        ),
    }
}

pub fn apply_preset(cfg: &mut Config, provider: ProviderPreset) {
    let (api_style, base_url, model, api_key_env) = preset_defaults(provider);
    cfg.api_style = api_style;
    cfg.base_url = base_url;
    cfg.model = model;
    cfg.api_key_env = api_key_env;
}

pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Cannot resolve home directory")?;
    Ok(home.join(".codereview"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn load_config_or_default() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        let cfg = Config::default();
        save_config(&cfg)?;
        tracing::info!(path = %path.display(), "wrote default config");
        return Ok(cfg);
    }

    let text =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&text).with_context(|| format!("Invalid config: {}", path.display()))
}

pub fn parse_config(text: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(text)?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let path = config_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }

    let text = toml::to_string_pretty(cfg)?;
    fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Environment variable wins over the key stored in the config file.
pub fn resolve_api_key(cfg: &Config) -> Result<String> {
    if let Ok(v) = env::var(&cfg.api_key_env) {
        if !v.trim().is_empty() {
            return Ok(v);
        }
    }
    if let Some(v) = &cfg.api_key {
        if !v.trim().is_empty() {
            return Ok(v.clone());
        }
    }
    bail!(
        "Missing API key for model {}. Set env var {} or run `codereview config set --api-key <KEY>`.",
        cfg.model,
        cfg.api_key_env
    )
}
