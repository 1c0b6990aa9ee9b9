use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use crate::config::Config;
use crate::llm::HttpGenerator;
use crate::review::Reviewer;

pub async fn run_review(cfg: &Config, file: &Path, language: Option<String>) -> Result<()> {
    if !file.exists() {
        bail!("File does not exist: {}", file.display());
    }
    let code =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let language = language.unwrap_or_else(|| language_for_path(file));

    let reviewer = Reviewer::new(Arc::new(HttpGenerator::from_config(cfg)?));
    tracing::info!(file = %file.display(), %language, "reviewing file");
    let answer = reviewer.review(&code, &language).await;

    println!("{answer}");
    Ok(())
}

fn language_for_path(file: &Path) -> String {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    match ext.as_str() {
        "py" | "pyw" => "python".to_string(),
        "h" => "c".to_string(),
        "cc" | "cxx" | "hpp" | "hh" | "hxx" => "cpp".to_string(),
        "" => "text".to_string(),
        _ => ext,
    }
}
