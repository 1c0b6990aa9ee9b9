mod cli;
mod commands;
mod config;
mod highlight;
mod llm;
mod prompt;
mod review;
mod server;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Commands};
use crate::commands::{handle_config, run_review};
use crate::config::load_config_or_default;
use crate::highlight::theme_names;
use crate::server::run_server;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "codereview=debug,tower_http=debug"
    } else {
        "codereview=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let cfg = load_config_or_default()?;
            let host = host.unwrap_or_else(|| cfg.host.clone());
            let port = port.unwrap_or(cfg.port);
            run_server(&cfg, &host, port).await?;
        }
        Commands::Review { file, language } => {
            let cfg = load_config_or_default()?;
            run_review(&cfg, &file, language).await?;
        }
        Commands::Config { command } => handle_config(command)?,
        Commands::Themes => {
            for name in theme_names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}
