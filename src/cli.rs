use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ApiStyle, ProviderPreset};

#[derive(Parser, Debug)]
#[command(name = "codereview", version, about = "AI code review web service")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web service
    Serve {
        /// Bind address (overrides config)
        #[arg(long, env = "CODEREVIEW_HOST")]
        host: Option<String>,
        /// Listen port (overrides config)
        #[arg(short, long, env = "CODEREVIEW_PORT")]
        port: Option<u16>,
    },
    /// Review a single file and print the result
    Review {
        /// Source file to review
        file: PathBuf,
        /// Language name; inferred from the file extension when omitted
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// List available highlight themes
    Themes,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write the default config
    Init,
    /// Show current config
    Show,
    /// Use a built-in provider preset
    Use {
        #[arg(value_enum)]
        provider: ProviderPreset,
    },
    /// Set config fields manually
    Set {
        #[arg(long, value_enum)]
        api_style: Option<ApiStyle>,
        #[arg(long)]
        base_url: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        api_key_env: Option<String>,
        /// Stored fallback key; an empty value clears it
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}
