use anyhow::Result;

use crate::cli::ConfigCommand;
use crate::config::{Config, apply_preset, config_path, load_config_or_default, save_config};
use crate::highlight::Highlighter;

pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init => {
            let cfg = Config::default();
            save_config(&cfg)?;
            println!("Initialized config at {}", config_path()?.display());
        }
        ConfigCommand::Show => {
            let cfg = load_config_or_default()?;
            println!("{}", toml::to_string_pretty(&cfg)?);
            println!("Config path: {}", config_path()?.display());
        }
        ConfigCommand::Use { provider } => {
            let mut cfg = load_config_or_default()?;
            apply_preset(&mut cfg, provider);
            save_config(&cfg)?;
            println!("Switched provider preset: {provider:?}");
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigCommand::Set {
            api_style,
            base_url,
            model,
            api_key_env,
            api_key,
            theme,
            host,
            port,
        } => {
            let mut cfg = load_config_or_default()?;
            if let Some(v) = api_style {
                cfg.api_style = v;
            }
            if let Some(v) = base_url {
                cfg.base_url = v;
            }
            if let Some(v) = model {
                cfg.model = v;
            }
            if let Some(v) = api_key_env {
                cfg.api_key_env = v;
            }
            if let Some(v) = api_key {
                cfg.api_key = if v.trim().is_empty() { None } else { Some(v) };
            }
            if let Some(v) = theme {
                // Fails on unknown theme names.
                Highlighter::new(&v)?;
                cfg.theme = v;
            }
            if let Some(v) = host {
                cfg.host = v;
            }
            if let Some(v) = port {
                cfg.port = v;
            }
            save_config(&cfg)?;
            println!("Config updated:");
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
    }

    Ok(())
}
