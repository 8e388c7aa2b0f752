use std::path::Path;

use anyhow::Result;
use eventica_core::config::{Backend, EventicaConfig};
use owo_colors::OwoColorize;

pub fn run(config: &EventicaConfig, explicit_path: Option<&Path>) -> Result<()> {
    let config_path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => EventicaConfig::config_path()?,
    };

    let store_path = match config.backend {
        Backend::Json => config.events_path(),
        Backend::Sqlite => config.database_path(),
    };

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Events:  {}", store_path.display());
    println!();

    let mut shown = config.clone();
    if shown.admin_token.is_some() {
        shown.admin_token = Some("<redacted>".to_string());
    }

    println!("{}", "Effective settings".bold());
    for line in shown.to_toml()?.lines() {
        println!("  {}", line);
    }

    Ok(())
}
