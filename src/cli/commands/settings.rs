//! Config file command.

use anyhow::Context;

use crate::config;

/// Print the config file location and contents, optionally creating it
pub fn cmd_config(init: bool) -> anyhow::Result<()> {
    let path = config::config_path().context("Could not determine config directory")?;

    if init && !path.exists() {
        config::save(&config::Config::default())?;
        println!("Created {}", path.display());
    }

    let current = config::load();
    println!("# {}", path.display());
    if !path.exists() {
        println!("# (file does not exist, showing defaults; use --init to create it)");
    }
    print!("{}", toml::to_string_pretty(&current)?);
    Ok(())
}
