// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - shows the effective configuration or its file location

use anyhow::Result;
use clap::Subcommand;
use pathyard::config::{self, Config};
use std::path::Path;

/// Config actions
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file location
    Path,
}

/// Run the config command
pub fn run(action: ConfigAction, config: &Config, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => print!("{}", config::to_toml(config)?),
        ConfigAction::Path => match explicit.map(Path::to_path_buf).or_else(config::default_path) {
            Some(path) => {
                let state = if path.exists() { "" } else { " (not present)" };
                println!("{}{state}", path.display());
            }
            None => println!("No configuration directory on this platform"),
        },
    }
    Ok(())
}
