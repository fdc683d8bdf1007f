//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod edit;
pub mod system;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use spimf_core::config::Config;
use spimf_core::portal::Portal;

/// Builds the portal and restores any saved session.
pub(crate) fn open_portal(config: &Config) -> Result<Portal> {
    let mut portal = Portal::from_config(config).context("create backend client")?;
    portal.restore().context("restore session")?;
    Ok(portal)
}

/// Prints `label` and reads one line from stdin (empty on EOF).
pub(crate) fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
