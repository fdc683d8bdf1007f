//! Health, connection status and countdown handlers.

use anyhow::Result;
use spimf_core::config::Config;
use spimf_core::{countdown, dashboard};

use super::{open_portal, prompt};

pub async fn health(config: &Config, password: Option<String>) -> Result<()> {
    let portal = open_portal(config)?;

    let password = match password {
        Some(password) => password,
        None => prompt("System password: ")?,
    };
    let report = portal.check_system_health(&password).await?;

    print!("{}", dashboard::render_health(&report));
    Ok(())
}

pub async fn status(config: &Config) -> Result<()> {
    let portal = open_portal(config)?;
    portal.probe().await?;

    println!("✓ API connection successful ({})", portal.backend().endpoint());
    Ok(())
}

pub async fn countdown(watch: bool) -> Result<()> {
    println!("{}", countdown::report_now().label);
    if !watch {
        return Ok(());
    }

    let mut ticker = tokio::time::interval(countdown::REFRESH_INTERVAL);
    // first tick completes immediately
    ticker.tick().await;
    loop {
        ticker.tick().await;
        println!("{}", countdown::report_now().label);
    }
}
