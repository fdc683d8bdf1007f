//! Dashboard, refresh and messages handlers.

use anyhow::Result;
use chrono::Utc;
use spimf_core::config::Config;
use spimf_core::{countdown, dashboard};

use super::open_portal;

const NOT_LOGGED_IN: &str = "Not logged in. Run `spimf login` or `spimf guest`.";

pub fn show(config: &Config) -> Result<()> {
    let portal = open_portal(config)?;

    println!("{}", countdown::report_now().label);
    println!();
    match portal.session() {
        Some(session) => print!("{}", dashboard::render_session(session, Utc::now())),
        None => println!("{NOT_LOGGED_IN}"),
    }
    Ok(())
}

pub async fn refresh(config: &Config) -> Result<()> {
    let mut portal = open_portal(config)?;
    let session = portal.refresh_member().await?;

    println!("✓ Member data refreshed");
    println!();
    print!("{}", dashboard::render_session(session, Utc::now()));
    Ok(())
}

pub async fn messages(config: &Config) -> Result<()> {
    let portal = open_portal(config)?;
    let messages = portal.admin_messages().await?;

    print!("{}", dashboard::render_messages(&messages));
    Ok(())
}
