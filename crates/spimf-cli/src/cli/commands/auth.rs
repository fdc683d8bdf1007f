//! Login, guest and logout handlers.

use anyhow::Result;
use chrono::Utc;
use spimf_core::config::Config;
use spimf_core::dashboard;
use spimf_core::member::LoginMethod;

use super::{open_portal, prompt};

pub async fn login(
    config: &Config,
    method: Option<LoginMethod>,
    identifier: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let method = method.unwrap_or(config.default_method);
    let mut portal = open_portal(config)?;

    if portal.session().is_some() {
        println!("An existing session will be replaced.");
    }

    let identifier = match identifier {
        Some(identifier) => identifier,
        None => prompt(&format!("{} ({}): ", method.label(), method.placeholder()))?,
    };
    let password = match password {
        Some(password) => password,
        None if method.requires_password() => prompt("Password: ")?,
        None => String::new(),
    };

    let session = portal.login(method, &identifier, &password).await?;

    println!(
        "✓ Logged in as {}",
        session.member.display_name().unwrap_or("Member")
    );
    println!();
    print!("{}", dashboard::render_session(session, Utc::now()));
    Ok(())
}

pub async fn guest(config: &Config) -> Result<()> {
    let mut portal = open_portal(config)?;
    let session = portal.login_guest().await?;

    println!("✓ Entered guest mode");
    println!();
    print!("{}", dashboard::render_session(session, Utc::now()));
    Ok(())
}

pub fn logout(config: &Config) -> Result<()> {
    let mut portal = open_portal(config)?;

    if portal.logout()? {
        println!("✓ Logged out");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
