//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use spimf_core::config::{self, paths};
use spimf_core::logging;
use spimf_core::member::LoginMethod;

mod commands;

#[derive(Parser)]
#[command(name = "spimf")]
#[command(version)]
#[command(about = "SPIMF membership client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in as a member
    Login {
        /// Identifier scheme: phone, idCard, kodeUser or membership
        #[arg(short, long)]
        method: Option<LoginMethod>,

        /// Phone number, ID card, kode user or membership account
        #[arg(short, long)]
        identifier: Option<String>,

        /// Password (membership only; prompted if missing)
        #[arg(short, long, env = "SPIMF_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Enter guest mode
    Guest,

    /// Log out and forget the saved session
    Logout,

    /// Show the dashboard for the current session
    Dashboard,

    /// Edit one profile field
    Edit {
        /// Field name (as shown on the dashboard)
        #[arg(value_name = "FIELD")]
        field: String,

        /// New value (prompted if missing; empty cancels)
        #[arg(value_name = "VALUE")]
        value: Option<String>,
    },

    /// Reload member data from the backend
    Refresh,

    /// Show messages from administrators
    Messages,

    /// Check backend health (requires the system password)
    Health {
        /// System password (prompted if missing)
        #[arg(long, env = "SPIMF_SYSTEM_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Test the connection to the backend
    Status,

    /// Show the operational-hours countdown
    Countdown {
        /// Keep refreshing once a minute
        #[arg(long)]
        watch: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(&paths::logs_dir()).context("initialize logging")?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;
    tracing::debug!(endpoint = %config.endpoint, "config loaded");

    // default to the dashboard
    let Some(command) = cli.command else {
        return commands::dashboard::show(&config);
    };

    match command {
        Commands::Login {
            method,
            identifier,
            password,
        } => commands::auth::login(&config, method, identifier, password).await,
        Commands::Guest => commands::auth::guest(&config).await,
        Commands::Logout => commands::auth::logout(&config),

        Commands::Dashboard => commands::dashboard::show(&config),
        Commands::Edit { field, value } => commands::edit::run(&config, &field, value).await,
        Commands::Refresh => commands::dashboard::refresh(&config).await,
        Commands::Messages => commands::dashboard::messages(&config).await,

        Commands::Health { password } => commands::system::health(&config, password).await,
        Commands::Status => commands::system::status(&config).await,
        Commands::Countdown { watch } => commands::system::countdown(watch).await,

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
