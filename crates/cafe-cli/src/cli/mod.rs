//! CLI entry and dispatch.

use anyhow::{Context, Result};
use cafe_core::{config, logging};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "cafe")]
#[command(version)]
#[command(about = "Code Cafe session client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use the in-memory backend instead of the server
    #[arg(long, global = true, env = "CAFE_OFFLINE")]
    offline: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage cafes (sessions)
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum SessionCommands {
    /// Lists your cafes
    List,
    /// Creates a new cafe, optionally posting a first message
    Create {
        /// First message to post into the new cafe
        #[arg(short, long)]
        message: Option<String>,

        /// Model attached to the first message (defaults to config)
        #[arg(long)]
        model: Option<String>,
    },
    /// Deletes a cafe
    Delete {
        /// The ID of the cafe to delete
        #[arg(value_name = "CAFE_ID")]
        id: String,
    },
    /// Shows a cafe with its messages
    Show {
        /// The ID of the cafe to show
        #[arg(value_name = "CAFE_ID")]
        id: String,
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

    // Config commands must work before a home directory is usable.
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let _log_guard = logging::init().context("init logging")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("create tokio runtime")?;

    rt.block_on(dispatch(cli))
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = config::Config::load().context("load config")?;
    if cli.offline {
        config.offline = true;
    }

    let Some(command) = cli.command else {
        return commands::tui::run(&config).await;
    };

    match command {
        Commands::Sessions { command } => match command {
            SessionCommands::List => commands::sessions::list(&config).await,
            SessionCommands::Create { message, model } => {
                commands::sessions::create(&config, message.as_deref(), model.as_deref()).await
            }
            SessionCommands::Delete { id } => commands::sessions::delete(&config, &id).await,
            SessionCommands::Show { id } => commands::sessions::show(&config, &id).await,
        },
        // Handled before the runtime starts.
        Commands::Config { .. } => Ok(()),
    }
}
