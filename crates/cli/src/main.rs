//! Patron CLI - allowlist, contribution and session management tools.
//!
//! # Usage
//!
//! ```bash
//! # Add an email to the stored admin allowlist
//! patron admin add ops@example.com
//!
//! # List stored admins
//! patron admin list
//!
//! # List contributions, newest first
//! patron contributions list
//!
//! # Create the PostgreSQL session table
//! patron sessions migrate
//! ```
//!
//! # Commands
//!
//! - `admin` - Manage the stored admin allowlist
//! - `contributions` - Inspect submitted contributions
//! - `sessions` - Manage the session database

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "patron")]
#[command(author, version, about = "Patron CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the stored admin allowlist
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Inspect submitted contributions
    Contributions {
        #[command(subcommand)]
        action: ContributionsAction,
    },
    /// Manage the session database
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Add an email to the stored allowlist
    Add {
        /// Admin email address (kept verbatim, matching is case-sensitive)
        email: String,
    },
    /// List stored admins, most recently added first
    List,
}

#[derive(Subcommand)]
enum ContributionsAction {
    /// List contributions, newest first
    List {
        /// Only show contributions not yet marked read
        #[arg(long)]
        unread: bool,
    },
}

#[derive(Subcommand)]
enum SessionsAction {
    /// Create the `tower_sessions` schema and session table
    Migrate,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Add { email } => commands::admin::add(&email).await?,
            AdminAction::List => commands::admin::list().await?,
        },
        Commands::Contributions { action } => match action {
            ContributionsAction::List { unread } => commands::contributions::list(unread).await?,
        },
        Commands::Sessions { action } => match action {
            SessionsAction::Migrate => commands::sessions::migrate().await?,
        },
    }
    Ok(())
}
