//! # Patriot Pathways CLI (`pathways`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pathways init` | Create the SQLite database and the `resource` table |
//! | `pathways ingest` | Replace all resources with a fresh pull from the facilities API |
//! | `pathways serve` | Start the web server |
//! | `pathways states` | Print the supported states |
//! | `pathways list <state> <category>` | Print one state/category listing |
//! | `pathways ask "<query>"` | Run one AI smart search |
//!
//! ## Examples
//!
//! ```bash
//! pathways --config ./config/pathways.toml init
//! pathways ingest --state TX --state NM
//! pathways list tx mental-health
//! pathways ask "job training programs in Ohio"
//! ```

use clap::{Parser, Subcommand};
use patriot_pathways::{config, directory, ingest, migrate, server, smart_search, states};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Patriot Pathways: veteran support resources by state, with an AI
/// smart search.
#[derive(Parser)]
#[command(name = "pathways", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Built-in defaults are used when the file does not exist.
    #[arg(long, global = true, default_value = "./config/pathways.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema. Safe to run more than once.
    Init,

    /// Repopulate the resource table from the facilities API.
    ///
    /// Deletes every existing resource first, then fetches each state and
    /// facility type in turn. Failed fetches are reported and skipped.
    Ingest {
        /// Only ingest these state codes (repeatable). Defaults to the
        /// configured list, which is all 50 states unless overridden.
        #[arg(long = "state")]
        states: Vec<String>,
    },

    /// Start the web server on `[server].bind`.
    Serve,

    /// Print the supported state codes and names.
    States,

    /// Print the resources of one category in one state.
    List {
        /// Two-letter state code (case-insensitive).
        state: String,
        /// One of `healthcare`, `employment`, `housing`, `mental-health`.
        category: String,
    },

    /// Ask the AI smart search a question and print the Markdown answer.
    Ask {
        /// Free-text question.
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let dotenv = dotenvy::dotenv();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Missing .env is fine
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to load .env");
        }
    }

    if let Commands::States = cli.command {
        states::run_states();
        return Ok(());
    }

    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { states } => {
            ingest::run_ingest(&cfg, states).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List { state, category } => {
            directory::run_list(&cfg, &state, &category).await?;
        }
        Commands::Ask { query } => {
            smart_search::run_ask(&cfg, &query).await?;
        }
        Commands::States => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
