//! # Experience CLI Module
//!
//! This module implements the command line interface.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show store status
//! - `register` - Register interactively in the terminal
//! - `activities` - Show the activity catalog
//! - `eligibility` - Show what a set of answers unlocks
//! - `list` / `show` - Inspect stored registrations
//! - `update` / `delete` - Staff edits
//! - `import` / `export` - Move registrations in and out
//! - `calendar` - Write an `.ics` file for an activity
//! - `init` - Initialize a new database

mod commands;
mod output;
mod prompts;

use crate::config::Config;
use clap::{Parser, Subcommand};
use experience_core::{CompanySize, ExperienceError};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Executive Experience registration server and admin CLI.
///
/// Decides which executive-track activities a registrant may select,
/// collects registrations and exports them to calendars and the CRM.
#[derive(Parser, Debug)]
#[command(name = "experience")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the registration database (overrides the config file)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show store status
    Status,

    /// Register interactively
    Register,

    /// Show the activity catalog
    Activities,

    /// Show the activities, lounge access and steps for a set of answers
    Eligibility {
        /// Is the registrant a CHRO? (true/false, omit if unknown)
        #[arg(long)]
        chro: Option<bool>,

        /// Company size: under_5000 or 5000_plus (CHROs only)
        #[arg(long)]
        company_size: Option<CompanySize>,

        /// Is the registrant a Transform Exec Member? (true/false)
        #[arg(long)]
        exec_member: Option<bool>,
    },

    /// List registrations, newest first
    List {
        /// Show at most this many
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one registration
    Show {
        /// Registration ID
        id: u64,
    },

    /// Replace a registration with the contents of a JSON file
    Update {
        /// Registration ID
        id: u64,

        /// JSON file holding the full registration
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Delete a registration
    Delete {
        /// Registration ID
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Import registrations from a file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Input format (legacy, json)
        #[arg(short = 't', long, default_value = "legacy")]
        format: String,
    },

    /// Export all registrations as JSON
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the calendar file for an activity
    Calendar {
        /// Activity key, e.g. vip_dinner_tue
        activity: String,

        /// Output file path (defaults to the event's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Initialize a new empty database
    Init {
        /// Replace an existing database
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Resolve configuration: file, then environment, then CLI flags.
pub fn resolve_config(cli: &Cli) -> Result<Config, ExperienceError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        config.storage.database = database.clone();
    }
    if let Some(backend) = &cli.backend {
        config.storage.backend = backend.clone();
    }
    Ok(config)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ExperienceError> {
    let mut config = resolve_config(&cli)?;
    let json_mode = cli.json_mode;

    if cli.verbose {
        tracing::info!(
            backend = %config.storage.backend,
            database = %config.storage.database.display(),
            "Resolved configuration"
        );
    }

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_server(config).await
        }
        Some(Commands::Status) | None => cmd_status(&config, json_mode),
        Some(Commands::Register) => cmd_register(&config, json_mode).await,
        Some(Commands::Activities) => cmd_activities(json_mode),
        Some(Commands::Eligibility {
            chro,
            company_size,
            exec_member,
        }) => cmd_eligibility(chro, company_size, exec_member, json_mode),
        Some(Commands::List { limit }) => cmd_list(&config, limit, json_mode),
        Some(Commands::Show { id }) => cmd_show(&config, id, json_mode),
        Some(Commands::Update { id, file }) => cmd_update(&config, id, &file),
        Some(Commands::Delete { id, yes }) => cmd_delete(&config, id, yes),
        Some(Commands::Import { input, format }) => {
            cmd_import(&config, &input, &format, json_mode)
        }
        Some(Commands::Export { output }) => cmd_export(&config, &output),
        Some(Commands::Calendar { activity, output }) => {
            cmd_calendar(&activity, output.as_deref(), json_mode)
        }
        Some(Commands::Init { force }) => cmd_init(&config, force),
    }
}
