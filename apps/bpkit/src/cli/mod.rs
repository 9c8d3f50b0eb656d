//! # bpkit CLI Module
//!
//! This module implements the CLI interface for bpkit.
//!
//! ## Available Commands
//!
//! - `decode` - Exchange string to JSON document
//! - `encode` - JSON document to exchange string
//! - `inspect` - Summarize a blueprint
//! - `edit` - Change label, description, icons, names or orientation
//! - `pack` - Pack a list of integers into a constant combinator
//! - `wire` - Connect two entities of a blueprint
//! - `server` - Start the HTTP server
//!
//! Inputs are read from a file (`-i`) or stdin; outputs go to a file (`-o`)
//! or stdout.

mod commands;

use crate::config::Config;
use bpkit_core::{BlueprintError, ConnectCode, Direction, WireColors};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// bpkit - blueprint exchange-string toolbox
///
/// Decode, inspect, edit and build factory blueprints.
#[derive(Parser, Debug)]
#[command(name = "bpkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Configuration file (default: ./bpkit.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode an exchange string into a JSON document
    Decode {
        /// File holding the exchange string (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode a JSON document into an exchange string
    Encode {
        /// File holding the JSON document (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a blueprint
    Inspect {
        /// File holding the exchange string (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Edit a blueprint and print the new exchange string
    Edit {
        /// File holding the exchange string (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// New label
        #[arg(short, long)]
        label: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// Point every entity in this direction (name, abbreviation or code)
        #[arg(short, long)]
        rotate: Option<Direction>,

        /// Rename entities, FROM=TO (repeatable)
        #[arg(long = "replace", value_name = "FROM=TO")]
        replacements: Vec<String>,

        /// Set an icon, INDEX=SIGNAL with SIGNAL as type:name (repeatable)
        #[arg(long = "icon", value_name = "INDEX=SIGNAL")]
        icons: Vec<String>,
    },

    /// Pack integers into a constant combinator
    Pack {
        /// File of whitespace- or comma-separated integers (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Signal catalog JSON (overrides the config file)
        #[arg(short = 'C', long)]
        catalog: Option<PathBuf>,

        /// Blueprint label
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Connect two entities of a blueprint
    Wire {
        /// File holding the exchange string (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Entity number of the first endpoint
        #[arg(long)]
        from: u32,

        /// Entity number of the second endpoint
        #[arg(long)]
        to: u32,

        /// Sides to connect: ii, io, oi or oo
        #[arg(long, default_value = "oi")]
        code: ConnectCode,

        /// Wire colors, any of r and g
        #[arg(long, default_value = "r")]
        colors: WireColors,
    },

    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Signal catalog JSON (overrides the config file)
        #[arg(short = 'C', long)]
        catalog: Option<PathBuf>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), BlueprintError> {
    let config = Config::load(cli.config.as_deref())?;
    let out = Output {
        json_mode: cli.json_mode,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Decode { input, output } => cmd_decode(input.as_deref(), output.as_deref()),
        Commands::Encode { input, output } => cmd_encode(input.as_deref(), output.as_deref()),
        Commands::Inspect { input } => cmd_inspect(input.as_deref(), out),
        Commands::Edit {
            input,
            output,
            label,
            description,
            rotate,
            replacements,
            icons,
        } => cmd_edit(
            input.as_deref(),
            output.as_deref(),
            &EditOptions {
                label,
                description,
                rotate,
                replacements,
                icons,
            },
        ),
        Commands::Pack {
            input,
            output,
            catalog,
            label,
        } => {
            let catalog = config.load_catalog(catalog.as_deref())?;
            cmd_pack(
                input.as_deref(),
                output.as_deref(),
                &catalog,
                label.as_deref(),
                out,
            )
        }
        Commands::Wire {
            input,
            output,
            from,
            to,
            code,
            colors,
        } => cmd_wire(input.as_deref(), output.as_deref(), from, to, code, colors),
        Commands::Server {
            host,
            port,
            catalog,
        } => {
            let catalog = config.load_catalog(catalog.as_deref())?;
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            cmd_server(&host, port, catalog, out).await
        }
    }
}
