//! CLI command definitions for the `echochat` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod models;
pub mod send;
pub mod session;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with your self-hosted models, with sessions synced across devices.
#[derive(Parser)]
#[command(name = "echochat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Data directory (defaults to $ECHOCHAT_DATA_DIR, then ~/.echochat).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Keep sessions in memory only; nothing is written to disk.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat.
    Chat {
        /// Session to resume (id or unique id prefix).
        #[arg(long, short)]
        session: Option<String>,
    },

    /// Send one message and print the reply.
    Send {
        /// Message text.
        message: String,

        /// Session to send to (id or unique id prefix).
        #[arg(long, short)]
        session: Option<String>,
    },

    /// List chat sessions.
    #[command(alias = "ls")]
    Sessions,

    /// Show a session's full conversation.
    Show {
        /// Session id or unique id prefix.
        id: String,
    },

    /// Create an empty session.
    New,

    /// Delete a session locally and remotely.
    #[command(alias = "rm")]
    Delete {
        /// Session id or unique id prefix.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// List available models.
    Models,

    /// Show sync and configuration status.
    Status,

    /// Wipe the local session cache (remote copies are kept).
    #[command(name = "reset-local")]
    ResetLocal {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
