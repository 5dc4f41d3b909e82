// Author: Dustin Pilgrim
// License: MIT

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "bayguard",
    version = env!("CARGO_PKG_VERSION"),
    about = "Idle sign-out daemon for shared bay kiosks"
)]
pub struct Args {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    #[command(about = "Report user activity (or a detected shot with --shot)")]
    Activity {
        #[arg(long)]
        shot: bool,
    },

    #[command(about = "Answer the \"still there?\" prompt")]
    Acknowledge,

    #[command(about = "Open the idle prompt now (demo)")]
    Prompt,

    #[command(about = "Dismiss the idle prompt (demo)")]
    Dismiss,

    #[command(about = "Sign the kiosk out now")]
    SignOut,

    #[command(about = "Tell the daemon which screen the kiosk is showing")]
    Route { path: String },

    #[command(about = "Report how many linked accounts and guest profiles are on the bay")]
    Profiles { linked: u32, guests: u32 },

    /// Track the bay session
    #[command(subcommand)]
    Session(SessionCommand),

    #[command(about = "Display the current idle state")]
    Info {
        #[arg(long)]
        json: bool,
    },

    #[command(about = "Stream view changes and UI directives as JSON lines")]
    Watch,

    #[command(about = "Reload the configuration without restarting")]
    Reload,

    #[command(about = "Stop the running daemon")]
    Stop,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    #[command(about = "A session was created on the bay")]
    Start {
        id: String,
        /// guest or user; looked up from the session API when omitted
        owner: Option<String>,
        /// Milliseconds since the epoch (defaults to now)
        started_at_ms: Option<u64>,
    },

    #[command(about = "A signed-in user claimed the guest session")]
    Claim,

    #[command(about = "The session was cleared without a sign-out")]
    Clear,
}
