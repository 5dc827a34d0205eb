use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "paperbot", version, about = "Telegram bot that writes IEEE-style paper PDFs")]
pub struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the bot (default when no subcommand is given)
    Run,
    /// Manage access keys
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeysAction {
    /// Mint new access keys
    Generate {
        /// How many keys to mint
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// List keys and who redeemed them
    List,
    /// Delete a key (revokes the holder's premium access)
    Revoke { key: String },
}
