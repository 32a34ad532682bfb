use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "habitforge", version, author, about = "Track daily habits, streaks and completion stats from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a profile and make it the active one
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Switch to an existing profile by email
    Login {
        email: String,
    },
    /// Forget the active profile
    Logout,
    /// Show the active profile
    Whoami,
    /// Delete the active profile with all of its habits
    DeleteAccount {
        /// Required to actually delete
        #[arg(long)]
        confirm: bool,
    },
    /// Create a habit
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// 1 (low) to 10 (high), default 5
        #[arg(long)]
        importance: Option<i64>,
    },
    /// List habits with their streaks
    List,
    /// Show one habit
    Show {
        id: i64,
    },
    /// Rename or re-describe a habit
    Edit {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        importance: Option<i64>,
    },
    /// Delete a habit and its history
    Remove {
        id: i64,
    },
    /// Mark a day done, undone, or flip it
    #[command(group(ArgGroup::new("state").args(["done", "undone"])))]
    Toggle {
        id: i64,
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Force completed
        #[arg(long)]
        done: bool,
        /// Force not completed
        #[arg(long)]
        undone: bool,
    },
    /// List a habit's entries
    Entries {
        id: i64,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
    },
    /// Show completion statistics
    Stats {
        /// Window length in days
        #[arg(long)]
        days: Option<u32>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a weekly text summary to stdout
    Export,
    /// Show or initialise the configuration file
    Config {
        /// Write a config file with defaults if none exists
        #[arg(long)]
        init: bool,
    },
}
