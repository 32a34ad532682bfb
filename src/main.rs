mod cli;
mod config;
mod db;
mod error;
mod models;
mod tracker;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use cli::profile::ensure_profile;
use config::AppConfig;
use models::NewHabit;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB; migrations run on open
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = db::open(&db_path)?;

    match cli.command {
        Some(Commands::Register { name, email }) => {
            handlers::handle_register(&conn, &name, &email)?;
        }
        Some(Commands::Login { email }) => {
            handlers::handle_login(&conn, &email)?;
        }
        Some(Commands::Logout) => {
            handlers::handle_logout(&conn)?;
        }
        Some(Commands::Whoami) => {
            handlers::handle_whoami(&conn)?;
        }
        Some(Commands::DeleteAccount { confirm }) => {
            handlers::handle_delete_account(&conn, confirm)?;
        }
        Some(Commands::Add {
            name,
            description,
            importance,
        }) => {
            let input = NewHabit {
                name,
                description,
                importance,
            };
            handlers::handle_add(&conn, &input)?;
        }
        Some(Commands::List) => {
            handlers::handle_list(&conn)?;
        }
        Some(Commands::Show { id }) => {
            handlers::handle_show(&conn, id)?;
        }
        Some(Commands::Edit {
            id,
            name,
            description,
            importance,
        }) => {
            let input = NewHabit {
                name,
                description,
                importance,
            };
            handlers::handle_edit(&conn, id, &input)?;
        }
        Some(Commands::Remove { id }) => {
            handlers::handle_remove(&conn, id)?;
        }
        Some(Commands::Toggle {
            id,
            date,
            done,
            undone,
        }) => {
            let completed = match (done, undone) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            handlers::handle_toggle(&conn, &config, id, date, completed)?;
        }
        Some(Commands::Entries { id, from, to }) => {
            handlers::handle_entries(&conn, id, from.as_deref(), to.as_deref())?;
        }
        Some(Commands::Stats { days, json }) => {
            handlers::handle_stats(&conn, &config, days, json)?;
        }
        Some(Commands::Export) => {
            handlers::handle_export(&conn)?;
        }
        Some(Commands::Config { init }) => {
            handlers::handle_config(&config, init)?;
        }

        // No subcommand → launch TUI
        None => {
            let user = ensure_profile(&conn)?;
            tui::app::run(conn, config, user)?;
        }
    }

    Ok(())
}
