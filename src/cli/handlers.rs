use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use rusqlite::Connection;

use crate::cli::profile::{clear_active, require_user, set_active};
use crate::config::AppConfig;
use crate::db::repository::{EntryRepo, HabitRepo, UserRepo};
use crate::models::{Habit, HabitStats, NewHabit};
use crate::tracker::{habit_detail, habit_stats, toggle_on_connection, HabitDetail, ToggleRequest};
use crate::utils::dates::{format_date, parse_date};
use crate::utils::format::{fit_width, format_days, history_strip, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ─── Profiles ────────────────────────────────────────────────────────────────

pub fn handle_register(conn: &Connection, name: &str, email: &str) -> Result<()> {
    let user = UserRepo::create(conn, name, email)?;
    set_active(conn, &user)?;
    log::info!("registered user {}", user.id);
    println_colored!(GREEN, "  ✓ Welcome, {}! Profile created and selected.", user.name);
    Ok(())
}

pub fn handle_login(conn: &Connection, email: &str) -> Result<()> {
    let user = UserRepo::find_by_email(conn, email)?
        .with_context(|| format!("No profile with email '{}'", email))?;
    set_active(conn, &user)?;
    println_colored!(GREEN, "  ✓ Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

pub fn handle_logout(conn: &Connection) -> Result<()> {
    clear_active(conn)?;
    println_colored!(DIM, "  Logged out");
    Ok(())
}

pub fn handle_whoami(conn: &Connection) -> Result<()> {
    let user = require_user(conn)?;
    println!("  {} <{}>", user.name, user.email);
    println_colored!(DIM, "  member since {}", user.created_at);
    Ok(())
}

pub fn handle_delete_account(conn: &Connection, confirm: bool) -> Result<()> {
    let user = require_user(conn)?;
    if !confirm {
        println_colored!(
            AMBER,
            "  This deletes {} and every habit they track. Re-run with --confirm.",
            user.email
        );
        return Ok(());
    }
    UserRepo::delete(conn, user.id)?;
    clear_active(conn)?;
    log::info!("deleted user {}", user.id);
    println_colored!(RED, "  ✗ Profile {} deleted", user.email);
    Ok(())
}

// ─── Habits ──────────────────────────────────────────────────────────────────

pub fn handle_add(conn: &Connection, input: &NewHabit) -> Result<()> {
    let user = require_user(conn)?;
    let habit = HabitRepo::create(conn, user.id, input)?;
    println_colored!(GREEN, "  ✓ Added habit #{}: {}", habit.id, habit.name);
    Ok(())
}

pub fn handle_list(conn: &Connection) -> Result<()> {
    let user = require_user(conn)?;
    let habits = HabitRepo::list_for_user(conn, user.id)?;
    let today = today();

    println!();
    if habits.is_empty() {
        println_colored!(DIM, "  No habits yet. Add one with `habitforge add <name>`.");
        println!();
        return Ok(());
    }

    println_colored!(GOLD, "  Habits");
    println!();
    for habit in &habits {
        let done_today = EntryRepo::get(conn, habit.id, today)?
            .map(|e| e.completed)
            .unwrap_or(false);
        let mark = if done_today {
            format!("{}●\x1b[0m", GREEN)
        } else {
            format!("{}○\x1b[0m", DIM)
        };
        println!(
            "  {} {:>3}  {}  {:<6}  {} (best {})",
            mark,
            habit.id,
            fit_width(&habit.name, 24),
            habit.importance.label(),
            format_days(habit.current_streak),
            habit.longest_streak
        );
    }
    println!();
    Ok(())
}

pub fn handle_show(conn: &Connection, id: i64) -> Result<()> {
    let user = require_user(conn)?;
    let detail = habit_detail(conn, user.id, id, today())?;
    print_habit(&detail.habit);
    print_history(&detail);
    Ok(())
}

pub fn handle_edit(conn: &Connection, id: i64, input: &NewHabit) -> Result<()> {
    let user = require_user(conn)?;
    let habit = HabitRepo::update(conn, user.id, id, input)?;
    println_colored!(GREEN, "  ✓ Updated habit #{}", habit.id);
    print_habit(&habit);
    Ok(())
}

pub fn handle_remove(conn: &Connection, id: i64) -> Result<()> {
    let user = require_user(conn)?;
    let habit = HabitRepo::get_owned(conn, user.id, id)?;
    HabitRepo::delete(conn, user.id, id)?;
    println_colored!(RED, "  ✗ Removed habit #{}: {}", habit.id, habit.name);
    Ok(())
}

fn print_habit(habit: &Habit) {
    println!();
    println_colored!(GOLD, "  #{} {}", habit.id, habit.name);
    if let Some(description) = habit.description.as_deref().filter(|d| !d.is_empty()) {
        println_colored!(DIM, "  {}", description);
    }
    println!();
    println!(
        "  Importance:  {} ({})",
        habit.importance,
        habit.importance.label()
    );
    println_colored!(
        BOLD,
        "  Streak:      {} current  |  {} best",
        format_days(habit.current_streak),
        format_days(habit.longest_streak)
    );
    println_colored!(DIM, "  Created:     {}", habit.created_at);
    println!();
}

fn print_history(detail: &HabitDetail) {
    let days: Vec<bool> = detail.history.iter().map(|d| d.completed).collect();
    if let (Some(first), Some(last)) = (detail.history.first(), detail.history.last()) {
        println_colored!(
            DIM,
            "  {} → {}",
            first.date.format("%b %d"),
            last.date.format("%b %d")
        );
    }
    println_colored!(GREEN, "  {}", history_strip(&days));
    println!(
        "  Completion:  {}%  ({}/{} days tracked)",
        detail.completion_rate, detail.days_completed, detail.days_tracked
    );
    if let Some(days) = detail.days_since_created {
        println_colored!(DIM, "  Tracking for {}", format_days(days));
    }
    println!();
}

// ─── Entries ─────────────────────────────────────────────────────────────────

pub fn handle_toggle(
    conn: &Connection,
    config: &AppConfig,
    id: i64,
    date: Option<String>,
    completed: Option<bool>,
) -> Result<()> {
    let user = require_user(conn)?;
    let today = today();
    let request = ToggleRequest {
        user_id: user.id,
        habit_id: id,
        date: Some(date.unwrap_or_else(|| format_date(today))),
        completed,
    };

    let toggled = toggle_on_connection(conn, config.tracking.atomic_toggle, &request, today)?;
    let day = format_date(toggled.entry.date);
    if toggled.entry.completed {
        println_colored!(GREEN, "  ✓ {} — done on {}", toggled.habit.name, day);
    } else {
        println_colored!(DIM, "  ○ {} — unmarked on {}", toggled.habit.name, day);
    }
    println_colored!(
        BOLD,
        "  Streak: {}  (best {})",
        format_days(toggled.habit.current_streak),
        toggled.habit.longest_streak
    );
    Ok(())
}

pub fn handle_entries(
    conn: &Connection,
    id: i64,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let user = require_user(conn)?;
    let habit = HabitRepo::get_owned(conn, user.id, id)?;
    let from = from.map(parse_date).transpose()?;
    let to = to.map(parse_date).transpose()?;
    let entries = EntryRepo::range_for_habit(conn, habit.id, from, to)?;

    println!();
    println_colored!(GOLD, "  {} — {} entries", habit.name, entries.len());
    println!();
    for entry in &entries {
        if entry.completed {
            println_colored!(GREEN, "  {}  ●", format_date(entry.date));
        } else {
            println_colored!(DIM, "  {}  ○", format_date(entry.date));
        }
    }
    println!();
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(
    conn: &Connection,
    config: &AppConfig,
    days: Option<u32>,
    json: bool,
) -> Result<()> {
    let user = require_user(conn)?;
    let window = days.unwrap_or(config.tracking.stats_window_days);
    let stats = habit_stats(conn, user.id, Some(window), today())?;

    if json {
        let out = serde_json::to_string_pretty(&stats).context("Serializing stats")?;
        println!("{}", out);
        return Ok(());
    }

    print_stats(&stats, window);
    Ok(())
}

fn print_stats(stats: &HabitStats, window: u32) {
    let overall = &stats.overall_stats;

    println!();
    println_colored!(GOLD, "  Statistics — last {} days", window);
    println!();
    if overall.total_habits == 0 {
        println_colored!(DIM, "  No habits tracked yet.");
        println!();
        return;
    }

    println!("  Habits:          {}", overall.total_habits);
    println_colored!(BOLD, "  Avg completion:  {}%", overall.avg_completion_rate);
    println!(
        "  Streaks:         {} current  |  {} longest (summed)",
        overall.current_streak_sum, overall.longest_streak_sum
    );
    println!("  Perfect days:    {}", stats.perfect_days());

    println!();
    println_colored!(DIM, "  Daily completion");
    for day in &stats.completion_per_day {
        let color = match day.percentage {
            100 => GREEN,
            1..=99 => AMBER,
            _ => DIM,
        };
        println_colored!(
            color,
            "  {}  {}  {:>3}%  ({}/{})",
            format_date(day.date),
            progress_bar(day.completed, day.total, 10),
            day.percentage,
            day.completed,
            day.total
        );
    }

    println!();
    println_colored!(DIM, "  By habit");
    for row in &stats.habit_breakdown {
        println!(
            "  {}  {}  {:>3}%  streak {} (best {})",
            fit_width(&row.name, 20),
            progress_bar(row.completion_rate, 100, 10),
            row.completion_rate,
            row.current_streak,
            row.longest_streak
        );
    }
    println!();
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection) -> Result<()> {
    let user = require_user(conn)?;
    let today = today();
    let stats = habit_stats(conn, user.id, Some(6), today)?;

    println!("# habitforge — Weekly Summary");
    println!("# {} ({})", format_date(today), user.name);
    println!();
    println!("## Daily completion (last 7 days)");
    for day in &stats.completion_per_day {
        println!(
            "  {}  {}/{}  {}",
            format_date(day.date),
            day.completed,
            day.total,
            progress_bar(day.completed, day.total, 5)
        );
    }
    println!();
    println!("## Habits");
    for row in &stats.habit_breakdown {
        println!(
            "  {}  {}/7 days  streak {} (best {})",
            fit_width(&row.name, 24),
            row.completed_entries,
            row.current_streak,
            row.longest_streak
        );
    }
    println!();
    println!("## Summary");
    let overall = &stats.overall_stats;
    println!("  Habits:        {}", overall.total_habits);
    println!("  Perfect days:  {}", stats.perfect_days());
    println!(
        "  Week of:       {} to {}",
        format_date(today - Duration::days(6)),
        format_date(today)
    );
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(config: &AppConfig, init: bool) -> Result<()> {
    let path = AppConfig::config_path()?;
    if init {
        if path.exists() {
            bail!("Config already exists at {:?}", path);
        }
        config.save()?;
        println_colored!(GREEN, "  ✓ Wrote defaults to {:?}", path);
        return Ok(());
    }

    println_colored!(DIM, "  # {:?}", path);
    let rendered = toml::to_string_pretty(config).context("Serializing config")?;
    for line in rendered.lines() {
        println!("  {}", line);
    }
    Ok(())
}
