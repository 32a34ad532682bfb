use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};

use crate::db::store::HabitStore;
use crate::error::{HabitError, Result};
use crate::models::{DayCompletion, Habit, HabitBreakdown, HabitEntry, HabitStats, OverallStats};
use crate::utils::dates::days_between;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// `round(part / whole * 100)`, rounding halves up. Zero when `whole` is zero.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((200 * part + whole) / (2 * whole)) as u32
}

fn rounded_mean(values: &[u32]) -> u32 {
    if values.is_empty() {
        return 0;
    }
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    let n = values.len() as u64;
    ((2 * sum + n) / (2 * n)) as u32
}

pub fn validate_window(days: u32) -> Result<u32> {
    if days == 0 || days > MAX_WINDOW_DAYS {
        return Err(HabitError::validation(format!(
            "days must be between 1 and {}, got {}",
            MAX_WINDOW_DAYS, days
        )));
    }
    Ok(days)
}

/// First day of a window of `window_days` ending at `today`.
pub fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    today - Duration::days(i64::from(window_days))
}

/// Build the report for `habits` over `[today - window_days, today]`.
///
/// Per-habit completion rates divide by `window_days`, not by the number of
/// days the habit has existed, so habits created inside the window score
/// lower in proportion.
pub fn compute(
    habits: &[Habit],
    entries: &[HabitEntry],
    window_days: u32,
    today: NaiveDate,
) -> HabitStats {
    if habits.is_empty() {
        return HabitStats::default();
    }

    let start = window_start(today, window_days);
    let owned: HashSet<i64> = habits.iter().map(|h| h.id).collect();
    let in_window: Vec<&HabitEntry> = entries
        .iter()
        .filter(|e| owned.contains(&e.habit_id) && e.date >= start && e.date <= today)
        .collect();

    let mut completed_by_day: HashMap<NaiveDate, u32> = HashMap::new();
    let mut per_habit: HashMap<i64, (u32, u32)> = HashMap::new();
    for entry in &in_window {
        let counts = per_habit.entry(entry.habit_id).or_default();
        counts.0 += 1;
        if entry.completed {
            counts.1 += 1;
            *completed_by_day.entry(entry.date).or_default() += 1;
        }
    }

    let total = habits.len() as u32;
    let completion_per_day = days_between(start, today)
        .map(|date| {
            let completed = completed_by_day.get(&date).copied().unwrap_or(0);
            DayCompletion {
                date,
                completed,
                total,
                percentage: percent(completed, total),
            }
        })
        .collect();

    let habit_breakdown: Vec<HabitBreakdown> = habits
        .iter()
        .map(|habit| {
            let (total_entries, completed_entries) =
                per_habit.get(&habit.id).copied().unwrap_or((0, 0));
            HabitBreakdown {
                id: habit.id,
                name: habit.name.clone(),
                description: habit.description.clone(),
                importance: habit.importance,
                completion_rate: percent(completed_entries, window_days),
                current_streak: habit.current_streak,
                longest_streak: habit.longest_streak,
                total_entries,
                completed_entries,
            }
        })
        .collect();

    let rates: Vec<u32> = habit_breakdown.iter().map(|h| h.completion_rate).collect();
    let overall_stats = OverallStats {
        total_habits: total,
        avg_completion_rate: rounded_mean(&rates),
        current_streak_sum: habits.iter().map(|h| h.current_streak).sum(),
        longest_streak_sum: habits.iter().map(|h| h.longest_streak).sum(),
    };

    HabitStats {
        completion_per_day,
        habit_breakdown,
        overall_stats,
    }
}

/// Load a user's habits and window entries and build the report.
///
/// Unknown users are `NotFound`; users without habits get the empty report
/// without an entry query.
pub fn habit_stats<S: HabitStore + ?Sized>(
    store: &S,
    user_id: i64,
    days: Option<u32>,
    today: NaiveDate,
) -> Result<HabitStats> {
    let window_days = validate_window(days.unwrap_or(DEFAULT_WINDOW_DAYS))?;

    if store.user(user_id)?.is_none() {
        return Err(HabitError::user_not_found());
    }
    let habits = store.habits_for_user(user_id)?;
    if habits.is_empty() {
        return Ok(HabitStats::default());
    }

    let entries = store.entries_between(user_id, window_start(today, window_days), today)?;
    log::debug!(
        "stats for user {}: {} habits, {} entries over {} days",
        user_id,
        habits.len(),
        entries.len(),
        window_days
    );
    Ok(compute(&habits, &entries, window_days, today))
}
