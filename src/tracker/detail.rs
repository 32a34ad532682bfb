use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::db::store::HabitStore;
use crate::error::{HabitError, Result};
use crate::models::Habit;
use crate::tracker::stats::percent;
use crate::utils::dates::{day_gap, days_between, parse_date};

/// Days before today covered by a habit's recent history.
pub const HISTORY_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayMark {
    pub date: NaiveDate,
    pub completed: bool,
}

/// One habit with its recent day-by-day history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitDetail {
    pub habit: Habit,
    /// `today - HISTORY_DAYS ..= today`, oldest first.
    pub history: Vec<DayMark>,
    pub days_tracked: u32,
    pub days_completed: u32,
    /// Completed share of the tracked days, rounded half-up.
    pub completion_rate: u32,
    /// `None` when the stored creation timestamp cannot be read.
    pub days_since_created: Option<u32>,
}

/// Load a habit the user owns together with its last `HISTORY_DAYS + 1` days.
pub fn habit_detail<S: HabitStore + ?Sized>(
    store: &S,
    user_id: i64,
    habit_id: i64,
    today: NaiveDate,
) -> Result<HabitDetail> {
    let habit = match store.habit(habit_id)? {
        Some(habit) if habit.user_id == user_id => habit,
        _ => return Err(HabitError::habit_not_found()),
    };

    let start = today - Duration::days(i64::from(HISTORY_DAYS));
    let done: HashSet<NaiveDate> = store
        .habit_entries_between(habit_id, start, today)?
        .into_iter()
        .filter(|e| e.completed)
        .map(|e| e.date)
        .collect();

    let history: Vec<DayMark> = days_between(start, today)
        .map(|date| DayMark {
            date,
            completed: done.contains(&date),
        })
        .collect();
    let days_tracked = history.len() as u32;
    let days_completed = history.iter().filter(|d| d.completed).count() as u32;

    let days_since_created = habit
        .created_at
        .get(..10)
        .and_then(|day| parse_date(day).ok())
        .map(|created| day_gap(created, today).max(0) as u32);

    Ok(HabitDetail {
        habit,
        history,
        days_tracked,
        days_completed,
        completion_rate: percent(days_completed, days_tracked),
        days_since_created,
    })
}
