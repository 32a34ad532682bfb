use std::cell::Cell;

use chrono::NaiveDate;
use rusqlite::{ffi, Connection};

use crate::db::store::HabitStore;
use crate::error::{HabitError, Result};
use crate::models::{Habit, HabitEntry, Streak, User};

/// Delegates to a real connection but can be told to fail selected writes
/// or reads, and counts entry range queries.
pub struct FailingStore {
    pub inner: Connection,
    pub fail_streak_updates: bool,
    pub fail_entry_reads: bool,
    pub entry_range_queries: Cell<u32>,
}

impl FailingStore {
    pub fn new(inner: Connection) -> Self {
        Self {
            inner,
            fail_streak_updates: false,
            fail_entry_reads: false,
            entry_range_queries: Cell::new(0),
        }
    }
}

fn io_error() -> HabitError {
    HabitError::Persistence(rusqlite::Error::SqliteFailure(
        ffi::Error::new(ffi::SQLITE_IOERR),
        Some("disk I/O error".to_string()),
    ))
}

impl HabitStore for FailingStore {
    fn user(&self, user_id: i64) -> Result<Option<User>> {
        self.inner.user(user_id)
    }

    fn habit(&self, habit_id: i64) -> Result<Option<Habit>> {
        self.inner.habit(habit_id)
    }

    fn habits_for_user(&self, user_id: i64) -> Result<Vec<Habit>> {
        self.inner.habits_for_user(user_id)
    }

    fn entry(&self, habit_id: i64, date: NaiveDate) -> Result<Option<HabitEntry>> {
        self.inner.entry(habit_id, date)
    }

    fn insert_entry(&self, habit_id: i64, date: NaiveDate, completed: bool) -> Result<HabitEntry> {
        self.inner.insert_entry(habit_id, date, completed)
    }

    fn set_entry_completed(&self, habit_id: i64, date: NaiveDate, completed: bool) -> Result<()> {
        self.inner.set_entry_completed(habit_id, date, completed)
    }

    fn completed_entries(&self, habit_id: i64) -> Result<Vec<HabitEntry>> {
        self.inner.completed_entries(habit_id)
    }

    fn habit_entries_between(
        &self,
        habit_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitEntry>> {
        self.entry_range_queries.set(self.entry_range_queries.get() + 1);
        if self.fail_entry_reads {
            return Err(io_error());
        }
        self.inner.habit_entries_between(habit_id, start, end)
    }

    fn entries_between(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitEntry>> {
        self.entry_range_queries.set(self.entry_range_queries.get() + 1);
        if self.fail_entry_reads {
            return Err(io_error());
        }
        self.inner.entries_between(user_id, start, end)
    }

    fn update_streaks(&self, habit_id: i64, streak: Streak) -> Result<()> {
        if self.fail_streak_updates {
            return Err(io_error());
        }
        self.inner.update_streaks(habit_id, streak)
    }
}
