//! Storage capabilities the tracker core needs, and the SQLite binding for them.
//!
//! The core never reaches for a global connection: callers open one
//! [`Connection`] at start-up and pass it by reference. Anything else that
//! implements [`HabitStore`] (a transaction, a test double) works the same way.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::repository::{EntryRepo, HabitRepo, UserRepo};
use crate::error::Result;
use crate::models::{Habit, HabitEntry, Streak, User};

pub trait HabitStore {
    fn user(&self, user_id: i64) -> Result<Option<User>>;

    fn habit(&self, habit_id: i64) -> Result<Option<Habit>>;

    fn habits_for_user(&self, user_id: i64) -> Result<Vec<Habit>>;

    fn entry(&self, habit_id: i64, date: NaiveDate) -> Result<Option<HabitEntry>>;

    fn insert_entry(&self, habit_id: i64, date: NaiveDate, completed: bool) -> Result<HabitEntry>;

    fn set_entry_completed(&self, habit_id: i64, date: NaiveDate, completed: bool) -> Result<()>;

    /// Completed entries for one habit, oldest first.
    fn completed_entries(&self, habit_id: i64) -> Result<Vec<HabitEntry>>;

    /// Entries of one habit dated within `start..=end`, oldest first.
    fn habit_entries_between(&self, habit_id: i64, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<HabitEntry>>;

    /// Entries of every habit owned by `user_id` dated within `start..=end`.
    fn entries_between(&self, user_id: i64, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<HabitEntry>>;

    /// Replace both streak fields in a single write.
    fn update_streaks(&self, habit_id: i64, streak: Streak) -> Result<()>;
}

impl HabitStore for Connection {
    fn user(&self, user_id: i64) -> Result<Option<User>> {
        UserRepo::get(self, user_id)
    }

    fn habit(&self, habit_id: i64) -> Result<Option<Habit>> {
        HabitRepo::get(self, habit_id)
    }

    fn habits_for_user(&self, user_id: i64) -> Result<Vec<Habit>> {
        HabitRepo::list_for_user(self, user_id)
    }

    fn entry(&self, habit_id: i64, date: NaiveDate) -> Result<Option<HabitEntry>> {
        EntryRepo::get(self, habit_id, date)
    }

    fn insert_entry(&self, habit_id: i64, date: NaiveDate, completed: bool) -> Result<HabitEntry> {
        EntryRepo::insert(self, habit_id, date, completed)
    }

    fn set_entry_completed(&self, habit_id: i64, date: NaiveDate, completed: bool) -> Result<()> {
        EntryRepo::set_completed(self, habit_id, date, completed)
    }

    fn completed_entries(&self, habit_id: i64) -> Result<Vec<HabitEntry>> {
        EntryRepo::completed_for_habit(self, habit_id)
    }

    fn habit_entries_between(
        &self,
        habit_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitEntry>> {
        EntryRepo::range_for_habit(self, habit_id, Some(start), Some(end))
    }

    fn entries_between(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitEntry>> {
        EntryRepo::range_for_user(self, user_id, start, end)
    }

    fn update_streaks(&self, habit_id: i64, streak: Streak) -> Result<()> {
        HabitRepo::set_streaks(self, habit_id, streak)
    }
}

/// Run `f` inside a transaction. Commits on `Ok`; any error rolls back every
/// write `f` made.
pub fn in_transaction<T>(conn: &Connection, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
    let tx = conn.unchecked_transaction()?;
    let value = f(&*tx)?;
    tx.commit()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::error::HabitError;
    use crate::models::NewHabit;

    #[test]
    fn transaction_rolls_back_on_error() {
        let conn = open_in_memory().unwrap();
        let user = UserRepo::create(&conn, "Ada", "ada@example.com").unwrap();
        let habit = HabitRepo::create(&conn, user.id, &NewHabit::named("Read")).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let result: Result<()> = in_transaction(&conn, |tx| {
            tx.insert_entry(habit.id, day, true)?;
            Err(HabitError::validation("abort"))
        });
        assert!(result.is_err());
        assert!(conn.entry(habit.id, day).unwrap().is_none());

        in_transaction(&conn, |tx| tx.insert_entry(habit.id, day, true)).unwrap();
        assert!(conn.entry(habit.id, day).unwrap().is_some());
    }
}
