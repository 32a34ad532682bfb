use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::store::{in_transaction, HabitStore};
use crate::error::{HabitError, Result};
use crate::models::{Habit, HabitEntry};
use crate::tracker::streak::refresh_streaks;
use crate::utils::dates::parse_date;

#[derive(Debug, Clone)]
pub struct ToggleRequest {
    pub user_id: i64,
    pub habit_id: i64,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// Explicit state; `None` flips an existing entry or marks a new one done.
    pub completed: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Toggled {
    /// The habit with its freshly recomputed streak fields.
    pub habit: Habit,
    pub entry: HabitEntry,
}

/// Set or flip one day's completion, then recompute the habit's streaks.
///
/// The entry write and the streak write are separate store calls; a failure
/// in between leaves the entry written and the streaks stale. Wrap the call
/// in [`crate::db::store::in_transaction`] to make them one unit.
pub fn toggle_completion<S: HabitStore + ?Sized>(
    store: &S,
    request: &ToggleRequest,
    today: NaiveDate,
) -> Result<Toggled> {
    let date = match request.date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_date(raw)?,
        _ => return Err(HabitError::validation("Date is required")),
    };

    match store.habit(request.habit_id)? {
        Some(habit) if habit.user_id == request.user_id => {}
        _ => return Err(HabitError::habit_not_found()),
    }

    let entry = match store.entry(request.habit_id, date)? {
        Some(existing) => {
            let completed = request.completed.unwrap_or(!existing.completed);
            store.set_entry_completed(request.habit_id, date, completed)?;
            HabitEntry {
                completed,
                ..existing
            }
        }
        None => {
            let completed = request.completed.unwrap_or(true);
            store.insert_entry(request.habit_id, date, completed)?
        }
    };
    log::info!(
        "habit {} on {}: completed={}",
        request.habit_id,
        entry.date,
        entry.completed
    );

    refresh_streaks(store, request.habit_id, today)?;

    let habit = store
        .habit(request.habit_id)?
        .ok_or_else(HabitError::habit_not_found)?;
    Ok(Toggled { habit, entry })
}

/// [`toggle_completion`] against a SQLite connection, optionally inside one
/// transaction so the entry and streak writes land together or not at all.
pub fn toggle_on_connection(
    conn: &Connection,
    atomic: bool,
    request: &ToggleRequest,
    today: NaiveDate,
) -> Result<Toggled> {
    if atomic {
        in_transaction(conn, |tx| toggle_completion(tx, request, today))
    } else {
        toggle_completion(conn, request, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::db::open_in_memory;
    use crate::db::repository::{EntryRepo, HabitRepo, UserRepo};
    use crate::db::test_support::FailingStore;
    use crate::models::{NewHabit, User};
    use crate::utils::dates::format_date;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn setup() -> (Connection, User, Habit) {
        let conn = open_in_memory().unwrap();
        let user = UserRepo::create(&conn, "Ada", "ada@example.com").unwrap();
        let habit = HabitRepo::create(&conn, user.id, &NewHabit::named("Read")).unwrap();
        (conn, user, habit)
    }

    fn request(user: &User, habit: &Habit, days_ago: i64, completed: Option<bool>) -> ToggleRequest {
        ToggleRequest {
            user_id: user.id,
            habit_id: habit.id,
            date: Some(format_date(today() - Duration::days(days_ago))),
            completed,
        }
    }

    fn entry_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM habit_entries", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn new_entries_default_to_completed() {
        let (conn, user, habit) = setup();
        let toggled = toggle_completion(&conn, &request(&user, &habit, 0, None), today()).unwrap();
        assert!(toggled.entry.completed);
        assert_eq!(toggled.habit.current_streak, 1);
        assert_eq!(toggled.habit.longest_streak, 1);
    }

    #[test]
    fn toggling_twice_restores_the_entry_without_duplicates() {
        let (conn, user, habit) = setup();
        toggle_completion(&conn, &request(&user, &habit, 0, Some(true)), today()).unwrap();
        let second =
            toggle_completion(&conn, &request(&user, &habit, 0, Some(false)), today()).unwrap();

        assert!(!second.entry.completed);
        assert_eq!(entry_count(&conn), 1);
        let stored = EntryRepo::get(&conn, habit.id, today()).unwrap().unwrap();
        assert!(!stored.completed);
    }

    #[test]
    fn absent_flag_flips_existing_entry() {
        let (conn, user, habit) = setup();
        let first = toggle_completion(&conn, &request(&user, &habit, 0, None), today()).unwrap();
        let second = toggle_completion(&conn, &request(&user, &habit, 0, None), today()).unwrap();
        assert!(first.entry.completed);
        assert!(!second.entry.completed);
        assert_eq!(second.entry.id, first.entry.id);
    }

    #[test]
    fn unmarking_today_keeps_yesterday_in_reach() {
        let (conn, user, habit) = setup();
        toggle_completion(&conn, &request(&user, &habit, 1, Some(true)), today()).unwrap();
        let both = toggle_completion(&conn, &request(&user, &habit, 0, Some(true)), today()).unwrap();
        assert_eq!(both.habit.current_streak, 2);

        let after = toggle_completion(&conn, &request(&user, &habit, 0, Some(false)), today()).unwrap();
        // Yesterday alone is still in reach of today, so the streak survives
        // as a run of one.
        assert_eq!(after.habit.current_streak, 1);
        assert_eq!(after.habit.longest_streak, 2);

        // Once the reference day moves on, the lone completion is too old.
        let tomorrow = today() + Duration::days(1);
        let later = toggle_completion(&conn, &request(&user, &habit, 0, Some(false)), tomorrow).unwrap();
        assert_eq!(later.habit.current_streak, 0);
        assert_eq!(later.habit.longest_streak, 2);
    }

    #[test]
    fn clearing_every_completion_resets_longest_streak() {
        let (conn, user, habit) = setup();
        toggle_completion(&conn, &request(&user, &habit, 1, Some(true)), today()).unwrap();
        toggle_completion(&conn, &request(&user, &habit, 0, Some(true)), today()).unwrap();
        toggle_completion(&conn, &request(&user, &habit, 1, Some(false)), today()).unwrap();
        let cleared =
            toggle_completion(&conn, &request(&user, &habit, 0, Some(false)), today()).unwrap();
        assert_eq!(cleared.habit.current_streak, 0);
        assert_eq!(cleared.habit.longest_streak, 0);
    }

    #[test]
    fn missing_or_malformed_date_is_a_validation_error() {
        let (conn, user, habit) = setup();
        let mut req = request(&user, &habit, 0, None);
        req.date = None;
        assert!(matches!(
            toggle_completion(&conn, &req, today()),
            Err(HabitError::Validation(_))
        ));
        req.date = Some("  ".into());
        assert!(matches!(
            toggle_completion(&conn, &req, today()),
            Err(HabitError::Validation(_))
        ));
        req.date = Some("15/06/2024".into());
        assert!(matches!(
            toggle_completion(&conn, &req, today()),
            Err(HabitError::Validation(_))
        ));
        assert_eq!(entry_count(&conn), 0);
    }

    #[test]
    fn unknown_or_foreign_habits_are_not_found() {
        let (conn, user, habit) = setup();
        let other = UserRepo::create(&conn, "Bob", "bob@example.com").unwrap();

        let mut req = request(&other, &habit, 0, None);
        assert!(matches!(
            toggle_completion(&conn, &req, today()),
            Err(HabitError::NotFound { .. })
        ));

        req = request(&user, &habit, 0, None);
        req.habit_id = 999;
        assert!(matches!(
            toggle_completion(&conn, &req, today()),
            Err(HabitError::NotFound { .. })
        ));
        assert_eq!(entry_count(&conn), 0);
    }

    #[test]
    fn streak_write_failure_leaves_entry_with_stale_streaks() {
        let (conn, user, habit) = setup();
        let mut store = FailingStore::new(conn);
        store.fail_streak_updates = true;

        let err = toggle_completion(&store, &request(&user, &habit, 0, None), today()).unwrap_err();
        assert!(matches!(err, HabitError::Persistence(_)));

        let entry = EntryRepo::get(&store.inner, habit.id, today()).unwrap().unwrap();
        assert!(entry.completed);
        let stored = HabitRepo::get(&store.inner, habit.id).unwrap().unwrap();
        assert_eq!(stored.current_streak, 0);
    }

    #[test]
    fn transactional_toggle_commits_both_writes() {
        let (conn, user, habit) = setup();
        let req = request(&user, &habit, 0, None);
        let toggled = in_transaction(&conn, |tx| toggle_completion(tx, &req, today())).unwrap();
        assert_eq!(toggled.habit.current_streak, 1);
        assert_eq!(HabitRepo::get(&conn, habit.id).unwrap().unwrap().current_streak, 1);
        assert_eq!(entry_count(&conn), 1);
    }

    #[test]
    fn atomic_and_plain_paths_agree() {
        let (conn, user, habit) = setup();
        let req = request(&user, &habit, 0, None);
        let plain = toggle_on_connection(&conn, false, &req, today()).unwrap();
        let atomic = toggle_on_connection(&conn, true, &req, today()).unwrap();
        assert!(plain.entry.completed);
        assert!(!atomic.entry.completed);
        assert_eq!(atomic.habit.current_streak, 0);
        assert_eq!(entry_count(&conn), 1);
    }
}
