use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{HabitError, Result};
use crate::models::{Habit, HabitEntry, Importance, NewHabit, Streak, User};
use crate::utils::dates::{format_date, DATE_FORMAT};

fn stored_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub struct UserRepo;

impl UserRepo {
    pub fn create(conn: &Connection, name: &str, email: &str) -> Result<User> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(HabitError::validation("Name is required"));
        }
        if !email.contains('@') {
            return Err(HabitError::validation(format!("'{}' is not a valid email", email)));
        }
        if Self::find_by_email(conn, email)?.is_some() {
            return Err(HabitError::validation("User with this email already exists"));
        }

        conn.execute(
            "INSERT INTO users (name, email) VALUES (?1, ?2)",
            params![name, email],
        )?;
        let id = conn.last_insert_rowid();
        Self::get(conn, id)?.ok_or_else(HabitError::user_not_found)
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<User>> {
        conn.query_row(
            "SELECT id, name, email, created_at FROM users WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .optional()
        .map_err(HabitError::from)
    }

    pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
        conn.query_row(
            "SELECT id, name, email, created_at FROM users WHERE email = ?1 COLLATE NOCASE",
            params![email.trim()],
            Self::from_row,
        )
        .optional()
        .map_err(HabitError::from)
    }

    /// Removes the user; habits and entries go with it.
    pub fn delete(conn: &Connection, id: i64) -> Result<()> {
        let removed = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(HabitError::user_not_found());
        }
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

// ─── Habits ──────────────────────────────────────────────────────────────────

const HABIT_COLUMNS: &str =
    "id, user_id, name, description, importance, created_at, current_streak, longest_streak";

pub struct HabitRepo;

impl HabitRepo {
    pub fn create(conn: &Connection, user_id: i64, input: &NewHabit) -> Result<Habit> {
        let name = input.validated_name()?;
        let importance = match input.importance {
            Some(v) => Importance::new(v)?,
            None => Importance::default(),
        };

        conn.execute(
            "INSERT INTO habits (user_id, name, description, importance, current_streak, longest_streak)
             VALUES (?1, ?2, ?3, ?4, 0, 0)",
            params![user_id, name, input.description, importance.value()],
        )?;
        let id = conn.last_insert_rowid();
        Self::get(conn, id)?.ok_or_else(HabitError::habit_not_found)
    }

    pub fn get(conn: &Connection, id: i64) -> Result<Option<Habit>> {
        conn.query_row(
            &format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS),
            params![id],
            Self::from_row,
        )
        .optional()
        .map_err(HabitError::from)
    }

    /// The habit if it exists and belongs to `user_id`.
    pub fn get_owned(conn: &Connection, user_id: i64, id: i64) -> Result<Habit> {
        match Self::get(conn, id)? {
            Some(habit) if habit.user_id == user_id => Ok(habit),
            _ => Err(HabitError::habit_not_found()),
        }
    }

    /// Newest first.
    pub fn list_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Habit>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM habits WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
            HABIT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(HabitError::from)
    }

    /// Absent description/importance keep their previous values.
    pub fn update(conn: &Connection, user_id: i64, id: i64, input: &NewHabit) -> Result<Habit> {
        let name = input.validated_name()?;
        let existing = Self::get_owned(conn, user_id, id)?;
        let description = input.description.clone().or(existing.description);
        let importance = match input.importance {
            Some(v) => Importance::new(v)?,
            None => existing.importance,
        };

        conn.execute(
            "UPDATE habits SET name = ?1, description = ?2, importance = ?3 WHERE id = ?4",
            params![name, description, importance.value(), id],
        )?;
        Self::get(conn, id)?.ok_or_else(HabitError::habit_not_found)
    }

    pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
        Self::get_owned(conn, user_id, id)?;
        conn.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn set_streaks(conn: &Connection, id: i64, streak: Streak) -> Result<()> {
        let updated = conn.execute(
            "UPDATE habits SET current_streak = ?1, longest_streak = ?2 WHERE id = ?3",
            params![streak.current, streak.longest, id],
        )?;
        if updated == 0 {
            return Err(HabitError::habit_not_found());
        }
        Ok(())
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let importance: i64 = row.get(4)?;
        Ok(Habit {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            importance: Importance::new(importance).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(e))
            })?,
            created_at: row.get(5)?,
            current_streak: row.get(6)?,
            longest_streak: row.get(7)?,
        })
    }
}

// ─── Entries ─────────────────────────────────────────────────────────────────

pub struct EntryRepo;

impl EntryRepo {
    pub fn get(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<Option<HabitEntry>> {
        conn.query_row(
            "SELECT id, habit_id, date, completed, created_at
             FROM habit_entries WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, format_date(date)],
            Self::from_row,
        )
        .optional()
        .map_err(HabitError::from)
    }

    pub fn insert(
        conn: &Connection,
        habit_id: i64,
        date: NaiveDate,
        completed: bool,
    ) -> Result<HabitEntry> {
        conn.execute(
            "INSERT INTO habit_entries (habit_id, date, completed) VALUES (?1, ?2, ?3)",
            params![habit_id, format_date(date), completed],
        )?;
        Self::get(conn, habit_id, date)?.ok_or_else(|| HabitError::NotFound { entity: "Entry" })
    }

    pub fn set_completed(
        conn: &Connection,
        habit_id: i64,
        date: NaiveDate,
        completed: bool,
    ) -> Result<()> {
        conn.execute(
            "UPDATE habit_entries SET completed = ?1 WHERE habit_id = ?2 AND date = ?3",
            params![completed, habit_id, format_date(date)],
        )?;
        Ok(())
    }

    /// Completed entries of one habit, oldest first.
    pub fn completed_for_habit(conn: &Connection, habit_id: i64) -> Result<Vec<HabitEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, date, completed, created_at
             FROM habit_entries WHERE habit_id = ?1 AND completed = 1
             ORDER BY date",
        )?;
        let rows = stmt.query_map(params![habit_id], Self::from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(HabitError::from)
    }

    /// Entries of one habit, optionally bounded on either side (inclusive).
    pub fn range_for_habit(
        conn: &Connection,
        habit_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<HabitEntry>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, date, completed, created_at
             FROM habit_entries
             WHERE habit_id = ?1
               AND (?2 IS NULL OR date >= ?2)
               AND (?3 IS NULL OR date <= ?3)
             ORDER BY date",
        )?;
        let rows = stmt.query_map(
            params![habit_id, from.map(format_date), to.map(format_date)],
            Self::from_row,
        )?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(HabitError::from)
    }

    /// All entries of a user's habits with `start <= date <= end`.
    pub fn range_for_user(
        conn: &Connection,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitEntry>> {
        let mut stmt = conn.prepare(
            "SELECT e.id, e.habit_id, e.date, e.completed, e.created_at
             FROM habit_entries e
             JOIN habits h ON h.id = e.habit_id
             WHERE h.user_id = ?1 AND e.date >= ?2 AND e.date <= ?3
             ORDER BY e.date, e.habit_id",
        )?;
        let rows = stmt.query_map(
            params![user_id, format_date(start), format_date(end)],
            Self::from_row,
        )?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(HabitError::from)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<HabitEntry> {
        Ok(HabitEntry {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            date: stored_date(row, 2)?,
            completed: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

// ─── App meta ────────────────────────────────────────────────────────────────

pub struct MetaRepo;

impl MetaRepo {
    pub const ACTIVE_USER: &'static str = "active_user_id";

    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(HabitError::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn remove(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM app_meta WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn setup() -> (Connection, User) {
        let conn = open_in_memory().unwrap();
        let user = UserRepo::create(&conn, "Ada", "ada@example.com").unwrap();
        (conn, user)
    }

    #[test]
    fn duplicate_emails_are_rejected() {
        let (conn, _) = setup();
        let err = UserRepo::create(&conn, "Other Ada", "ADA@example.com").unwrap_err();
        assert!(matches!(err, HabitError::Validation(_)));
        assert!(matches!(
            UserRepo::create(&conn, "", "x@example.com"),
            Err(HabitError::Validation(_))
        ));
        assert!(matches!(
            UserRepo::create(&conn, "X", "not-an-email"),
            Err(HabitError::Validation(_))
        ));
    }

    #[test]
    fn new_habits_start_with_zero_streaks() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &NewHabit::named("Read")).unwrap();
        assert_eq!(habit.user_id, user.id);
        assert_eq!(habit.importance, Importance::default());
        assert_eq!(habit.current_streak, 0);
        assert_eq!(habit.longest_streak, 0);
        assert_eq!(habit.description, None);
    }

    #[test]
    fn habits_list_newest_first() {
        let (conn, user) = setup();
        let first = HabitRepo::create(&conn, user.id, &NewHabit::named("Read")).unwrap();
        let second = HabitRepo::create(&conn, user.id, &NewHabit::named("Run")).unwrap();
        let ids: Vec<i64> = HabitRepo::list_for_user(&conn, user.id)
            .unwrap()
            .iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn update_keeps_unspecified_fields() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(
            &conn,
            user.id,
            &NewHabit {
                name: "Read".into(),
                description: Some("20 pages".into()),
                importance: Some(8),
            },
        )
        .unwrap();

        let updated =
            HabitRepo::update(&conn, user.id, habit.id, &NewHabit::named("Read more")).unwrap();
        assert_eq!(updated.name, "Read more");
        assert_eq!(updated.description.as_deref(), Some("20 pages"));
        assert_eq!(updated.importance.value(), 8);

        let err = HabitRepo::update(&conn, user.id, habit.id, &NewHabit::named(" ")).unwrap_err();
        assert!(matches!(err, HabitError::Validation(_)));
    }

    #[test]
    fn habits_of_other_users_are_not_found() {
        let (conn, user) = setup();
        let other = UserRepo::create(&conn, "Bob", "bob@example.com").unwrap();
        let habit = HabitRepo::create(&conn, user.id, &NewHabit::named("Read")).unwrap();

        assert!(matches!(
            HabitRepo::get_owned(&conn, other.id, habit.id),
            Err(HabitError::NotFound { .. })
        ));
        assert!(matches!(
            HabitRepo::delete(&conn, other.id, habit.id),
            Err(HabitError::NotFound { .. })
        ));
    }

    #[test]
    fn deleting_a_user_cascades_to_habits_and_entries() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &NewHabit::named("Read")).unwrap();
        EntryRepo::insert(&conn, habit.id, d("2024-05-01"), true).unwrap();

        UserRepo::delete(&conn, user.id).unwrap();

        assert!(HabitRepo::get(&conn, habit.id).unwrap().is_none());
        let entries: i64 = conn
            .query_row("SELECT COUNT(*) FROM habit_entries", [], |row| row.get(0))
            .unwrap();
        assert_eq!(entries, 0);
    }

    #[test]
    fn one_entry_per_habit_and_date() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &NewHabit::named("Read")).unwrap();
        EntryRepo::insert(&conn, habit.id, d("2024-05-01"), true).unwrap();
        let dup = EntryRepo::insert(&conn, habit.id, d("2024-05-01"), false);
        assert!(matches!(dup, Err(HabitError::Persistence(_))));
    }

    #[test]
    fn entry_ranges_are_inclusive_and_ordered() {
        let (conn, user) = setup();
        let habit = HabitRepo::create(&conn, user.id, &NewHabit::named("Read")).unwrap();
        for (day, done) in [("2024-05-03", true), ("2024-05-01", false), ("2024-05-02", true)] {
            EntryRepo::insert(&conn, habit.id, d(day), done).unwrap();
        }

        let all = EntryRepo::range_for_habit(&conn, habit.id, None, None).unwrap();
        let dates: Vec<NaiveDate> = all.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![d("2024-05-01"), d("2024-05-02"), d("2024-05-03")]);

        let bounded =
            EntryRepo::range_for_habit(&conn, habit.id, Some(d("2024-05-02")), Some(d("2024-05-03")))
                .unwrap();
        assert_eq!(bounded.len(), 2);

        let completed = EntryRepo::completed_for_habit(&conn, habit.id).unwrap();
        assert_eq!(completed.len(), 2);
        assert!(completed.iter().all(|e| e.completed));

        let windowed =
            EntryRepo::range_for_user(&conn, user.id, d("2024-05-01"), d("2024-05-02")).unwrap();
        assert_eq!(windowed.len(), 2);
    }

    #[test]
    fn meta_round_trip() {
        let (conn, _) = setup();
        assert_eq!(MetaRepo::get(&conn, MetaRepo::ACTIVE_USER).unwrap(), None);
        MetaRepo::set(&conn, MetaRepo::ACTIVE_USER, "1").unwrap();
        MetaRepo::set(&conn, MetaRepo::ACTIVE_USER, "2").unwrap();
        assert_eq!(
            MetaRepo::get(&conn, MetaRepo::ACTIVE_USER).unwrap().as_deref(),
            Some("2")
        );
        MetaRepo::remove(&conn, MetaRepo::ACTIVE_USER).unwrap();
        assert_eq!(MetaRepo::get(&conn, MetaRepo::ACTIVE_USER).unwrap(), None);
    }
}
