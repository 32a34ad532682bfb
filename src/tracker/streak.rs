use chrono::NaiveDate;

use crate::db::store::HabitStore;
use crate::error::{HabitError, Result};
use crate::models::{HabitEntry, Streak};
use crate::utils::dates::day_gap;

/// Derive current and longest streak from a habit's entries as of `today`.
///
/// Only completed entries count. The current streak is alive when the most
/// recent completion is today or yesterday; it then extends backwards over
/// consecutive calendar days and stops at the first gap. The longest streak
/// folds in `previous_longest`, except that a habit with no completions at
/// all is reset to zero on both counts.
pub fn recompute(entries: &[HabitEntry], previous_longest: u32, today: NaiveDate) -> Streak {
    let mut dates: Vec<NaiveDate> = entries
        .iter()
        .filter(|e| e.completed)
        .map(|e| e.date)
        .collect();
    dates.sort();

    let Some(&latest) = dates.last() else {
        return Streak::default();
    };

    let mut current = 0u32;
    let yesterday = today.pred_opt().unwrap_or(today);
    if latest == today || latest == yesterday {
        current = 1;
        for pair in dates.windows(2).rev() {
            if day_gap(pair[0], pair[1]) == 1 {
                current += 1;
            } else {
                break;
            }
        }
    }

    Streak {
        current,
        longest: current.max(previous_longest),
    }
}

/// Recompute a habit's streaks from storage and persist them.
pub fn refresh_streaks<S: HabitStore + ?Sized>(
    store: &S,
    habit_id: i64,
    today: NaiveDate,
) -> Result<Streak> {
    let completed = store.completed_entries(habit_id)?;

    let streak = if completed.is_empty() {
        Streak::default()
    } else {
        let habit = store.habit(habit_id)?.ok_or_else(HabitError::habit_not_found)?;
        recompute(&completed, habit.longest_streak, today)
    };

    store.update_streaks(habit_id, streak)?;
    log::debug!(
        "habit {} streaks now current={} longest={}",
        habit_id,
        streak.current,
        streak.longest
    );
    Ok(streak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn entry(days_ago: i64, completed: bool) -> HabitEntry {
        HabitEntry {
            id: days_ago,
            habit_id: 1,
            date: today() - Duration::days(days_ago),
            completed,
            created_at: String::new(),
        }
    }

    fn done(days_ago: &[i64]) -> Vec<HabitEntry> {
        days_ago.iter().map(|&d| entry(d, true)).collect()
    }

    #[test]
    fn no_completions_resets_both_counts() {
        assert_eq!(recompute(&[], 9, today()), Streak::default());
        let misses = vec![entry(0, false), entry(1, false)];
        // The historical best is dropped too.
        assert_eq!(recompute(&misses, 9, today()), Streak { current: 0, longest: 0 });
    }

    #[test]
    fn stale_latest_completion_breaks_current_streak() {
        let streak = recompute(&done(&[4, 3, 2]), 3, today());
        assert_eq!(streak.current, 0);
        assert_eq!(streak.longest, 3);
    }

    #[test]
    fn consecutive_days_ending_today() {
        assert_eq!(recompute(&done(&[2, 1, 0]), 0, today()).current, 3);
    }

    #[test]
    fn consecutive_days_ending_yesterday_still_count() {
        assert_eq!(recompute(&done(&[3, 2, 1]), 0, today()).current, 3);
    }

    #[test]
    fn a_gap_stops_the_walk() {
        assert_eq!(recompute(&done(&[2, 0]), 0, today()).current, 1);
        // Older runs before the gap are not added on.
        assert_eq!(recompute(&done(&[6, 5, 4, 1, 0]), 0, today()).current, 2);
    }

    #[test]
    fn unordered_input_is_sorted_first() {
        assert_eq!(recompute(&done(&[0, 2, 1]), 0, today()).current, 3);
    }

    #[test]
    fn incomplete_entries_are_ignored() {
        let entries = vec![entry(2, true), entry(1, false), entry(0, true)];
        assert_eq!(recompute(&entries, 0, today()).current, 1);
    }

    #[test]
    fn future_completions_do_not_start_a_streak() {
        let streak = recompute(&done(&[-1]), 0, today());
        assert_eq!(streak.current, 0);
    }

    #[test]
    fn longest_never_drops_while_completions_exist() {
        let mut longest = 0;
        let history: [&[i64]; 4] = [&[0], &[1, 0], &[3, 1, 0], &[10]];
        for days in history {
            let streak = recompute(&done(days), longest, today());
            assert!(streak.longest >= longest);
            assert!(streak.longest >= streak.current);
            longest = streak.longest;
        }
        assert_eq!(longest, 2);
    }

    #[test]
    fn gap_is_calendar_based_across_month_and_dst_edges() {
        let march = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let entries: Vec<HabitEntry> = [9, 10, 11]
            .iter()
            .map(|&day| HabitEntry {
                id: day as i64,
                habit_id: 1,
                date: march(day),
                completed: true,
                created_at: String::new(),
            })
            .collect();
        assert_eq!(recompute(&entries, 0, march(11)).current, 3);
    }
}
