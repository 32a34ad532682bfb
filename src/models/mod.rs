pub mod habit;
pub mod stats;
pub mod user;

pub use habit::{Habit, HabitEntry, Importance, NewHabit};
pub use stats::{DayCompletion, HabitBreakdown, HabitStats, OverallStats, Streak};
pub use user::User;
