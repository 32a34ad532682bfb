//! Streak and statistics engine.
//!
//! Every operation takes the store it reads from and the reference day it
//! computes against; nothing here reads the wall clock.

pub mod detail;
pub mod stats;
pub mod streak;
pub mod toggle;

pub use detail::{habit_detail, HabitDetail};
pub use stats::{habit_stats, DEFAULT_WINDOW_DAYS};
pub use toggle::{toggle_on_connection, ToggleRequest};
