use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{HabitError, Result};

/// User-assigned priority on a 1-10 scale. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Importance(u8);

impl Importance {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Importance(v)),
            _ => Err(HabitError::validation(format!(
                "Importance must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                value
            ))),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            8.. => "High",
            5..=7 => "Medium",
            _ => "Low",
        }
    }
}

impl Default for Importance {
    fn default() -> Self {
        Importance(5)
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub importance: Importance,
    pub created_at: String,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// One day's completion record. Unique per (habit, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitEntry {
    pub id: i64,
    pub habit_id: i64,
    pub date: NaiveDate,
    pub completed: bool,
    pub created_at: String,
}

/// Fields accepted when creating or editing a habit.
#[derive(Debug, Clone, Default)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub importance: Option<i64>,
}

impl NewHabit {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Trimmed name, rejecting blanks.
    pub fn validated_name(&self) -> Result<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(HabitError::validation("Habit name is required"));
        }
        Ok(name.to_string())
    }
}
