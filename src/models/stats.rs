use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Importance;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCompletion {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitBreakdown {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub importance: Importance,
    pub completion_rate: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_entries: u32,
    pub completed_entries: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_habits: u32,
    pub avg_completion_rate: u32,
    pub current_streak_sum: u32,
    pub longest_streak_sum: u32,
}

/// Read-only report over a window of days ending today.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub completion_per_day: Vec<DayCompletion>,
    pub habit_breakdown: Vec<HabitBreakdown>,
    pub overall_stats: OverallStats,
}

impl HabitStats {
    /// Days in the series where every habit was completed.
    pub fn perfect_days(&self) -> u32 {
        self.completion_per_day
            .iter()
            .filter(|d| d.total > 0 && d.completed >= d.total)
            .count() as u32
    }
}
