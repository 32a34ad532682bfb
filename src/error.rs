use thiserror::Error;

/// Outcomes a tracker operation can fail with. None of them are retried.
#[derive(Error, Debug)]
pub enum HabitError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{0}")]
    Validation(String),

    #[error("storage failure: {0}")]
    Persistence(#[from] rusqlite::Error),
}

impl HabitError {
    pub fn habit_not_found() -> Self {
        HabitError::NotFound { entity: "Habit" }
    }

    pub fn user_not_found() -> Self {
        HabitError::NotFound { entity: "User" }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        HabitError::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, HabitError>;
