pub mod habits;
pub mod header;
pub mod overview;
pub mod statusbar;
pub mod streak;
