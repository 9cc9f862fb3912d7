pub mod conversation;
pub mod mood;
pub mod sqlite;
pub mod users;

pub use mood::MoodCalendarEntry;
pub use sqlite::SqliteStore;
