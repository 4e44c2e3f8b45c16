mod exec;
mod schema;
mod sqlite;
mod tables;

pub use exec::SqlOutcome;
pub use sqlite::Database;
