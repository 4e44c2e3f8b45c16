//! User table operations

use rusqlite::{OptionalExtension, Result as SqliteResult};

use super::super::Database;
use crate::models::User;

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        city: row.get(3)?,
        address: row.get(4)?,
        email: row.get(5)?,
    })
}

impl Database {
    /// Look up a user by id. `Ok(None)` means the id is absent; an `Err`
    /// is a real query failure, which callers must keep distinct.
    pub fn get_user(&self, id: i64) -> SqliteResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, phone, city, address, email FROM users WHERE id = ?1",
        )?;
        stmt.query_row([id], user_from_row).optional()
    }

    pub fn create_user(
        &self,
        name: &str,
        phone: Option<&str>,
        city: Option<&str>,
        address: Option<&str>,
        email: Option<&str>,
    ) -> SqliteResult<User> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (name, phone, city, address, email) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![name, phone, city, address, email],
        )?;
        let id = conn.last_insert_rowid();

        Ok(User {
            id,
            name: name.to_string(),
            phone: phone.map(|s| s.to_string()),
            city: city.map(|s| s.to_string()),
            address: address.map(|s| s.to_string()),
            email: email.map(|s| s.to_string()),
        })
    }

    pub fn list_users(&self) -> SqliteResult<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, name, phone, city, address, email FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], user_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(users)
    }
}
