use chrono::Utc;
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        // Create parent directory if it doesn't exist
        if database_url != ":memory:" {
            if let Some(parent) = Path::new(database_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).ok();
                }
            }
        }

        let conn = Connection::open(database_url)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT UNIQUE,
                city TEXT,
                address TEXT,
                email TEXT UNIQUE
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                price REAL NOT NULL,
                category TEXT
            )",
            [],
        )?;

        // created_at has a default so generated INSERTs may omit it
        conn.execute(
            "CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL REFERENCES products(id),
                user_id INTEGER NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        Ok(())
    }

    /// Drop and recreate all tables.
    pub fn reset(&self) -> SqliteResult<()> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute("DROP TABLE IF EXISTS orders", [])?;
            conn.execute("DROP TABLE IF EXISTS products", [])?;
            conn.execute("DROP TABLE IF EXISTS users", [])?;
        }
        self.init()
    }

    /// Populate the demo catalog: three users, three products, three orders.
    /// Skipped when the catalog already has products; returns whether any
    /// rows were inserted.
    pub fn seed_demo_data(&self) -> SqliteResult<bool> {
        {
            let conn = self.conn.lock().unwrap();
            let existing: i64 =
                conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
            if existing > 0 {
                log::info!("[DB] catalog already populated, skipping demo seed");
                return Ok(false);
            }
        }

        let alice = self.create_user(
            "Alice",
            Some("1234567890"),
            Some("New York"),
            Some("123 Main St"),
            Some("alice@example.com"),
        )?;
        let bob = self.create_user(
            "Bob",
            Some("2345678901"),
            Some("Boston"),
            Some("456 Oak St"),
            Some("bob@example.com"),
        )?;
        self.create_user(
            "Charlie",
            Some("3456789012"),
            Some("Chicago"),
            Some("789 Pine St"),
            Some("charlie@example.com"),
        )?;

        let lunch_box = self.create_product("Boite lunch Box", 18.0, Some("Kitchen"))?;
        let wall_lamp = self.create_product("Solar interaction wall lamp", 23.0, Some("Lighting"))?;
        let juicer = self.create_product("Presse Agrume Silver Crest", 38.0, Some("Kitchen"))?;

        let now = Utc::now();
        self.create_order_at(alice.id, lunch_box.id, now)?;
        self.create_order_at(alice.id, wall_lamp.id, now)?;
        self.create_order_at(bob.id, juicer.id, now)?;

        log::info!("[DB] demo data seeded");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_tables() {
        let db = Database::new(":memory:").unwrap();
        let conn = db.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'products', 'orders')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn seed_is_idempotent() {
        let db = Database::new(":memory:").unwrap();
        assert!(db.seed_demo_data().unwrap());
        assert!(!db.seed_demo_data().unwrap());
        assert_eq!(db.list_products().unwrap().len(), 3);
        assert_eq!(db.list_users().unwrap().len(), 3);
    }

    #[test]
    fn reset_clears_rows() {
        let db = Database::new(":memory:").unwrap();
        db.seed_demo_data().unwrap();
        db.reset().unwrap();
        assert!(db.list_products().unwrap().is_empty());
        assert!(db.seed_demo_data().unwrap());
    }

    #[test]
    fn new_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shop.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        db.seed_demo_data().unwrap();
        assert!(path.exists());
    }
}
