//! Order table operations

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::{Order, OrderDetail};

/// Timestamps are written as RFC 3339, but rows inserted through the
/// generated-SQL path fall back to SQLite's `datetime('now')` default.
fn parse_datetime(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        })
        .unwrap_or_else(|_| {
            log::warn!("[DB] unparseable order timestamp {:?}", raw);
            Utc::now()
        })
}

impl Database {
    pub fn create_order(&self, user_id: i64, product_id: i64) -> SqliteResult<Order> {
        self.create_order_at(user_id, product_id, Utc::now())
    }

    pub fn create_order_at(
        &self,
        user_id: i64,
        product_id: i64,
        created_at: DateTime<Utc>,
    ) -> SqliteResult<Order> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO orders (product_id, user_id, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![product_id, user_id, &created_at.to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Order {
            id,
            product_id,
            user_id,
            created_at,
        })
    }

    pub fn list_orders_for_user(&self, user_id: i64) -> SqliteResult<Vec<OrderDetail>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT o.id, p.name, p.price, o.created_at
             FROM orders o JOIN products p ON o.product_id = p.id
             WHERE o.user_id = ?1 ORDER BY o.id",
        )?;
        let orders = stmt
            .query_map([user_id], |row| {
                let created_at: String = row.get(3)?;
                Ok(OrderDetail {
                    id: row.get(0)?,
                    product_name: row.get(1)?,
                    price: row.get(2)?,
                    created_at: parse_datetime(&created_at),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(orders)
    }

    pub fn count_orders(&self) -> SqliteResult<i64> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
    }
}
