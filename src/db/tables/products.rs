//! Product table operations

use rusqlite::Result as SqliteResult;

use super::super::Database;
use crate::models::Product;

impl Database {
    pub fn create_product(
        &self,
        name: &str,
        price: f64,
        category: Option<&str>,
    ) -> SqliteResult<Product> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO products (name, price, category) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, price, category],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Product {
            id,
            name: name.to_string(),
            price,
            category: category.map(|s| s.to_string()),
        })
    }

    pub fn list_products(&self) -> SqliteResult<Vec<Product>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, name, price, category FROM products ORDER BY id")?;
        let products = stmt
            .query_map([], |row| {
                Ok(Product {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    category: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(products)
    }

    /// All catalog names, for typo-tolerant matching of user mentions.
    pub fn product_names(&self) -> SqliteResult<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT name FROM products ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(names)
    }
}
