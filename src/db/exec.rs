//! Execution of model-generated SQL against the live connection.

use rusqlite::types::ValueRef;
use rusqlite::Result as SqliteResult;

use super::Database;

/// Result of running one generated statement: rendered rows for SELECTs,
/// affected-row count for everything else.
#[derive(Debug, Clone, Default)]
pub struct SqlOutcome {
    pub rows: Vec<String>,
    pub row_count: usize,
}

impl Database {
    pub fn execute_generated(&self, sql: &str) -> SqliteResult<SqlOutcome> {
        let conn = self.conn.lock().unwrap();

        let is_query = sql
            .trim_start()
            .get(..6)
            .map(|s| s.eq_ignore_ascii_case("select"))
            .unwrap_or(false);

        if is_query {
            let mut stmt = conn.prepare(sql)?;
            let column_count = stmt.column_count();
            let mut raw_rows = stmt.query([])?;
            let mut rows = Vec::new();
            while let Some(row) = raw_rows.next()? {
                let mut fields = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    fields.push(render_value(row.get_ref(i)?));
                }
                rows.push(fields.join(", "));
            }
            let row_count = rows.len();
            Ok(SqlOutcome { rows, row_count })
        } else {
            let row_count = conn.execute(sql, [])?;
            Ok(SqlOutcome {
                rows: Vec::new(),
                row_count,
            })
        }
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Database;

    #[test]
    fn select_renders_rows_as_text() {
        let db = Database::new(":memory:").unwrap();
        db.seed_demo_data().unwrap();
        let outcome = db
            .execute_generated("SELECT name, price FROM products ORDER BY id")
            .unwrap();
        assert_eq!(outcome.row_count, 3);
        assert_eq!(outcome.rows[0], "Boite lunch Box, 18");
    }

    #[test]
    fn insert_reports_affected_rows() {
        let db = Database::new(":memory:").unwrap();
        db.seed_demo_data().unwrap();
        let outcome = db
            .execute_generated(
                "INSERT INTO orders (user_id, product_id) \
                 SELECT u.id, p.id FROM users u JOIN products p \
                 ON p.name = 'Boite lunch Box' WHERE u.name = 'Alice'",
            )
            .unwrap();
        assert_eq!(outcome.row_count, 1);
        assert!(outcome.rows.is_empty());
    }

    #[test]
    fn invalid_sql_is_an_error() {
        let db = Database::new(":memory:").unwrap();
        assert!(db.execute_generated("SELECT nope FROM nothing").is_err());
    }
}
