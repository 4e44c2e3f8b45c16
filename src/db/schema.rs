//! Live schema introspection, used to ground the model's view of the data.

use rusqlite::Result as SqliteResult;

use super::Database;

struct ForeignKey {
    from: String,
    table: String,
    to: String,
}

impl Database {
    /// Render the current schema as one text block: a `Table:` paragraph per
    /// table, one `- name: TYPE` line per column, primary and foreign keys
    /// annotated. Tables and columns appear in the order the driver reports
    /// them (creation order for SQLite).
    pub fn describe_schema(&self) -> SqliteResult<String> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        let mut schema = String::new();
        for table in &tables {
            schema.push_str(&format!("Table: {}\n", table));

            // table_info does not carry foreign keys, so fetch them up front
            let mut fk_stmt = conn.prepare(&format!("PRAGMA foreign_key_list({})", table))?;
            let foreign_keys: Vec<ForeignKey> = fk_stmt
                .query_map([], |row| {
                    let to: Option<String> = row.get(4)?;
                    Ok(ForeignKey {
                        from: row.get(3)?,
                        table: row.get(2)?,
                        // a bare REFERENCES t points at t's primary key
                        to: to.unwrap_or_else(|| "id".to_string()),
                    })
                })?
                .filter_map(|r| r.ok())
                .collect();

            let mut col_stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
            let columns: Vec<(String, String, bool)> = col_stmt
                .query_map([], |row| {
                    let name: String = row.get(1)?;
                    let col_type: String = row.get(2)?;
                    let pk: i32 = row.get(5)?;
                    Ok((name, col_type, pk != 0))
                })?
                .filter_map(|r| r.ok())
                .collect();

            for (name, col_type, pk) in columns {
                let mut annotated = col_type;
                if pk {
                    annotated.push_str(", Primary Key");
                }
                if let Some(fk) = foreign_keys.iter().find(|fk| fk.from == name) {
                    annotated.push_str(&format!(", Foreign Key to {}.{}", fk.table, fk.to));
                }
                schema.push_str(&format!("- {}: {}\n", name, annotated));
            }
            schema.push('\n');
        }

        log::debug!("[SCHEMA] described {} tables", tables.len());
        Ok(schema)
    }
}
