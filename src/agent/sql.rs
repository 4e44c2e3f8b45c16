//! NL-to-SQL conversion and execution of the generated statements.

use once_cell::sync::Lazy;
use regex::Regex;

use super::NodeContext;
use crate::ai::{strip_think_tags, Message};
use crate::state::AgentState;

const MAX_ATTEMPTS: u32 = 3;

static SQL_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```sql\s*(.+?)\s*```").expect("valid regex"));

/// Convert the (catalog-corrected) question into SQL. Skipped when no
/// validated products are available; gives up after `MAX_ATTEMPTS`
/// regenerations. A prior execution error is fed back into the prompt so
/// the model can correct the query.
pub async fn convert_nl_to_sql(ctx: &NodeContext, state: AgentState) -> AgentState {
    if !state.product_exists || state.corrected_products.is_empty() {
        log::info!("[SQL] no validated product items, skipping SQL generation");
        return AgentState {
            sql_query: Vec::new(),
            ..state
        };
    }

    if state.attempts >= MAX_ATTEMPTS {
        log::warn!("[SQL] giving up after {} attempts", MAX_ATTEMPTS);
        return AgentState {
            sql_query: Vec::new(),
            sql_error: true,
            sql_error_message: format!(
                "Failed to generate a valid SQL query after {} attempts",
                MAX_ATTEMPTS
            ),
            ..state
        };
    }

    let schema = ctx.db.describe_schema().unwrap_or_else(|e| {
        log::error!("[SQL] schema introspection failed: {}", e);
        String::new()
    });
    let current_user = state.current_user.name().unwrap_or("Unknown").to_string();

    let product_list = state
        .corrected_products
        .iter()
        .map(|p| format!("'{}'", p))
        .collect::<Vec<_>>()
        .join(", ");

    let mut system = format!(
        "You are an assistant that converts natural language questions into SQL queries based \
         on the following schema:\n\n{schema}\n\
         The current user is '{current_user}'. The product items for this query are \
         [{product_list}]. Use these values directly in the SQL query without placeholders.\n\
         For INSERT queries to create orders (e.g., 'Make a new order for X'), generate an \
         INSERT statement using a JOIN approach: \
         `INSERT INTO orders (user_id, product_id) SELECT u.id, p.id FROM users u JOIN products p \
         ON p.name = '<product>' WHERE u.name = '<current_user>'`.\n\
         For multiple distinct product items, list them all in an IN clause: \
         `INSERT INTO orders (user_id, product_id) SELECT u.id, p.id FROM users u JOIN products p \
         ON p.name IN ('<product1>', '<product2>') WHERE u.name = '<current_user>'`.\n\
         Note: INSERT statements do not return rows, only modify the database.\n\
         For queries asking about the available products, use: \
         `SELECT name, price FROM products`.\n\
         For queries about a user's orders (e.g., 'Show me my orders'), use: \
         `SELECT o.id, p.name, p.price FROM orders o JOIN products p ON o.product_id = p.id \
         WHERE o.user_id = (SELECT id FROM users WHERE name = '<current_user>')`.\n\
         Provide ONE query for all product items, wrapped in ```sql ... ``` tags, with no \
         explanations."
    );

    if state.sql_error && !state.sql_error_message.is_empty() {
        system.push_str(&format!(
            "\n\nThe previous SQL query failed with the error: '{}'. Correct the query to \
             resolve this error, adhering to the schema and using the current user and \
             corrected product items directly.",
            state.sql_error_message
        ));
        log::info!("[SQL] asking the model to correct a failed query");
    }

    let messages = vec![
        Message::system(system),
        Message::user(format!("Question: {}", state.question)),
    ];

    let raw = match ctx.ai.generate_text(messages).await {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("[SQL] model call failed: {}", e);
            return AgentState {
                sql_query: Vec::new(),
                sql_error: true,
                sql_error_message: e,
                ..state
            };
        }
    };

    let queries = extract_sql_blocks(&raw);
    if queries.is_empty() {
        log::warn!("[SQL] no SQL block in model output: {:?}", strip_think_tags(&raw));
        return AgentState {
            sql_query: Vec::new(),
            sql_error: true,
            sql_error_message: "No SQL query found in model output".to_string(),
            ..state
        };
    }
    log::info!("[SQL] generated {} quer(ies)", queries.len());

    // A regeneration triggered by an execution error counts as an attempt.
    let attempts = if state.sql_error {
        state.attempts + 1
    } else {
        state.attempts
    };

    AgentState {
        sql_query: queries,
        attempts,
        ..state
    }
}

/// Run the first generated statement. All failures land in
/// `sql_error`/`sql_error_message` on the returned state; nothing is thrown.
pub fn execute_sql(ctx: &NodeContext, state: AgentState) -> AgentState {
    let Some(query) = state.sql_query.first().cloned() else {
        return AgentState {
            sql_error: true,
            sql_error_message: "No SQL query provided".to_string(),
            ..state
        };
    };

    log::info!("[SQL] executing: {}", query);
    match ctx.db.execute_generated(&query) {
        Ok(outcome) => {
            log::info!(
                "[SQL] executed successfully, {} row(s)",
                outcome.row_count
            );
            AgentState {
                query_rows: outcome.rows,
                row_count: outcome.row_count,
                sql_error: false,
                sql_error_message: String::new(),
                ..state
            }
        }
        Err(e) => {
            log::error!("[SQL] execution failed: {}", e);
            AgentState {
                sql_error: true,
                sql_error_message: e.to_string(),
                ..state
            }
        }
    }
}

fn extract_sql_blocks(raw: &str) -> Vec<String> {
    let cleaned = strip_think_tags(raw);
    SQL_BLOCK
        .captures_iter(&cleaned)
        .map(|cap| cap[1].trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}
