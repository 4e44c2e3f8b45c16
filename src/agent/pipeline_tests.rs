//! Full-turn integration tests for the pipeline, driven by a mock model.

use std::sync::Arc;

use super::{run_turn, NodeContext};
use crate::ai::AiClient;
use crate::db::Database;
use crate::state::{AgentState, Configurable, RunConfig, UserResolution};

/// Wire up a seeded in-memory database and a mock model with canned
/// responses, one per expected model call.
fn harness(responses: Vec<&str>) -> NodeContext {
    let db = Arc::new(Database::new(":memory:").expect("in-memory db"));
    db.seed_demo_data().expect("seed");
    NodeContext {
        db,
        ai: AiClient::mock(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
    }
}

fn turn(question: &str, user_id: Option<i64>) -> (AgentState, RunConfig) {
    (
        AgentState {
            question: question.to_string(),
            ..Default::default()
        },
        RunConfig {
            configurable: Configurable {
                current_user_id: user_id,
            },
        },
    )
}

#[tokio::test]
async fn order_turn_inserts_and_confirms() {
    let ctx = harness(vec![
        "relevant",
        r#"{"raw_product_string": "boite lunch box"}"#,
        r#"["Boite lunch Box"]"#,
        "```sql\nINSERT INTO orders (user_id, product_id) \
         SELECT u.id, p.id FROM users u JOIN products p \
         ON p.name = 'Boite lunch Box' WHERE u.name = 'Alice'\n```",
    ]);
    let before = ctx.db.count_orders().unwrap();

    let (state, config) = turn("Make a new order for boite lunch box", Some(1));
    let state = run_turn(&ctx, state, &config).await;

    assert_eq!(state.current_user.name(), Some("Alice"));
    assert!(state.product_exists);
    assert!(!state.sql_error);
    assert_eq!(state.row_count, 1);
    assert_eq!(ctx.db.count_orders().unwrap(), before + 1);
    assert!(state.response.contains("Boite lunch Box"));
}

#[tokio::test]
async fn irrelevant_turn_never_touches_the_write_path() {
    let ctx = harness(vec!["irrelevant"]);
    let before = ctx.db.count_orders().unwrap();

    let (state, config) = turn("What is the weather like?", Some(1));
    let state = run_turn(&ctx, state, &config).await;

    assert_eq!(state.relevance, "irrelevant");
    assert!(state.sql_query.is_empty());
    assert_eq!(ctx.db.count_orders().unwrap(), before);
    assert!(state.response.contains("only help"));
}

#[tokio::test]
async fn generic_question_lists_catalog_without_sql() {
    let ctx = harness(vec!["relevant", r#"{"raw_product_string": ""}"#]);

    let (state, config) = turn("What do you sell?", Some(2));
    let state = run_turn(&ctx, state, &config).await;

    assert!(!state.product_exists);
    assert!(state.sql_query.is_empty());
    assert!(state.response.contains("Solar interaction wall lamp"));
}

#[tokio::test]
async fn failed_sql_is_regenerated_once_and_succeeds() {
    let ctx = harness(vec![
        "relevant",
        r#"{"raw_product_string": "presse agrume"}"#,
        r#"["Presse Agrume Silver Crest"]"#,
        // First attempt targets a table that does not exist
        "```sql\nINSERT INTO orderz (user_id, product_id) \
         SELECT u.id, p.id FROM users u JOIN products p \
         ON p.name = 'Presse Agrume Silver Crest' WHERE u.name = 'Bob'\n```",
        // Corrected attempt
        "```sql\nINSERT INTO orders (user_id, product_id) \
         SELECT u.id, p.id FROM users u JOIN products p \
         ON p.name = 'Presse Agrume Silver Crest' WHERE u.name = 'Bob'\n```",
    ]);
    let before = ctx.db.count_orders().unwrap();

    let (state, config) = turn("order a presse agrume", Some(2));
    let state = run_turn(&ctx, state, &config).await;

    assert!(!state.sql_error);
    assert_eq!(state.attempts, 1);
    assert_eq!(ctx.db.count_orders().unwrap(), before + 1);
    assert!(state.response.contains("Presse Agrume Silver Crest"));
}

#[tokio::test]
async fn unknown_user_turn_still_yields_a_reply() {
    let ctx = harness(vec![
        "relevant",
        r#"{"raw_product_string": "boite lunch box"}"#,
        r#"["Boite lunch Box"]"#,
        "```sql\nINSERT INTO orders (user_id, product_id) \
         SELECT u.id, p.id FROM users u JOIN products p \
         ON p.name = 'Boite lunch Box' WHERE u.name = 'Unknown'\n```",
    ]);

    let (state, config) = turn("Make a new order for boite lunch box", Some(404));
    let state = run_turn(&ctx, state, &config).await;

    assert_eq!(state.current_user, UserResolution::NotFound);
    // JOIN against a nonexistent user inserts nothing
    assert_eq!(state.row_count, 0);
    assert!(state.response.contains("register"));
}
