//! Gate that decides whether a question concerns the shop at all.

use super::NodeContext;
use crate::ai::{strip_think_tags, Message};
use crate::state::AgentState;

/// Ask the model whether the question is answerable from the shop database.
/// The result lands in `state.relevance` as `relevant`, `irrelevant` or
/// `error` (model unreachable).
pub async fn check_relevance(ctx: &NodeContext, state: AgentState) -> AgentState {
    let schema = ctx.db.describe_schema().unwrap_or_else(|e| {
        log::error!("[RELEVANCE] schema introspection failed: {}", e);
        String::new()
    });

    let system = format!(
        "You are an assistant that determines if a user's question is relevant to a database schema.\n\n\
         Schema:\n{schema}\n\n\
         The database includes tables for users, products, and orders. The users table stores \
         user information (id, name, phone, city, address, email). The products table stores \
         product items (id, name, price, category). The orders table stores orders \
         (id, product_id, user_id).\n\
         - If the question involves ordering products, querying the catalog, or retrieving user \
         orders, it is relevant. Output 'relevant'.\n\
         - Everything related to products and e-commerce is relevant.\n\
         - If the question is unrelated (e.g., about the weather, general knowledge), it is \
         irrelevant. Output 'irrelevant'.\n\
         Provide the result as plain text, with NO explanations, quotes, or extra text.\n\
         Examples:\n\
         - 'Make a new order for Boite lunch Box' -> relevant\n\
         - 'What is the weather like?' -> irrelevant"
    );

    let messages = vec![
        Message::system(system),
        Message::user(format!("Question: {}", state.question)),
    ];

    let relevance = match ctx.ai.generate_text(messages).await {
        Ok(raw) => {
            let answer = strip_think_tags(&raw).to_lowercase();
            log::info!("[RELEVANCE] model answered {:?}", answer);
            if answer.contains("irrelevant") {
                "irrelevant".to_string()
            } else if answer.contains("relevant") {
                "relevant".to_string()
            } else {
                "irrelevant".to_string()
            }
        }
        Err(e) => {
            log::error!("[RELEVANCE] model call failed: {}", e);
            "error".to_string()
        }
    };

    AgentState { relevance, ..state }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiClient;
    use crate::db::Database;
    use std::sync::Arc;

    fn ctx_with_answer(answer: Result<String, String>) -> NodeContext {
        NodeContext {
            db: Arc::new(Database::new(":memory:").unwrap()),
            ai: AiClient::mock(vec![answer]),
        }
    }

    #[tokio::test]
    async fn normalizes_model_output() {
        let ctx = ctx_with_answer(Ok("<think>hmm</think>  Relevant".to_string()));
        let state = check_relevance(&ctx, AgentState::default()).await;
        assert_eq!(state.relevance, "relevant");

        let ctx = ctx_with_answer(Ok("irrelevant".to_string()));
        let state = check_relevance(&ctx, AgentState::default()).await;
        assert_eq!(state.relevance, "irrelevant");

        let ctx = ctx_with_answer(Ok("no idea".to_string()));
        let state = check_relevance(&ctx, AgentState::default()).await;
        assert_eq!(state.relevance, "irrelevant");
    }

    #[tokio::test]
    async fn model_failure_becomes_error_marker() {
        let ctx = ctx_with_answer(Err("connection refused".to_string()));
        let state = check_relevance(&ctx, AgentState::default()).await;
        assert_eq!(state.relevance, "error");
    }
}
