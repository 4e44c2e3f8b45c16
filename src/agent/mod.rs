//! Conversational pipeline: one state-transforming node per step.
//!
//! Each node takes the turn state by value and returns an updated copy;
//! infrastructure failures are folded into the state rather than propagated,
//! so a turn always runs to a reply.

mod catalog;
mod current_user;
mod extract;
mod relevance;
mod respond;
mod sql;

#[cfg(test)]
mod pipeline_tests;

pub use catalog::check_product_existence;
pub use current_user::resolve_current_user;
pub use extract::extract_product_items;
pub use relevance::check_relevance;
pub use respond::compose_reply;
pub use sql::{convert_nl_to_sql, execute_sql};

use std::sync::Arc;
use uuid::Uuid;

use crate::ai::AiClient;
use crate::db::Database;
use crate::state::{AgentState, RunConfig};

/// Shared handles the pipeline nodes need.
#[derive(Clone)]
pub struct NodeContext {
    pub db: Arc<Database>,
    pub ai: AiClient,
}

/// Run one conversational turn through the full pipeline and produce the
/// final state, reply included.
pub async fn run_turn(ctx: &NodeContext, state: AgentState, config: &RunConfig) -> AgentState {
    let turn_id = Uuid::new_v4();
    log::info!("[TURN {}] question: {:?}", turn_id, state.question);

    let state = resolve_current_user(ctx, state, config);
    let state = check_relevance(ctx, state).await;
    if state.relevance != "relevant" {
        log::info!("[TURN {}] question gated as {:?}", turn_id, state.relevance);
        return compose_reply(ctx, state);
    }

    let state = extract_product_items(ctx, state).await;
    let mut state = check_product_existence(ctx, state).await;

    // Regenerate on SQL execution errors until the conversion node gives up.
    loop {
        state = convert_nl_to_sql(ctx, state).await;
        if state.sql_query.is_empty() {
            break;
        }
        state = execute_sql(ctx, state);
        if !state.sql_error {
            break;
        }
        log::warn!(
            "[TURN {}] SQL failed, asking for a corrected query: {}",
            turn_id,
            state.sql_error_message
        );
    }

    let state = compose_reply(ctx, state);
    log::info!("[TURN {}] reply: {:?}", turn_id, state.response);
    state
}
