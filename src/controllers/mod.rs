pub mod assist;
pub mod health;
pub mod nodes;

use std::sync::Arc;

use crate::agent::NodeContext;
use crate::ai::AiClient;
use crate::AppState;

/// Build the pipeline context for one request.
pub(crate) fn node_context(state: &AppState) -> Result<NodeContext, String> {
    let ai = AiClient::from_config(&state.config)?;
    Ok(NodeContext {
        db: Arc::clone(&state.db),
        ai,
    })
}
