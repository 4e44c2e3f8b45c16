//! Typed per-turn conversational state passed through the pipeline.

use serde::{Deserialize, Serialize};

use crate::models::User;

/// Outcome of resolving the acting user for a turn. An explicit variant per
/// outcome so callers never have to compare sentinel strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum UserResolution {
    #[default]
    Unresolved,
    Found(User),
    NotFound,
    Error,
}

impl UserResolution {
    /// Display name of the resolved user, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            UserResolution::Found(user) => Some(&user.name),
            _ => None,
        }
    }
}

/// Conversational state for one turn. Nodes take a state by value and return
/// a new one; all fields they do not touch are carried over unchanged.
///
/// Every field defaults, so API clients only send what they have.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentState {
    pub question: String,
    pub current_user_id: Option<i64>,
    pub current_user: UserResolution,
    pub relevance: String,
    /// Comma-separated product mentions extracted from the question.
    pub product_mention: String,
    pub product_exists: bool,
    pub corrected_products: Vec<String>,
    pub sql_query: Vec<String>,
    pub sql_error: bool,
    pub sql_error_message: String,
    pub row_count: usize,
    pub query_rows: Vec<String>,
    pub attempts: u32,
    pub response: String,
}

/// Per-invocation configuration envelope supplied by the caller, distinct
/// from the conversational state itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub configurable: Configurable,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configurable {
    pub current_user_id: Option<i64>,
}
