//! Resolves which user the conversation is acting on behalf of.

use super::NodeContext;
use crate::state::{AgentState, RunConfig, UserResolution};

/// Resolve the current user for a turn. The id comes from the invocation
/// config when present, falling back to the state; with no id at all the
/// database is never touched. A lookup failure resolves to
/// `UserResolution::Error` instead of propagating, so the turn continues.
pub fn resolve_current_user(
    ctx: &NodeContext,
    state: AgentState,
    config: &RunConfig,
) -> AgentState {
    // Configuration wins over state when both carry an id.
    let (user_id, source) = match config.configurable.current_user_id {
        Some(id) => (Some(id), "config"),
        None => (state.current_user_id, "state"),
    };

    let Some(user_id) = user_id else {
        log::info!("[USER] no user id in config or state");
        return AgentState {
            current_user: UserResolution::NotFound,
            ..state
        };
    };
    log::info!("[USER] resolving user id {} (from {})", user_id, source);

    match ctx.db.get_user(user_id) {
        Ok(Some(user)) => {
            log::info!("[USER] current user set to {}", user.name);
            AgentState {
                current_user: UserResolution::Found(user),
                ..state
            }
        }
        Ok(None) => {
            log::info!("[USER] user id {} not found", user_id);
            AgentState {
                current_user: UserResolution::NotFound,
                ..state
            }
        }
        Err(e) => {
            log::error!("[USER] error retrieving user {}: {}", user_id, e);
            AgentState {
                current_user: UserResolution::Error,
                ..state
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiClient;
    use crate::db::Database;
    use crate::state::Configurable;
    use std::sync::Arc;

    fn test_ctx() -> NodeContext {
        let db = Arc::new(Database::new(":memory:").expect("in-memory db"));
        db.seed_demo_data().expect("seed");
        NodeContext {
            db,
            ai: AiClient::mock(vec![]),
        }
    }

    fn config_with_id(id: Option<i64>) -> RunConfig {
        RunConfig {
            configurable: Configurable {
                current_user_id: id,
            },
        }
    }

    #[test]
    fn no_id_resolves_to_not_found_without_lookup() {
        let ctx = test_ctx();
        // Break the users table: if the resolver touched the database this
        // would surface as Error, not NotFound.
        {
            let conn = ctx.db.conn.lock().unwrap();
            // This build enables foreign keys by default; relax enforcement so
            // the table holding child-referenced rows can be dropped.
            conn.execute("PRAGMA foreign_keys = OFF", []).unwrap();
            conn.execute("DROP TABLE users", []).unwrap();
        }

        let state = AgentState {
            question: "hello".to_string(),
            ..Default::default()
        };
        let resolved = resolve_current_user(&ctx, state, &RunConfig::default());
        assert_eq!(resolved.current_user, UserResolution::NotFound);
        assert_eq!(resolved.question, "hello");
    }

    #[test]
    fn config_id_wins_over_state_id() {
        let ctx = test_ctx();
        let state = AgentState {
            current_user_id: Some(2),
            ..Default::default()
        };
        let resolved = resolve_current_user(&ctx, state, &config_with_id(Some(1)));
        match &resolved.current_user {
            UserResolution::Found(user) => assert_eq!(user.name, "Alice"),
            other => panic!("expected Found, got {:?}", other),
        }
        // The state-embedded id is preserved, not overwritten.
        assert_eq!(resolved.current_user_id, Some(2));
    }

    #[test]
    fn state_id_used_when_config_is_empty() {
        let ctx = test_ctx();
        let state = AgentState {
            current_user_id: Some(3),
            ..Default::default()
        };
        let resolved = resolve_current_user(&ctx, state, &RunConfig::default());
        match &resolved.current_user {
            UserResolution::Found(user) => assert_eq!(user.name, "Charlie"),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[test]
    fn unknown_id_resolves_to_not_found() {
        let ctx = test_ctx();
        let resolved =
            resolve_current_user(&ctx, AgentState::default(), &config_with_id(Some(404)));
        assert_eq!(resolved.current_user, UserResolution::NotFound);

        // same via the state-embedded fallback
        let state = AgentState {
            current_user_id: Some(404),
            ..Default::default()
        };
        let resolved = resolve_current_user(&ctx, state, &RunConfig::default());
        assert_eq!(resolved.current_user, UserResolution::NotFound);
    }

    #[test]
    fn query_failure_resolves_to_error_not_panic() {
        let ctx = test_ctx();
        {
            let conn = ctx.db.conn.lock().unwrap();
            // This build enables foreign keys by default; relax enforcement so
            // the table holding child-referenced rows can be dropped.
            conn.execute("PRAGMA foreign_keys = OFF", []).unwrap();
            conn.execute("DROP TABLE users", []).unwrap();
        }

        let resolved = resolve_current_user(&ctx, AgentState::default(), &config_with_id(Some(1)));
        assert_eq!(resolved.current_user, UserResolution::Error);
    }

    #[test]
    fn unrelated_fields_are_preserved() {
        let ctx = test_ctx();
        let state = AgentState {
            question: "order a lamp".to_string(),
            relevance: "relevant".to_string(),
            attempts: 2,
            ..Default::default()
        };
        let resolved = resolve_current_user(&ctx, state, &config_with_id(Some(1)));
        assert_eq!(resolved.question, "order a lamp");
        assert_eq!(resolved.relevance, "relevant");
        assert_eq!(resolved.attempts, 2);
    }
}
