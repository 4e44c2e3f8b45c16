//! Turns the final pipeline state into one human-readable reply.

use super::NodeContext;
use crate::state::{AgentState, UserResolution};

/// Compose the reply for a finished turn. Purely deterministic formatting
/// of the outcome; no model round-trip.
pub fn compose_reply(ctx: &NodeContext, state: AgentState) -> AgentState {
    let response = reply_for(ctx, &state);
    AgentState { response, ..state }
}

fn reply_for(ctx: &NodeContext, state: &AgentState) -> String {
    if state.current_user == UserResolution::Error {
        return "Sorry, something went wrong while looking up your account. Please try again in a moment.".to_string();
    }

    match state.relevance.as_str() {
        "relevant" => {}
        "error" => {
            return "Sorry, I'm having trouble understanding requests right now. Please try again in a moment.".to_string();
        }
        _ => {
            return "I can only help with questions about our shop - products, orders and deliveries.".to_string();
        }
    }

    // A relevant question with no concrete product mention is a catalog
    // question; answer it straight from the database.
    if state.product_mention.trim().is_empty() {
        return match ctx.db.list_products() {
            Ok(products) if !products.is_empty() => {
                let mut reply = String::from("Here's what we have in stock:\n");
                for product in products {
                    reply.push_str(&format!("- {} (${})\n", product.name, product.price));
                }
                reply.trim_end().to_string()
            }
            Ok(_) => "Our catalog is currently empty.".to_string(),
            Err(e) => {
                log::error!("[REPLY] catalog listing failed: {}", e);
                "Sorry, I couldn't load the catalog right now. Please try again in a moment."
                    .to_string()
            }
        };
    }

    if !state.product_exists {
        return format!(
            "Sorry, I couldn't find {} in our catalog. Ask me what we have in stock to see the available products.",
            state.corrected_products.join(", ")
        );
    }

    if state.sql_error {
        return "Sorry, I couldn't complete that request right now. Please try again.".to_string();
    }

    if !state.query_rows.is_empty() {
        let mut reply = String::from("Here's what I found:\n");
        for row in &state.query_rows {
            reply.push_str(&format!("- {}\n", row));
        }
        return reply.trim_end().to_string();
    }

    if state.row_count > 0 {
        return format!(
            "Done! I've placed your order for {} ({} item(s)).",
            state.corrected_products.join(", "),
            state.row_count
        );
    }

    if !matches!(state.current_user, UserResolution::Found(_)) {
        return "I couldn't find your account, so the order wasn't placed. Please register first."
            .to_string();
    }

    "That request didn't match anything in our records.".to_string()
}
