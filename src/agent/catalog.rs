//! Matches extracted product mentions against the live catalog.

use regex::RegexBuilder;

use super::NodeContext;
use crate::ai::{strip_think_tags, Message};
use crate::state::AgentState;

const NOT_FOUND_MARKER: &str = "NOT_FOUND";

/// Check every extracted mention against the catalog, tolerating typos via
/// the model. Matched mentions are rewritten into the question with their
/// exact catalog names so SQL generation can use them verbatim;
/// `product_exists` is true only when every mention matched.
pub async fn check_product_existence(ctx: &NodeContext, state: AgentState) -> AgentState {
    let items: Vec<String> = state
        .product_mention
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if items.is_empty() {
        log::info!("[CATALOG] no product mentions to check");
        return AgentState {
            product_exists: false,
            ..state
        };
    }

    let catalog = match ctx.db.product_names() {
        Ok(names) => names,
        Err(e) => {
            log::error!("[CATALOG] failed to load product names: {}", e);
            return AgentState {
                product_exists: false,
                corrected_products: items,
                ..state
            };
        }
    };

    let system = format!(
        "You are an assistant that checks if product items exist in the stock, handling typos \
         or variations.\n\
         The user asked: '{question}'.\n\
         The extracted product items are: {items:?}.\n\
         Here is the list of available product names from the database: {catalog:?}.\n\
         - For each product item, return the EXACT matching product name from the list \
         (case-insensitive, allowing typos or variations).\n\
         - If no match is found for an item, return '{marker}' for that item.\n\
         - Output a JSON array of strings, one per product item, in the same order as the \
         extracted items, with NO explanations or extra text.\n\
         Example:\n\
         - items: [\"solar interaction lamp\", \"Presse Argume Silver Crest\"]\n\
         - available: [\"Solar interaction wall lamp\", \"Presse Agrume Silver Crest\"]\n\
         - Output: [\"Solar interaction wall lamp\", \"Presse Agrume Silver Crest\"]",
        question = state.question,
        items = items,
        catalog = catalog,
        marker = NOT_FOUND_MARKER,
    );

    let messages = vec![
        Message::system(system),
        Message::user("Do these products exist?".to_string()),
    ];

    let answer = match ctx.ai.generate_text(messages).await {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("[CATALOG] model call failed: {}", e);
            return AgentState {
                product_exists: false,
                corrected_products: items,
                ..state
            };
        }
    };

    let Some(corrected) = parse_catalog_answer(&answer, items.len()) else {
        log::warn!("[CATALOG] unparseable model answer, treating all items as not found");
        return AgentState {
            product_exists: false,
            corrected_products: items,
            ..state
        };
    };

    let mut product_exists = true;
    let mut corrected_products = Vec::with_capacity(items.len());
    let mut question = state.question.clone();

    for (original, candidate) in items.iter().zip(corrected) {
        if candidate == NOT_FOUND_MARKER {
            product_exists = false;
            // Keep the user's wording for items we could not match
            corrected_products.push(original.clone());
        } else {
            question = replace_mention(&question, original, &candidate);
            corrected_products.push(candidate);
        }
    }

    log::info!(
        "[CATALOG] product_exists: {}, corrected items: {:?}",
        product_exists,
        corrected_products
    );
    AgentState {
        question,
        product_exists,
        corrected_products,
        ..state
    }
}

/// Parse the model's JSON array answer; `None` unless it is a string array
/// of exactly the expected length.
fn parse_catalog_answer(raw: &str, expected_len: usize) -> Option<Vec<String>> {
    let cleaned = strip_think_tags(raw);
    let start = cleaned.find('[')?;
    let end = cleaned.rfind(']')?;
    if start >= end {
        return None;
    }

    let parsed: Vec<String> = serde_json::from_str(&cleaned[start..=end]).ok()?;
    if parsed.len() != expected_len {
        log::warn!(
            "[CATALOG] expected {} corrections, model returned {}",
            expected_len,
            parsed.len()
        );
        return None;
    }
    Some(parsed)
}

/// Replace a mention in the question with its exact catalog name,
/// case-insensitively and on word boundaries.
fn replace_mention(question: &str, original: &str, corrected: &str) -> String {
    let pattern = format!(r"\b{}\b", regex::escape(original));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.replace_all(question, corrected).to_string(),
        Err(e) => {
            log::warn!("[CATALOG] bad mention pattern {:?}: {}", original, e);
            question.to_string()
        }
    }
}
