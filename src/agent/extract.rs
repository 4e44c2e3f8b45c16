//! Pulls concrete product mentions out of free-form user text.

use serde::Deserialize;

use super::NodeContext;
use crate::ai::{strip_think_tags, Message};
use crate::state::AgentState;

#[derive(Debug, Default, Deserialize)]
struct ExtractPayload {
    #[serde(default)]
    raw_product_string: String,
}

/// Extract product mentions from the question into
/// `state.product_mention` as a comma-separated string. Generic catalog
/// questions ("what do you sell?") yield the empty string, as does any
/// unparseable or failed model answer.
pub async fn extract_product_items(ctx: &NodeContext, state: AgentState) -> AgentState {
    let system = "You are an assistant that extracts specific e-commerce product items from a \
        user's question.\n\
        For questions like 'Do you have [product1] and [product2]?' or 'Create a new order for \
        [product1] and [product2]', extract only the core product names, excluding articles \
        ('a', 'an', 'the') and prepositions ('to', 'of'), and return them as a comma-separated \
        string.\n\
        For generic questions (e.g., 'What do you sell?', 'What do you have?'), return an empty \
        string.\n\
        Output ONLY a single-line JSON object with one field:\n\
        - \"raw_product_string\": a comma-separated list of core product names \
        (e.g., \"product1, product2\") or \"\" if no specific items.\n\
        Use double quotes for strings, no extra spaces around commas, and NO additional text, \
        explanations, or tags. Examples:\n\
        - \"Create a new order for Boite lunch Box and Presse Agrume Silver Crest\" -> \
        {\"raw_product_string\": \"Boite lunch Box, Presse Agrume Silver Crest\"}\n\
        - \"What do you sell?\" -> {\"raw_product_string\": \"\"}\n\
        DO NOT add any interpretation or explanation!";

    let messages = vec![
        Message::system(system),
        Message::user(format!(
            "Extract product items from this question: {}",
            state.question
        )),
    ];

    let product_mention = match ctx.ai.generate_text(messages).await {
        Ok(raw) => parse_extraction(&raw),
        Err(e) => {
            log::error!("[EXTRACT] model call failed: {}", e);
            String::new()
        }
    };

    log::info!("[EXTRACT] product mentions: {:?}", product_mention);
    AgentState {
        product_mention,
        ..state
    }
}

/// Parse the model's JSON answer, tolerating think-blocks and surrounding
/// prose; anything unparseable falls back to no mentions.
fn parse_extraction(raw: &str) -> String {
    let cleaned = strip_think_tags(raw);
    let start = cleaned.find('{');
    let end = cleaned.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => {
            log::warn!("[EXTRACT] no JSON object in model output: {:?}", cleaned);
            return String::new();
        }
    };

    match serde_json::from_str::<ExtractPayload>(json) {
        Ok(payload) => payload.raw_product_string,
        Err(e) => {
            log::warn!("[EXTRACT] failed to parse model output: {}", e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        assert_eq!(
            parse_extraction(r#"{"raw_product_string": "Lamp, Juicer"}"#),
            "Lamp, Juicer"
        );
    }

    #[test]
    fn parses_json_wrapped_in_noise() {
        let raw = "<think>reasoning</think>Here you go:\n```json\n{\"raw_product_string\": \"Lamp\"}\n```";
        assert_eq!(parse_extraction(raw), "Lamp");
    }

    #[test]
    fn garbage_falls_back_to_empty() {
        assert_eq!(parse_extraction("no json here"), "");
        assert_eq!(parse_extraction("{broken"), "");
        assert_eq!(parse_extraction(r#"{"other_field": 1}"#), "");
    }
}
