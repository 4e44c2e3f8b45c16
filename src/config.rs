use std::env;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const AI_ENDPOINT: &str = "AI_ENDPOINT";
    pub const AI_MODEL: &str = "AI_MODEL";
    pub const AI_API_KEY: &str = "AI_API_KEY";
    pub const AI_MAX_TOKENS: &str = "AI_MAX_TOKENS";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8000;
    pub const DATABASE_URL: &str = "./ecommerce.db";
    // OpenAI-compatible chat completions endpoint; a local Ollama works out
    // of the box with no API key.
    pub const AI_ENDPOINT: &str = "http://localhost:11434/v1/chat/completions";
    pub const AI_MAX_TOKENS: u32 = 4096;
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub ai_endpoint: String,
    pub ai_model: Option<String>,
    pub ai_api_key: String,
    pub ai_max_tokens: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var(env_vars::PORT)
                .unwrap_or_else(|_| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            ai_endpoint: env::var(env_vars::AI_ENDPOINT)
                .unwrap_or_else(|_| defaults::AI_ENDPOINT.to_string()),
            ai_model: env::var(env_vars::AI_MODEL).ok().filter(|m| !m.is_empty()),
            ai_api_key: env::var(env_vars::AI_API_KEY).unwrap_or_default(),
            ai_max_tokens: env::var(env_vars::AI_MAX_TOKENS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults::AI_MAX_TOKENS),
        }
    }
}
