//! Shared HTTP client for outbound requests.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .expect("failed to build HTTP client")
});

pub fn shared_client() -> &'static Client {
    &CLIENT
}
