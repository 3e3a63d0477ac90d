use reqwest::Client;
use std::time::Duration;

/// Connect timeout for validator HTTP clients (seconds). Per-request
/// deadlines are layered on top by each validator.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Build a `reqwest::Client` with the standard connect timeout.
///
/// Falls back to the default client if the builder fails. The client is
/// shared across validators; substitute one pointed at a mock transport in
/// tests.
pub fn default_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
}
