//! Configuration model loaded from external sources.

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Signs session cookies, flash messages and JWTs; at least 64 bytes.
    pub secret: String,
    pub token_ttl_minutes: i64,
    pub session_ttl_days: i64,
    pub reset_token_ttl_minutes: i64,
    #[serde(default)]
    pub cookie_secure: bool,
}
