//! Configuration module for environment variable parsing.
//!
//! All configuration is read from environment variables once at startup;
//! the account table is immutable afterwards.

use std::env;
use tracing::warn;

/// One account's channel credentials.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Account identifier used in route paths
    pub id: String,

    /// Channel secret used to verify webhook signatures
    pub channel_secret: String,

    /// Channel access token used for outbound API calls
    pub channel_access_token: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Accounts the relay serves
    pub accounts: Vec<AccountConfig>,

    /// LINE Messaging API base URL (overridable for tests)
    pub api_base: String,

    /// HTTP request timeout in milliseconds for outbound LINE calls
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            accounts: parse_accounts(),

            api_base: env::var("LINE_API_BASE")
                .unwrap_or_else(|_| crate::line::DEFAULT_API_BASE.to_string()),

            request_timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        }
    }
}

/// Parse the account table from the environment.
///
/// `LINE_ACCOUNTS` lists account ids; each id `foo` reads its credentials
/// from `LINE_FOO_CHANNEL_SECRET` and `LINE_FOO_CHANNEL_ACCESS_TOKEN`.
/// Without `LINE_ACCOUNTS`, a bare `LINE_CHANNEL_SECRET` /
/// `LINE_CHANNEL_ACCESS_TOKEN` pair registers the single account `default`.
fn parse_accounts() -> Vec<AccountConfig> {
    match parse_csv("LINE_ACCOUNTS") {
        Some(ids) => ids.iter().filter_map(|id| read_account(id)).collect(),
        None => read_legacy_account().into_iter().collect(),
    }
}

/// Read one account's credentials from its prefixed variables.
///
/// Accounts with a missing or empty secret/token are skipped so one
/// misconfigured tenant cannot keep the rest from starting.
fn read_account(id: &str) -> Option<AccountConfig> {
    let prefix = format!("LINE_{}", id.to_uppercase().replace('-', "_"));
    let secret = env::var(format!("{prefix}_CHANNEL_SECRET")).unwrap_or_default();
    let token = env::var(format!("{prefix}_CHANNEL_ACCESS_TOKEN")).unwrap_or_default();

    if secret.is_empty() || token.is_empty() {
        warn!(
            account = id,
            has_secret = !secret.is_empty(),
            has_token = !token.is_empty(),
            "account_credentials_missing"
        );
        return None;
    }

    Some(AccountConfig {
        id: id.to_string(),
        channel_secret: secret,
        channel_access_token: token,
    })
}

/// Single-account fallback: a bare secret/token pair registers account
/// `default`.
fn read_legacy_account() -> Option<AccountConfig> {
    let secret = env::var("LINE_CHANNEL_SECRET").unwrap_or_default();
    let token = env::var("LINE_CHANNEL_ACCESS_TOKEN").unwrap_or_default();

    if secret.is_empty() || token.is_empty() {
        return None;
    }

    Some(AccountConfig {
        id: "default".to_string(),
        channel_secret: secret,
        channel_access_token: token,
    })
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}
