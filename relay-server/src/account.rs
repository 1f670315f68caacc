//! Account registry: per-tenant credentials and bound clients.
//!
//! The registry is populated once at startup from configuration and is
//! read-only during request handling, so it lives behind a plain `Arc`
//! with no locking.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::line::LineClient;

/// One tenant's resolved state: the webhook verification secret and the
/// outbound client bound to its access token.
pub struct AccountHandle {
    pub channel_secret: String,
    pub client: LineClient,
}

/// Map from account identifier to handle.
#[derive(Default)]
pub struct AccountRegistry {
    accounts: HashMap<String, AccountHandle>,
}

impl AccountRegistry {
    /// Build the registry from configuration.
    ///
    /// Account ids are unique; a repeated id keeps the first entry.
    pub fn from_config(config: &Config) -> Self {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let mut accounts = HashMap::new();

        for account in &config.accounts {
            if accounts.contains_key(&account.id) {
                warn!(account = %account.id, "account_duplicate_ignored");
                continue;
            }

            let client = LineClient::new(
                account.channel_access_token.clone(),
                config.api_base.clone(),
                timeout,
            );
            accounts.insert(
                account.id.clone(),
                AccountHandle {
                    channel_secret: account.channel_secret.clone(),
                    client,
                },
            );
            info!(account = %account.id, "account_registered");
        }

        Self { accounts }
    }

    /// Look up an account by id.
    pub fn get(&self, id: &str) -> Option<&AccountHandle> {
        self.accounts.get(id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
