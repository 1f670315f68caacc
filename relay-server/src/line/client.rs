//! Outbound LINE Messaging API client.
//!
//! One client per account, authenticated with the account's channel access
//! token. Push and reply send text messages; the quota and delivery reads
//! relay the platform's JSON body unchanged so callers see exactly what the
//! platform returned.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

/// Default LINE Messaging API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.line.me";

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure before any HTTP status was received.
    #[error("request to LINE API failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success HTTP status; the platform's response body is kept
    /// verbatim so it can be passed through to the caller.
    #[error("LINE API returned {status}: {body}")]
    Api { status: StatusCode, body: String },
}

/// Client bound to one account's channel access token.
#[derive(Clone)]
pub struct LineClient {
    http: reqwest::Client,
    access_token: String,
    api_base: String,
    timeout: Duration,
}

impl LineClient {
    pub fn new(access_token: String, api_base: String, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
            api_base,
            timeout,
        }
    }

    /// Push a text message to a user, independent of any reply token.
    pub async fn push_message(&self, to: &str, text: &str) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "to": to,
            "messages": [{"type": "text", "text": text}],
        });

        self.post("/v2/bot/message/push", &body).await?;

        info!(to = %to, text_length = text.len(), "line_push_sent");

        Ok(())
    }

    /// Reply to a webhook event using its reply token.
    ///
    /// Reply tokens are single-use and expire shortly after the event, so
    /// this must be called from the webhook dispatch path.
    pub async fn reply_message(&self, reply_token: &str, text: &str) -> Result<(), ClientError> {
        let body = serde_json::json!({
            "replyToken": reply_token,
            "messages": [{"type": "text", "text": text}],
        });

        self.post("/v2/bot/message/reply", &body).await?;

        info!(text_length = text.len(), "line_reply_sent");

        Ok(())
    }

    /// Remaining message quota for the current month.
    pub async fn message_quota(&self) -> Result<Value, ClientError> {
        self.get("/v2/bot/message/quota", &[]).await
    }

    /// Number of messages consumed against the quota.
    pub async fn quota_consumption(&self) -> Result<Value, ClientError> {
        self.get("/v2/bot/message/quota/consumption", &[]).await
    }

    /// Push delivery statistics for a given date.
    pub async fn push_delivery(&self, date: &str) -> Result<Value, ClientError> {
        self.get("/v2/bot/message/delivery/push", &[("date", date)])
            .await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await?;

        Self::check_status(response).await?;

        Ok(())
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ClientError> {
        let response = self
            .http
            .get(format!("{}{}", self.api_base, path))
            .query(query)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .send()
            .await?;

        let response = Self::check_status(response).await?;

        Ok(response.json().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Api { status, body })
    }
}
