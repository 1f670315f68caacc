//! HTTP endpoint handlers.
//!
//! Every route is scoped by account identifier, and an unknown identifier
//! is rejected before any call to the platform. Signature verification
//! runs against the raw body bytes, so the webhook handler takes `Bytes`
//! rather than a typed extractor.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::account::AccountRegistry;
use crate::dispatch::dispatch_event;
use crate::line::{verify_line_signature, ClientError, WebhookPayload, SIGNATURE_HEADER};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AccountRegistry>,
}

impl AppState {
    pub fn new(registry: AccountRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Plain status response.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Error body carrying a detail message.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Outbound send response.
#[derive(Serialize)]
pub struct SendMessageResponse {
    pub status: &'static str,
    pub message: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
        .into_response()
}

fn unknown_account(account: &str, route: &'static str) -> Response {
    warn!(account = %account, route = route, "unknown_account");
    error_response(StatusCode::NOT_FOUND, format!("Unknown account: {account}"))
}

/// Health check endpoint.
pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}

// =============================================================================
// Webhook
// =============================================================================

/// LINE webhook endpoint.
///
/// This endpoint:
/// 1. Resolves the account from the path
/// 2. Verifies the `X-Line-Signature` HMAC over the raw body
/// 3. Parses the event envelope and dispatches each event
pub async fn line_webhook(
    State(state): State<AppState>,
    Path(account): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(handle) = state.registry.get(&account) else {
        return unknown_account(&account, "webhook");
    };

    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!(account = %account, "webhook_signature_missing");
        return error_response(StatusCode::BAD_REQUEST, "Missing signature");
    };

    if !verify_line_signature(&handle.channel_secret, &body, signature) {
        warn!(account = %account, "webhook_signature_invalid");
        return error_response(StatusCode::BAD_REQUEST, "Invalid signature");
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(account = %account, error = %e, "webhook_payload_invalid");
            return error_response(StatusCode::BAD_REQUEST, "Invalid payload");
        }
    };

    info!(
        account = %account,
        events = payload.events.len(),
        body_length = body.len(),
        "webhook_received"
    );

    for event in payload.events {
        if let Err(e) = dispatch_event(&account, handle, event).await {
            error!(account = %account, error = %e, "webhook_dispatch_failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    }

    (StatusCode::OK, Json(StatusResponse { status: "ok" })).into_response()
}

// =============================================================================
// Outbound Send
// =============================================================================

/// Outbound send request body.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub user_id: String,
    pub message: String,
}

/// Push a text message to a user through the account's channel.
pub async fn send_message(
    State(state): State<AppState>,
    Path(account): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let Some(handle) = state.registry.get(&account) else {
        return unknown_account(&account, "sendmsg");
    };

    match handle.client.push_message(&req.user_id, &req.message).await {
        Ok(()) => {
            info!(account = %account, user_id = %req.user_id, "sendmsg_pushed");
            (
                StatusCode::OK,
                Json(SendMessageResponse {
                    status: "success",
                    message: format!("Message sent to {}", req.user_id),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(account = %account, user_id = %req.user_id, error = %e, "sendmsg_failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// =============================================================================
// Quota / Insight Reads
// =============================================================================

/// Relay a passthrough read: the platform's JSON on success, its error
/// message on failure.
fn relay_read(account: &str, op: &'static str, result: Result<Value, ClientError>) -> Response {
    match result {
        Ok(value) => {
            info!(account = %account, op = op, "read_relayed");
            (StatusCode::OK, Json(value)).into_response()
        }
        Err(e) => {
            error!(account = %account, op = op, error = %e, "read_failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Remaining message quota for the account.
pub async fn quota_usage(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Response {
    let Some(handle) = state.registry.get(&account) else {
        return unknown_account(&account, "quota_usage");
    };

    relay_read(&account, "quota_usage", handle.client.message_quota().await)
}

/// Messages consumed against the quota.
pub async fn quota_consumption(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> Response {
    let Some(handle) = state.registry.get(&account) else {
        return unknown_account(&account, "quota_consumption");
    };

    relay_read(
        &account,
        "quota_consumption",
        handle.client.quota_consumption().await,
    )
}

/// Query string for the delivery statistics read.
#[derive(Debug, Deserialize)]
pub struct DeliveryQuery {
    #[serde(default)]
    pub date: Option<String>,
}

/// Push delivery statistics for a given date.
pub async fn delivery_push(
    State(state): State<AppState>,
    Path(account): Path<String>,
    Query(query): Query<DeliveryQuery>,
) -> Response {
    let Some(handle) = state.registry.get(&account) else {
        return unknown_account(&account, "delivery_push");
    };

    let Some(date) = query.date else {
        warn!(account = %account, "delivery_push_missing_date");
        return error_response(StatusCode::BAD_REQUEST, "Missing date parameter");
    };

    relay_read(
        &account,
        "delivery_push",
        handle.client.push_delivery(&date).await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccountConfig, Config};

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    const TEST_SECRET: &str = "test-channel-secret";

    fn test_state() -> AppState {
        let config = Config {
            port: 0,
            accounts: vec![AccountConfig {
                id: "acme".to_string(),
                channel_secret: TEST_SECRET.to_string(),
                channel_access_token: "test-token".to_string(),
            }],
            // Unroutable base so an accidental outbound call fails fast
            api_base: "http://127.0.0.1:9".to_string(),
            request_timeout_ms: 200,
        };
        AppState::new(AccountRegistry::from_config(&config))
    }

    fn sign(body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(TEST_SECRET.as_bytes()).unwrap();
        mac.update(body);
        STANDARD.encode(mac.finalize().into_bytes())
    }

    fn signed_headers(body: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, sign(body).parse().unwrap());
        headers
    }

    #[tokio::test]
    async fn test_webhook_unknown_account() {
        let response = line_webhook(
            State(test_state()),
            Path("nobody".to_string()),
            HeaderMap::new(),
            Bytes::from_static(b"{}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_webhook_missing_signature() {
        let response = line_webhook(
            State(test_state()),
            Path("acme".to_string()),
            HeaderMap::new(),
            Bytes::from_static(b"{\"events\":[]}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_invalid_signature() {
        let body = b"{\"events\":[]}";
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, "aW52YWxpZA==".parse().unwrap());

        let response = line_webhook(
            State(test_state()),
            Path("acme".to_string()),
            headers,
            Bytes::from_static(body),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_tampered_body() {
        let headers = signed_headers(b"{\"events\":[]}");

        let response = line_webhook(
            State(test_state()),
            Path("acme".to_string()),
            headers,
            Bytes::from_static(b"{\"events\":[{}]}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_valid_signature_empty_batch() {
        let body: &[u8] = b"{\"destination\":\"U1\",\"events\":[]}";
        let headers = signed_headers(body);

        let response = line_webhook(
            State(test_state()),
            Path("acme".to_string()),
            headers,
            Bytes::from_static(body),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_webhook_valid_signature_bad_payload() {
        let body: &[u8] = b"not json";
        let headers = signed_headers(body);

        let response = line_webhook(
            State(test_state()),
            Path("acme".to_string()),
            headers,
            Bytes::from_static(body),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_webhook_skipped_events_need_no_client() {
        // Unhandled kinds are dropped before any outbound call, so the
        // unroutable test client is never exercised
        let body: &[u8] =
            b"{\"events\":[{\"type\":\"unfollow\",\"source\":{\"type\":\"user\",\"userId\":\"U1\"}}]}";
        let headers = signed_headers(body);

        let response = line_webhook(
            State(test_state()),
            Path("acme".to_string()),
            headers,
            Bytes::from_static(body),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sendmsg_unknown_account() {
        let response = send_message(
            State(test_state()),
            Path("nobody".to_string()),
            Json(SendMessageRequest {
                user_id: "U1".to_string(),
                message: "hi".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sendmsg_downstream_fault_is_500() {
        // The unroutable api_base makes the push fail at transport level
        let response = send_message(
            State(test_state()),
            Path("acme".to_string()),
            Json(SendMessageRequest {
                user_id: "U1".to_string(),
                message: "hi".to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_quota_usage_unknown_account() {
        let response = quota_usage(State(test_state()), Path("nobody".to_string())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_quota_consumption_unknown_account() {
        let response =
            quota_consumption(State(test_state()), Path("nobody".to_string())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delivery_push_unknown_account() {
        let response = delivery_push(
            State(test_state()),
            Path("nobody".to_string()),
            Query(DeliveryQuery {
                date: Some("20260801".to_string()),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delivery_push_missing_date() {
        let response = delivery_push(
            State(test_state()),
            Path("acme".to_string()),
            Query(DeliveryQuery { date: None }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
