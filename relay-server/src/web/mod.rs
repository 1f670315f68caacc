//! Web layer for the relay.
//!
//! Routes are scoped by account identifier:
//! - `POST /{account}/webhook` — signed LINE webhook intake
//! - `POST /{account}/line/sendmsg` — outbound push
//! - `GET /{account}/line/quota_usage|quota_consumption|delivery_push` —
//!   passthrough reads

pub mod handlers;

pub use handlers::{
    delivery_push, health, line_webhook, quota_consumption, quota_usage, send_message, AppState,
    DeliveryQuery, ErrorResponse, SendMessageRequest, SendMessageResponse, StatusResponse,
};
