//! LINE Messaging API integration.
//!
//! - `signature`: webhook signature verification (HMAC-SHA256, base64)
//! - `events`: serde model of the webhook event envelope
//! - `client`: outbound API client (push, reply, quota and delivery reads)

pub mod client;
pub mod events;
pub mod signature;

pub use client::{ClientError, LineClient, DEFAULT_API_BASE};
pub use events::{Event, EventSource, MessageContent, WebhookPayload};
pub use signature::{verify_line_signature, SIGNATURE_HEADER};
