//! line-relay - multi-tenant webhook relay for the LINE Messaging API.
//!
//! A single web service that:
//! - Receives signed LINE webhooks per account and verifies signatures
//! - Dispatches events to kind-specific handlers and replies inline
//! - Pushes outbound messages through each account's channel
//! - Relays quota and delivery statistics reads unchanged
//!
//! ## Architecture
//!
//! ```text
//! LINE platform → POST /{account}/webhook → signature check → dispatch → reply
//! Callers → /{account}/line/* → AccountRegistry → LineClient → LINE API
//! ```

pub mod account;
pub mod config;
pub mod dispatch;
pub mod line;
pub mod web;

// Re-export commonly used types
pub use account::{AccountHandle, AccountRegistry};
pub use config::{AccountConfig, Config};
pub use line::{ClientError, LineClient};
pub use web::AppState;
