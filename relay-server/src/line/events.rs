//! Webhook event envelope types.
//!
//! Serde model of the LINE webhook body. Only the event kinds the relay
//! dispatches are modeled in full; everything else (unfollow, leave,
//! postback, ...) deserializes into a catch-all variant and is skipped
//! upstream instead of failing the whole batch.

use serde::Deserialize;

/// Top-level webhook body: the destination bot and a batch of events.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    /// User ID of the bot that should receive the events.
    #[serde(default)]
    pub destination: String,
    /// Events in arrival order.
    #[serde(default)]
    pub events: Vec<Event>,
}

/// A single webhook event, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// A user sent a message to the bot.
    Message {
        #[serde(rename = "replyToken")]
        reply_token: String,
        source: EventSource,
        message: MessageContent,
    },
    /// A user added the bot as a friend.
    Follow {
        #[serde(rename = "replyToken")]
        reply_token: String,
        source: EventSource,
    },
    /// The bot was invited into a group or room.
    Join {
        #[serde(rename = "replyToken")]
        reply_token: String,
        source: EventSource,
    },
    /// Any event kind the relay does not handle.
    #[serde(other)]
    Other,
}

/// Where an event originated, tagged by `type`.
///
/// Group and room sources carry the acting user's ID only when the user has
/// consented to ID disclosure, so it stays optional there.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventSource {
    User {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Group {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(default, rename = "userId")]
        user_id: Option<String>,
    },
    Room {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(default, rename = "userId")]
        user_id: Option<String>,
    },
}

impl EventSource {
    /// ID of the user who triggered the event, if the platform supplied it.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            EventSource::User { user_id } => Some(user_id),
            EventSource::Group { user_id, .. } | EventSource::Room { user_id, .. } => {
                user_id.as_deref()
            }
        }
    }
}

/// Message payload of a message event, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text {
        #[serde(default)]
        id: String,
        text: String,
    },
    /// Stickers, images, and other non-text content.
    #[serde(other)]
    Other,
}
