//! Webhook event dispatch.
//!
//! Routes each parsed event to its kind-specific handler and sends the
//! reply through the account's client. Text commands match the whole
//! message case-insensitively; everything else is echoed back.

use tracing::{debug, info};

use crate::account::AccountHandle;
use crate::line::{ClientError, Event, EventSource, MessageContent};

/// Fixed reply for follow events.
const FOLLOW_REPLY: &str = "Thank you for following our LINE Official Account!";

/// Fixed reply for join events.
const JOIN_REPLY: &str = "Thank you for inviting me to this group or room!";

/// Reply to "what group?" outside a group chat.
const NOT_A_GROUP_REPLY: &str = "This is not a group chat.";

/// Dispatch one webhook event for an account.
///
/// Unhandled event kinds and non-text messages are skipped. Reply faults
/// propagate so the webhook handler can surface them.
pub async fn dispatch_event(
    account_id: &str,
    handle: &AccountHandle,
    event: Event,
) -> Result<(), ClientError> {
    match event {
        Event::Message {
            reply_token,
            source,
            message,
        } => {
            let MessageContent::Text { text, .. } = message else {
                debug!(account = %account_id, "message_skipped_non_text");
                return Ok(());
            };

            info!(
                account = %account_id,
                user_id = source.user_id().unwrap_or("unknown"),
                text_length = text.len(),
                "message_received"
            );

            let reply = reply_for_text(&text, &source);
            handle.client.reply_message(&reply_token, &reply).await
        }

        Event::Follow {
            reply_token,
            source,
        } => {
            info!(
                account = %account_id,
                user_id = source.user_id().unwrap_or("unknown"),
                "new_follower"
            );

            handle.client.reply_message(&reply_token, FOLLOW_REPLY).await
        }

        Event::Join {
            reply_token,
            source,
        } => {
            match &source {
                EventSource::Group { group_id, .. } => {
                    info!(account = %account_id, group_id = %group_id, "joined_group");
                }
                EventSource::Room { room_id, .. } => {
                    info!(account = %account_id, room_id = %room_id, "joined_room");
                }
                EventSource::User { .. } => {}
            }

            handle.client.reply_message(&reply_token, JOIN_REPLY).await
        }

        Event::Other => {
            debug!(account = %account_id, "event_skipped_unhandled");
            Ok(())
        }
    }
}

/// Compute the reply for a text message.
pub fn reply_for_text(text: &str, source: &EventSource) -> String {
    let command = text.to_lowercase();

    if command == "who am i?" {
        format!(
            "Your user ID is: {}",
            source.user_id().unwrap_or("unknown")
        )
    } else if command == "what group?" {
        match source {
            EventSource::Group { group_id, .. } => format!("This group ID is: {group_id}"),
            _ => NOT_A_GROUP_REPLY.to_string(),
        }
    } else {
        format!("You said: {text}")
    }
}
