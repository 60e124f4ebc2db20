//! Outbound send helpers shared by the handlers.
//!
//! Delivery failures are logged and swallowed here: one bad chat must not
//! poison the rest of the update batch.

use crate::channel::keyboard::Keyboard;
use crate::channel::traits::ChatClient;
use crate::channel::types::SentMessage;
use maxflow_storage::UserState;
use tracing::{error, warn};

/// Send content, as a photo or video message when the flow carries media.
/// Photo wins when a flow is configured with both.
pub async fn send_content(
    client: &dyn ChatClient,
    chat_id: i64,
    content: &str,
    photo: Option<&str>,
    video: Option<&str>,
    keyboard: Option<&Keyboard>,
) -> Option<SentMessage> {
    let result = match (photo, video) {
        (Some(url), _) => client.send_photo(chat_id, url, content, keyboard).await,
        (None, Some(url)) => client.send_video(chat_id, url, content, keyboard).await,
        (None, None) => client.send_message(chat_id, content, keyboard).await,
    };
    match result {
        Ok(sent) => Some(sent),
        Err(e) => {
            error!(chat_id, "failed to send message: {e:#}");
            None
        }
    }
}

/// Retire the previously tracked message before a new reply goes out:
/// delete it when flagged, otherwise restore its recorded keyboard (which
/// is usually none, dropping the stale buttons).
pub async fn clear_tracked_message(
    client: &dyn ChatClient,
    chat_id: i64,
    state: &mut UserState,
) {
    let Some(tracked) = state.tracked_message.take() else {
        return;
    };

    let result = if tracked.needs_deletion {
        client.delete_message(chat_id, &tracked.message_id).await
    } else {
        let keyboard = tracked
            .inline_markup
            .and_then(|value| serde_json::from_value::<Keyboard>(value).ok());
        client
            .edit_message(chat_id, &tracked.message_id, None, keyboard.as_ref())
            .await
    };
    if let Err(e) = result {
        warn!(
            chat_id,
            message_id = %tracked.message_id,
            "failed to retire tracked message: {e:#}"
        );
    }
}
