//! Outbound messenger abstraction.

use crate::channel::keyboard::Keyboard;
use crate::channel::types::SentMessage;
use anyhow::Result;
use async_trait::async_trait;

/// Everything the engine needs from a messenger.
///
/// One implementation speaks the MAX Bot API; tests use [`mock::MockClient`].
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage>;

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage>;

    async fn send_video(
        &self,
        chat_id: i64,
        video_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage>;

    /// Edit a sent message. `text: None` keeps the existing text;
    /// `keyboard: None` removes the inline keyboard.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: &str,
        text: Option<&str>,
        keyboard: Option<&Keyboard>,
    ) -> Result<()>;

    async fn delete_message(&self, chat_id: i64, message_id: &str) -> Result<()>;

    /// Acknowledge a callback press, optionally with a toast text.
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    pub enum ClientCall {
        Send {
            chat_id: i64,
            text: String,
            keyboard: Option<Keyboard>,
        },
        Photo {
            chat_id: i64,
            photo_url: String,
            caption: String,
            keyboard: Option<Keyboard>,
        },
        Video {
            chat_id: i64,
            video_url: String,
            caption: String,
            keyboard: Option<Keyboard>,
        },
        Edit {
            chat_id: i64,
            message_id: String,
            text: Option<String>,
            keyboard: Option<Keyboard>,
        },
        Delete {
            chat_id: i64,
            message_id: String,
        },
        Answer {
            callback_id: String,
            text: Option<String>,
        },
    }

    /// Records every call and hands out sequential message ids.
    #[derive(Debug, Default)]
    pub struct MockClient {
        calls: Mutex<Vec<ClientCall>>,
        next_id: AtomicU64,
    }

    impl MockClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<ClientCall> {
            self.calls.lock().clone()
        }

        pub fn sent_texts(&self) -> Vec<String> {
            self.calls
                .lock()
                .iter()
                .filter_map(|call| match call {
                    ClientCall::Send { text, .. } => Some(text.clone()),
                    ClientCall::Photo { caption, .. } | ClientCall::Video { caption, .. } => {
                        Some(caption.clone())
                    }
                    _ => None,
                })
                .collect()
        }

        pub fn last_call(&self) -> Option<ClientCall> {
            self.calls.lock().last().cloned()
        }

        fn record(&self, call: ClientCall) -> SentMessage {
            self.calls.lock().push(call);
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            SentMessage {
                message_id: format!("m{id}"),
            }
        }
    }

    #[async_trait]
    impl ChatClient for MockClient {
        async fn send_message(
            &self,
            chat_id: i64,
            text: &str,
            keyboard: Option<&Keyboard>,
        ) -> Result<SentMessage> {
            Ok(self.record(ClientCall::Send {
                chat_id,
                text: text.to_string(),
                keyboard: keyboard.cloned(),
            }))
        }

        async fn send_photo(
            &self,
            chat_id: i64,
            photo_url: &str,
            caption: &str,
            keyboard: Option<&Keyboard>,
        ) -> Result<SentMessage> {
            Ok(self.record(ClientCall::Photo {
                chat_id,
                photo_url: photo_url.to_string(),
                caption: caption.to_string(),
                keyboard: keyboard.cloned(),
            }))
        }

        async fn send_video(
            &self,
            chat_id: i64,
            video_url: &str,
            caption: &str,
            keyboard: Option<&Keyboard>,
        ) -> Result<SentMessage> {
            Ok(self.record(ClientCall::Video {
                chat_id,
                video_url: video_url.to_string(),
                caption: caption.to_string(),
                keyboard: keyboard.cloned(),
            }))
        }

        async fn edit_message(
            &self,
            chat_id: i64,
            message_id: &str,
            text: Option<&str>,
            keyboard: Option<&Keyboard>,
        ) -> Result<()> {
            self.record(ClientCall::Edit {
                chat_id,
                message_id: message_id.to_string(),
                text: text.map(String::from),
                keyboard: keyboard.cloned(),
            });
            Ok(())
        }

        async fn delete_message(&self, chat_id: i64, message_id: &str) -> Result<()> {
            self.record(ClientCall::Delete {
                chat_id,
                message_id: message_id.to_string(),
            });
            Ok(())
        }

        async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
            self.record(ClientCall::Answer {
                callback_id: callback_id.to_string(),
                text: text.map(String::from),
            });
            Ok(())
        }
    }
}
