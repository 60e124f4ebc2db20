//! Channel-neutral inbound events.

/// A normalized inbound event, already stripped of transport details.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Message(MessageEvent),
    Callback(CallbackEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageEvent {
    pub chat_id: i64,
    pub message_id: String,
    pub user_id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallbackEvent {
    pub chat_id: i64,
    /// Id of the message carrying the keyboard that was pressed.
    pub message_id: String,
    pub user_id: String,
    pub payload: String,
    pub callback_id: String,
    /// Platform timestamp of the press, used for duplicate suppression.
    pub timestamp_ms: i64,
}

impl Event {
    pub fn user_id(&self) -> &str {
        match self {
            Event::Message(m) => &m.user_id,
            Event::Callback(c) => &c.user_id,
        }
    }

    pub fn chat_id(&self) -> i64 {
        match self {
            Event::Message(m) => m.chat_id,
            Event::Callback(c) => c.chat_id,
        }
    }
}

/// Receipt for an outbound message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentMessage {
    pub message_id: String,
}
