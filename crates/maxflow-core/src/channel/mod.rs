//! Messenger channel layer: event types, keyboards, the outbound client
//! trait and the MAX implementation.

pub mod keyboard;
pub mod max;
pub mod traits;
pub mod types;

pub use keyboard::{InlineButton, Keyboard};
pub use max::{normalize_update, MaxClient, MaxUpdate, UpdateBatch};
pub use traits::ChatClient;
pub use types::{CallbackEvent, Event, MessageEvent, SentMessage};
