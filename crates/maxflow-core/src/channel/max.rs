//! MAX Bot API client.
//!
//! Thin reqwest wrapper over the platform REST API plus the pure
//! normalization of raw updates into [`Event`]s.

use crate::channel::keyboard::Keyboard;
use crate::channel::traits::ChatClient;
use crate::channel::types::{CallbackEvent, Event, MessageEvent, SentMessage};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

const MAX_API_BASE: &str = "https://platform-api.max.ru";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct MaxClient {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl MaxClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            api_base: MAX_API_BASE.to_string(),
        }
    }

    /// Point the client at a different API host (tests, staging).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base, endpoint)
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        timeout: Duration,
    ) -> Result<Value> {
        let mut request = self
            .client
            .request(method.clone(), self.url(endpoint))
            .header("Authorization", &self.token)
            .timeout(timeout);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{method} {endpoint} failed"))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(anyhow!("{method} {endpoint} returned {status}: {text}"));
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).with_context(|| format!("{method} {endpoint}: bad response body"))
    }

    /// Long-poll for updates. `timeout_secs` is the server-side hold time;
    /// the HTTP timeout is padded past it.
    pub async fn get_updates(
        &self,
        marker: Option<i64>,
        limit: u32,
        timeout_secs: u32,
    ) -> Result<UpdateBatch> {
        let mut endpoint = format!("/updates?limit={limit}&timeout={timeout_secs}");
        if let Some(marker) = marker {
            endpoint.push_str(&format!("&marker={marker}"));
        }

        let response = self
            .request(
                Method::GET,
                &endpoint,
                None,
                Duration::from_secs(u64::from(timeout_secs) + 10),
            )
            .await?;
        Ok(serde_json::from_value(response)?)
    }
}

#[async_trait]
impl ChatClient for MaxClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage> {
        let mut body = json!({
            "text": format_outgoing(text),
            "format": "markdown",
        });
        if let Some(keyboard) = keyboard {
            body["attachments"] = json!([keyboard.to_attachment()]);
        }
        let response = self
            .request(
                Method::POST,
                &format!("/messages?chat_id={chat_id}"),
                Some(body),
                Duration::from_secs(REQUEST_TIMEOUT_SECS),
            )
            .await?;

        debug!(chat_id, "sent message");
        Ok(sent_message_of(&response))
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage> {
        self.send_media(chat_id, "image", photo_url, caption, keyboard)
            .await
    }

    async fn send_video(
        &self,
        chat_id: i64,
        video_url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage> {
        self.send_media(chat_id, "video", video_url, caption, keyboard)
            .await
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: &str,
        text: Option<&str>,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        let mut body = json!({
            // An empty attachment list drops the inline keyboard.
            "attachments": keyboard
                .map(|k| vec![k.to_attachment()])
                .unwrap_or_default(),
        });
        if let Some(text) = text {
            body["text"] = Value::String(format_outgoing(text));
            body["format"] = Value::String("markdown".to_string());
        }
        self.request(
            Method::PATCH,
            &format!("/messages/{message_id}"),
            Some(body),
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
        .await?;

        debug!(chat_id, message_id, "edited message");
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: &str) -> Result<()> {
        self.request(
            Method::DELETE,
            &format!("/messages/{message_id}"),
            None,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
        .await?;

        debug!(chat_id, message_id, "deleted message");
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let mut body = json!({
            "callback_query_id": callback_id,
            "show_alert": false,
        });
        if let Some(text) = text {
            body["text"] = Value::String(text.to_string());
        }
        self.request(
            Method::POST,
            "/bot/v1/answerCallbackQuery",
            Some(body),
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
        .await?;
        Ok(())
    }
}

impl MaxClient {
    async fn send_media(
        &self,
        chat_id: i64,
        media_type: &str,
        url: &str,
        caption: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<SentMessage> {
        let mut attachments = vec![json!({
            "type": media_type,
            "payload": {"url": url},
        })];
        if let Some(keyboard) = keyboard {
            attachments.push(keyboard.to_attachment());
        }
        let body = json!({
            "text": format_outgoing(caption),
            "attachments": attachments,
            "format": "markdown",
        });
        let response = self
            .request(
                Method::POST,
                &format!("/messages?chat_id={chat_id}"),
                Some(body),
                Duration::from_secs(REQUEST_TIMEOUT_SECS),
            )
            .await?;

        debug!(chat_id, media_type, "sent media message");
        Ok(sent_message_of(&response))
    }
}

fn sent_message_of(response: &Value) -> SentMessage {
    let message_id = response["message"]["body"]["mid"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    SentMessage { message_id }
}

/// Markdown arrives from config and the AI service with escaped emphasis
/// markers; MAX renders them literally unless unescaped.
pub fn format_outgoing(text: &str) -> String {
    text.replace("\\*", "*").replace("\\_", "_")
}

// ---------------------------------------------------------------------------
// Wire types for /updates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBatch {
    #[serde(default)]
    pub updates: Vec<MaxUpdate>,
    #[serde(default)]
    pub marker: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaxUpdate {
    #[serde(default)]
    pub update_type: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message: Option<WireMessage>,
    #[serde(default)]
    pub callback: Option<WireCallback>,
    #[serde(default)]
    pub sender: Option<WireUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub body: Option<WireBody>,
    #[serde(default)]
    pub recipient: Option<WireRecipient>,
    #[serde(default)]
    pub sender: Option<WireUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireBody {
    #[serde(default)]
    pub mid: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireRecipient {
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireUser {
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireCallback {
    #[serde(default)]
    pub callback_id: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub user: Option<WireUser>,
}

/// Normalize a raw update into an [`Event`]. Unknown update types and
/// updates missing a chat id or payload are dropped with a warning.
pub fn normalize_update(update: &MaxUpdate) -> Option<Event> {
    let user_id = extract_user_id(update)?;

    match update.update_type.as_str() {
        "message_created" => {
            let message = update.message.as_ref()?;
            let chat_id = message.recipient.as_ref().and_then(|r| r.chat_id);
            let Some(chat_id) = chat_id else {
                warn!(%user_id, "message update without chat id, dropping");
                return None;
            };
            let body = message.body.as_ref();
            Some(Event::Message(MessageEvent {
                chat_id,
                message_id: body.and_then(|b| b.mid.clone()).unwrap_or_default(),
                user_id,
                text: body.and_then(|b| b.text.clone()).unwrap_or_default(),
            }))
        }
        "message_callback" => {
            let callback = update.callback.as_ref()?;
            let payload = callback.payload.clone()?;
            let chat_id = update
                .message
                .as_ref()
                .and_then(|m| m.recipient.as_ref())
                .and_then(|r| r.chat_id);
            let Some(chat_id) = chat_id else {
                warn!(%user_id, "callback update without chat id, dropping");
                return None;
            };
            Some(Event::Callback(CallbackEvent {
                chat_id,
                message_id: update
                    .message
                    .as_ref()
                    .and_then(|m| m.body.as_ref())
                    .and_then(|b| b.mid.clone())
                    .unwrap_or_default(),
                user_id,
                payload,
                callback_id: callback.callback_id.clone().unwrap_or_default(),
                timestamp_ms: callback.timestamp.or(update.timestamp).unwrap_or_default(),
            }))
        }
        other => {
            debug!(update_type = other, "ignoring update type");
            None
        }
    }
}

/// The platform reports the acting user in different places depending on
/// the update type; check them in order of reliability.
fn extract_user_id(update: &MaxUpdate) -> Option<String> {
    let from_sender = update.sender.as_ref().and_then(|u| u.user_id);
    let from_recipient = update
        .message
        .as_ref()
        .and_then(|m| m.recipient.as_ref())
        .and_then(|r| r.user_id);
    let from_callback = update
        .callback
        .as_ref()
        .and_then(|c| c.user.as_ref())
        .and_then(|u| u.user_id);

    let id = from_sender.or(from_recipient).or(from_callback);
    if id.is_none() {
        warn!(update_type = %update.update_type, "update without user id, dropping");
    }
    id.map(|v| v.to_string())
}
