//! Event dispatch: one inbound event in, at most one handler out, state
//! persisted on success.

use crate::ai::SearchBackend;
use crate::channel::traits::ChatClient;
use crate::channel::types::{CallbackEvent, Event, MessageEvent};
use crate::runtime::callbacks::{handle_callback, SpecialCallback};
use crate::runtime::chat::handle_chat;
use crate::runtime::commands::{handle_command, Command};
use crate::runtime::context::BotContext;
use crate::runtime::dedup::DedupCache;
use crate::runtime::flows::handle_flow;
use anyhow::Result;
use maxflow_storage::{Storage, User, UserState};
use std::sync::Arc;
use tracing::{debug, error, warn};

pub struct Dispatcher {
    context: Arc<BotContext>,
    storage: Arc<Storage>,
    client: Arc<dyn ChatClient>,
    search: Arc<dyn SearchBackend>,
    dedup: DedupCache,
}

impl Dispatcher {
    pub fn new(
        context: Arc<BotContext>,
        storage: Arc<Storage>,
        client: Arc<dyn ChatClient>,
        search: Arc<dyn SearchBackend>,
    ) -> Self {
        Self {
            context,
            storage,
            client,
            search,
            dedup: DedupCache::with_default_window(),
        }
    }

    pub fn with_dedup_window(mut self, window_ms: i64) -> Self {
        self.dedup = DedupCache::new(window_ms);
        self
    }

    /// Route one event. Users are registered on first contact; the state a
    /// handler mutated is persisted before returning.
    pub async fn dispatch(&self, event: Event) -> Result<()> {
        let user_id = event.user_id();
        if user_id.is_empty() {
            warn!("event without user id, dropping");
            return Ok(());
        }

        let (user, mut state) = self.storage.users.get_or_create(user_id)?;

        let persist = match &event {
            Event::Callback(callback) => self.dispatch_callback(callback, &user, &mut state).await?,
            Event::Message(message) => self.dispatch_message(message, &user, &mut state).await?,
        };

        if persist {
            if let Err(e) = self.storage.users.update_state(user.id, &state) {
                error!(user_id = user.id, "failed to persist state: {e:#}");
            }
        }
        Ok(())
    }

    async fn dispatch_callback(
        &self,
        event: &CallbackEvent,
        user: &User,
        state: &mut UserState,
    ) -> Result<bool> {
        if !self.dedup.check(&event.user_id, &event.payload, event.timestamp_ms) {
            debug!(user_id = %event.user_id, payload = %event.payload, "dropping duplicate callback");
            return Ok(false);
        }

        if let Some(callback) = SpecialCallback::parse(&event.payload) {
            return handle_callback(callback, &self.context, self.client.as_ref(), event, user, state)
                .await;
        }

        if let Some(flow) = self.context.tree.flows.get(&event.payload) {
            return handle_flow(flow, &self.context, self.client.as_ref(), event.chat_id, user, state)
                .await;
        }

        warn!(payload = %event.payload, "callback for unknown flow, dropping");
        Ok(false)
    }

    async fn dispatch_message(
        &self,
        event: &MessageEvent,
        user: &User,
        state: &mut UserState,
    ) -> Result<bool> {
        if event.text.starts_with('/') {
            let Some(command) = Command::parse(&event.text) else {
                warn!(text = %event.text, "unknown command");
                return Ok(false);
            };
            return handle_command(command, &self.context, self.client.as_ref(), event, user, state)
                .await;
        }

        // Typing a flow name is the same as pressing its button.
        if let Some(flow) = self.context.tree.flows.get(&event.text) {
            return handle_flow(flow, &self.context, self.client.as_ref(), event.chat_id, user, state)
                .await;
        }

        handle_chat(
            &self.context,
            self.client.as_ref(),
            self.search.as_ref(),
            event,
            user,
            state,
        )
        .await
    }
}
