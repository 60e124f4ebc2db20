//! Free-text handling: forward the message to the search backend and render
//! whatever comes back.

use crate::ai::{SearchBackend, SearchOutcome, SearchRequest};
use crate::channel::keyboard::exit_keyboard;
use crate::channel::traits::ChatClient;
use crate::channel::types::MessageEvent;
use crate::flow::navigation::current_flow;
use crate::flow::pagination::{pagination_keyboard, render_card};
use crate::runtime::context::BotContext;
use crate::runtime::outbound::{clear_tracked_message, send_content};
use anyhow::Result;
use maxflow_storage::{TrackedMessage, User, UserState};
use tracing::{info, warn};

/// Placeholder the answer backend emits when it has nothing real to say.
const NO_ANSWER_MARKER: &str = "https://ya.ru";
const NO_ANSWER_TEXT: &str = "У меня нет информации по этому вопросу";

/// Stack marker for an implicit question session started outside any
/// managed flow.
const FREE_CHAT_MARKER: &str = "";

pub async fn handle_chat(
    ctx: &BotContext,
    client: &dyn ChatClient,
    search: &dyn SearchBackend,
    event: &MessageEvent,
    user: &User,
    state: &mut UserState,
) -> Result<bool> {
    let current = current_flow(&state.flow_stack);
    if current != FREE_CHAT_MARKER && !ctx.tree.managed.contains(current) {
        // Free text outside a search flow opens an implicit FAQ session.
        state.use_pagination = false;
        state.search_type = "questions".to_string();
        state.flow_stack.push(FREE_CHAT_MARKER.to_string());
    }

    info!(
        user_id = user.id,
        search_type = %state.search_type,
        use_pagination = state.use_pagination,
        "forwarding query to search backend"
    );
    let request = SearchRequest::from_user_query(&state.search_type, state.use_pagination, &event.text);
    let outcome = match search.search(request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(user_id = user.id, "search backend failed: {e:#}");
            SearchOutcome::Empty
        }
    };

    let mut pagination_started = false;
    let mut content = match (state.use_pagination, outcome) {
        (true, SearchOutcome::Cards(cards)) if !cards.is_empty() => {
            let total = cards.len() as i64;
            let first = render_card(&cards[0], 0, total);
            state.cards = Some(cards);
            state.cards_current_page = 0;
            state.cards_total_length = total;
            pagination_started = true;
            first
        }
        (false, SearchOutcome::Answer(answer)) => answer,
        (_, SearchOutcome::Empty) => {
            state.cards = None;
            ctx.error_text("query_not_found").to_string()
        }
        // Shape mismatch between the session mode and the response.
        (_, _) => ctx.error_text("query_not_found").to_string(),
    };

    if content.contains(NO_ANSWER_MARKER) {
        content = NO_ANSWER_TEXT.to_string();
    }

    let keyboard = if pagination_started {
        pagination_keyboard(0, state.cards_total_length, &ctx.templates)
    } else {
        exit_keyboard(&ctx.templates)
    };

    clear_tracked_message(client, event.chat_id, state).await;
    if let Some(sent) = send_content(client, event.chat_id, &content, None, None, Some(&keyboard)).await {
        state.tracked_message = Some(TrackedMessage {
            message_id: sent.message_id,
            inline_markup: None,
            needs_deletion: false,
        });
    }
    Ok(true)
}
