//! Built-in callback handling: navigation back, message hiding and the
//! pagination controls.

use crate::channel::traits::ChatClient;
use crate::channel::types::CallbackEvent;
use crate::config::MAIN_FLOW;
use crate::flow::navigation::{current_flow, leave_flow};
use crate::flow::pagination::{advance, pagination_keyboard, render_card, PageMove, INACTIVE_ANSWER};
use crate::runtime::context::BotContext;
use crate::runtime::outbound::send_content;
use anyhow::Result;
use maxflow_storage::{User, UserState};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCallback {
    Exit,
    Hide,
    Previous,
    Next,
    Accept,
    Inactive,
}

impl SpecialCallback {
    pub fn parse(payload: &str) -> Option<Self> {
        match payload {
            "exit_callback" => Some(Self::Exit),
            "hide_callback" => Some(Self::Hide),
            "previous_callback" => Some(Self::Previous),
            "next_callback" => Some(Self::Next),
            "accept_callback" => Some(Self::Accept),
            "inactive_callback" => Some(Self::Inactive),
            _ => None,
        }
    }
}

pub async fn handle_callback(
    callback: SpecialCallback,
    ctx: &BotContext,
    client: &dyn ChatClient,
    event: &CallbackEvent,
    user: &User,
    state: &mut UserState,
) -> Result<bool> {
    match callback {
        SpecialCallback::Exit => handle_exit(ctx, client, event, user, state).await,
        SpecialCallback::Hide => handle_hide(client, event).await,
        SpecialCallback::Previous => {
            handle_page_move(PageMove::Previous, ctx, client, event, state).await
        }
        SpecialCallback::Next => handle_page_move(PageMove::Next, ctx, client, event, state).await,
        SpecialCallback::Accept => {
            handle_page_move(PageMove::Accept, ctx, client, event, state).await
        }
        SpecialCallback::Inactive => handle_inactive(client, event).await,
    }
}

/// Back: pop one level, drop any search session and show the menu of the
/// flow we land on.
async fn handle_exit(
    ctx: &BotContext,
    client: &dyn ChatClient,
    event: &CallbackEvent,
    user: &User,
    state: &mut UserState,
) -> Result<bool> {
    state.flow_stack = leave_flow(&state.flow_stack);
    state.clear_search();

    let landed = current_flow(&state.flow_stack).to_string();
    info!(user_id = user.id, landed = %landed, "navigated back");

    if let Some(keyboard) = ctx.menu_for(&landed, user.is_vip, landed != MAIN_FLOW) {
        send_content(
            client,
            event.chat_id,
            &ctx.callbacks.exit.content,
            None,
            None,
            Some(&keyboard),
        )
        .await;
    }
    Ok(true)
}

async fn handle_hide(client: &dyn ChatClient, event: &CallbackEvent) -> Result<bool> {
    if let Err(e) = client.delete_message(event.chat_id, &event.message_id).await {
        warn!(
            chat_id = event.chat_id,
            message_id = %event.message_id,
            "failed to hide message: {e:#}"
        );
    }
    Ok(false)
}

/// Page turn: edit the card message in place and ack the press.
async fn handle_page_move(
    mv: PageMove,
    ctx: &BotContext,
    client: &dyn ChatClient,
    event: &CallbackEvent,
    state: &mut UserState,
) -> Result<bool> {
    let Some(cards) = state.cards.as_ref() else {
        warn!(user_id = %event.user_id, "page move without an active search");
        return Ok(false);
    };

    let total = state.cards_total_length;
    let page = advance(state.cards_current_page, total, mv);
    let Some(card) = cards.get(page as usize) else {
        warn!(page, total, "card index out of range");
        return Ok(false);
    };

    let content = render_card(card, page, total);
    let keyboard = pagination_keyboard(page, total, &ctx.templates);
    if let Err(e) = client
        .edit_message(event.chat_id, &event.message_id, Some(&content), Some(&keyboard))
        .await
    {
        warn!(chat_id = event.chat_id, "failed to edit card message: {e:#}");
    }
    if let Err(e) = client.answer_callback(&event.callback_id, None).await {
        warn!("failed to answer callback: {e:#}");
    }

    state.cards_current_page = page;
    Ok(true)
}

/// Disabled buttons still deserve an answer, otherwise the client spins.
async fn handle_inactive(client: &dyn ChatClient, event: &CallbackEvent) -> Result<bool> {
    if let Err(e) = client
        .answer_callback(&event.callback_id, Some(INACTIVE_ANSWER))
        .await
    {
        warn!("failed to answer callback: {e:#}");
    }
    Ok(false)
}
