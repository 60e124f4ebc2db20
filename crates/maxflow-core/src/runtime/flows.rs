//! Flow entry: what happens when a user presses a flow button (or types a
//! flow name).

use crate::channel::keyboard::{inline_keyboard, Keyboard};
use crate::channel::traits::ChatClient;
use crate::config::{FlowDefinition, FlowKind};
use crate::flow::navigation::{enter_flow, Transition};
use crate::runtime::context::BotContext;
use crate::runtime::outbound::send_content;
use anyhow::Result;
use maxflow_storage::{User, UserState};
use tracing::{info, warn};

/// Dispatch one flow entry. Returns whether state changed and should be
/// persisted.
pub async fn handle_flow(
    flow: &FlowDefinition,
    ctx: &BotContext,
    client: &dyn ChatClient,
    chat_id: i64,
    user: &User,
    state: &mut UserState,
) -> Result<bool> {
    if flow.privileged && !user.is_vip {
        warn!(user_id = user.id, flow = %flow.name, "privileged flow denied");
        let text = ctx.error_text("user_not_allowed");
        if !text.is_empty() {
            send_content(client, chat_id, text, None, None, None).await;
        }
        return Ok(false);
    }

    match flow.kind {
        FlowKind::Static => handle_static(flow, client, chat_id).await,
        FlowKind::ExtendedStatic => handle_extended(flow, ctx, client, chat_id, user, state).await,
        FlowKind::Managed => handle_managed(flow, ctx, client, chat_id, user, state).await,
    }
}

/// Static flows render and leave navigation alone.
async fn handle_static(
    flow: &FlowDefinition,
    client: &dyn ChatClient,
    chat_id: i64,
) -> Result<bool> {
    let keyboard = (!flow.inline_buttons.is_empty()).then(|| inline_keyboard(&flow.inline_buttons));
    send_content(
        client,
        chat_id,
        &flow.content,
        flow.photo.as_deref(),
        flow.video.as_deref(),
        keyboard.as_ref(),
    )
    .await;
    Ok(false)
}

async fn handle_extended(
    flow: &FlowDefinition,
    ctx: &BotContext,
    client: &dyn ChatClient,
    chat_id: i64,
    user: &User,
    state: &mut UserState,
) -> Result<bool> {
    if !apply_entry(flow, ctx, state, user) {
        return Ok(false);
    }

    // Show the flow's own menu; nested menus get a back button.
    let keyboard = ctx
        .menu_for(&flow.name, user.is_vip, flow.is_nested)
        .or_else(|| {
            (!flow.inline_buttons.is_empty()).then(|| inline_keyboard(&flow.inline_buttons))
        })
        .unwrap_or_else(Keyboard::default);
    send_content(
        client,
        chat_id,
        &flow.content,
        flow.photo.as_deref(),
        flow.video.as_deref(),
        Some(&keyboard),
    )
    .await;
    Ok(true)
}

async fn handle_managed(
    flow: &FlowDefinition,
    ctx: &BotContext,
    client: &dyn ChatClient,
    chat_id: i64,
    user: &User,
    state: &mut UserState,
) -> Result<bool> {
    if !apply_entry(flow, ctx, state, user) {
        return Ok(false);
    }

    state.search_type = flow.search_type.clone();
    state.use_pagination = flow.use_pagination;

    send_content(client, chat_id, &flow.content, flow.photo.as_deref(), flow.video.as_deref(), None).await;
    Ok(true)
}

/// Run the navigation rules and mutate the stack on acceptance.
fn apply_entry(flow: &FlowDefinition, ctx: &BotContext, state: &mut UserState, user: &User) -> bool {
    match enter_flow(&state.flow_stack, flow, &ctx.tree.menus) {
        Transition::Unchanged => true,
        Transition::Entered(stack) => {
            info!(user_id = user.id, flow = %flow.name, ?stack, "entered flow");
            state.flow_stack = stack;
            true
        }
        Transition::Rejected => {
            warn!(
                user_id = user.id,
                flow = %flow.name,
                stack = ?state.flow_stack,
                "flow entry rejected"
            );
            false
        }
    }
}
