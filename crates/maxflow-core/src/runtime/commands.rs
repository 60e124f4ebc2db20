//! Slash command handling.

use crate::channel::traits::ChatClient;
use crate::channel::types::MessageEvent;
use crate::config::MAIN_FLOW;
use crate::runtime::context::BotContext;
use crate::runtime::outbound::{clear_tracked_message, send_content};
use anyhow::Result;
use maxflow_storage::{User, UserState};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Reset,
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "/start" => Some(Self::Start),
            "/reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Both commands drop the user back to the main menu; `/reset` additionally
/// retires the tracked search message.
pub async fn handle_command(
    command: Command,
    ctx: &BotContext,
    client: &dyn ChatClient,
    event: &MessageEvent,
    user: &User,
    state: &mut UserState,
) -> Result<bool> {
    info!(user_id = user.id, ?command, "handling command");

    state.flow_stack = vec![MAIN_FLOW.to_string()];
    state.clear_search();

    let content = match command {
        Command::Start => &ctx.commands.start.content,
        Command::Reset => {
            clear_tracked_message(client, event.chat_id, state).await;
            &ctx.commands.reset.content
        }
    };

    let keyboard = ctx.main_menu(user.is_vip);
    send_content(client, event.chat_id, content, None, None, Some(&keyboard)).await;
    Ok(true)
}
