//! Immutable per-process bot context assembled from the configuration.

use crate::channel::keyboard::{self, Keyboard};
use crate::config::{
    BotConfig, ButtonTemplates, CallbacksConfig, CommandsConfig, ConfigError, FlowTree, MAIN_FLOW,
};
use std::collections::HashMap;

pub struct BotContext {
    pub tree: FlowTree,
    pub errors: HashMap<String, String>,
    pub templates: ButtonTemplates,
    pub commands: CommandsConfig,
    pub callbacks: CallbacksConfig,
}

impl BotContext {
    pub fn from_config(config: BotConfig) -> Result<Self, ConfigError> {
        let tree = FlowTree::build(&config.flows)?;
        let templates = ButtonTemplates::from_buttons(&config.buttons)?;
        Ok(Self {
            tree,
            errors: config.errors,
            templates,
            commands: config.commands,
            callbacks: config.callbacks,
        })
    }

    /// User-facing error text by key. Missing keys render empty so a config
    /// gap never turns into a panic mid-conversation.
    pub fn error_text(&self, key: &str) -> &str {
        self.errors.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Keyboard of the main menu, VIP-filtered.
    pub fn main_menu(&self, is_vip: bool) -> Keyboard {
        self.menu_for(MAIN_FLOW, is_vip, false).unwrap_or_default()
    }

    /// Keyboard for a flow's menu, VIP-filtered. `with_exit` appends the
    /// back button row (used inside nested flows). `None` when the flow has
    /// no menu at all.
    pub fn menu_for(&self, flow_name: &str, is_vip: bool, with_exit: bool) -> Option<Keyboard> {
        let buttons = self.tree.menus.get(flow_name)?;
        let exit = with_exit.then_some(&self.templates.exit);
        Some(keyboard::menu_keyboard(buttons, is_vip, exit))
    }
}
