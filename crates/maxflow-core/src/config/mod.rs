//! Configuration loading: raw JSON -> reference resolution -> typed schema.

pub mod resolve;
pub mod tree;
pub mod types;

pub use tree::{FlowDefinition, FlowKind, FlowTree, MenuButton, MAIN_FLOW};
pub use types::{
    BotConfig, ButtonSpec, ButtonTemplates, CallbacksConfig, CommandsConfig, ConfigError,
    FlowButtons, FlowConfig, MessageConfig,
};

use serde_json::Value;
use std::path::Path;

/// Load and resolve a configuration file.
pub fn load_bot_config(path: &Path) -> Result<BotConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&raw)?;
    let resolved = resolve::resolve_document(&doc)?;
    Ok(serde_json::from_value(resolved)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_bot_config_resolves_references() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "buttons": {{
                    "exit": {{"name": "Назад", "pattern": "exit_callback"}}
                }},
                "errors": {{"button_not_found": "Кнопка не найдена"}},
                "commands": {{"start": {{"content": "Привет"}}, "reset": {{"content": "Сброс"}}}},
                "callbacks": {{"exit": {{"content": "Выберите раздел"}}, "hide": {{"content": ""}}}},
                "flows": [
                    {{"name": "Инфо", "type": "static", "content": "текст",
                      "buttons": {{"inline": ["@exit"]}}}}
                ]
            }}"#
        )
        .unwrap();

        let config = load_bot_config(file.path()).unwrap();
        assert_eq!(config.flows.len(), 1);
        let inline = &config.flows[0].buttons.as_ref().unwrap().inline;
        assert_eq!(inline[0].name, "Назад");
        assert_eq!(inline[0].pattern.as_deref(), Some("exit_callback"));
        assert_eq!(config.commands.start.content, "Привет");
    }
}
