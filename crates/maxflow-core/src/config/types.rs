//! Bot configuration schema.
//!
//! The configuration is a single JSON document with four sections: `flows`
//! (the conversation tree), `buttons` (reusable button templates), `errors`
//! (user-facing error texts) and `commands`/`callbacks` (texts for slash
//! commands and built-in callbacks). String values anywhere in the document
//! may reference the `buttons` section with an `@`-prefix; references are
//! resolved before this schema is deserialized.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unresolved reference '@{reference}': segment '{segment}' not found")]
    UnresolvedReference { reference: String, segment: String },

    #[error("duplicate flow name '{0}'")]
    DuplicateFlowName(String),

    #[error("missing button template '{0}'")]
    MissingButton(String),
}

/// Root of the resolved configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub flows: Vec<FlowConfig>,
    #[serde(default)]
    pub buttons: HashMap<String, Value>,
    #[serde(default)]
    pub errors: HashMap<String, String>,
    pub commands: CommandsConfig,
    pub callbacks: CallbacksConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    pub start: MessageConfig,
    pub reset: MessageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbacksConfig {
    pub exit: MessageConfig,
    pub hide: MessageConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageConfig {
    #[serde(default)]
    pub content: String,
}

/// One node of the conversation tree as authored in the config file.
///
/// `kind` is kept as a raw string here; it is validated when the flow tree
/// is built so that a single unknown kind skips one node instead of failing
/// the whole document.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub privileged: bool,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub search_type: Option<String>,
    #[serde(default)]
    pub use_pagination: Option<bool>,
    #[serde(default)]
    pub flows: Vec<FlowConfig>,
    #[serde(default)]
    pub buttons: Option<FlowButtons>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowButtons {
    #[serde(default)]
    pub inline: Vec<ButtonSpec>,
}

/// A button template: a link button carries `url`, a callback button carries
/// `pattern` (the callback payload). `content` is the optional text shown
/// when the button's callback fires.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ButtonSpec {
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// The built-in button templates every configuration must provide.
#[derive(Debug, Clone)]
pub struct ButtonTemplates {
    pub exit: ButtonSpec,
    pub previous: ButtonSpec,
    pub next: ButtonSpec,
    pub accept: ButtonSpec,
    pub inactive: ButtonSpec,
}

impl ButtonTemplates {
    pub fn from_buttons(buttons: &HashMap<String, Value>) -> Result<Self, ConfigError> {
        Ok(Self {
            exit: Self::template(buttons, "exit")?,
            previous: Self::template(buttons, "previous")?,
            next: Self::template(buttons, "next")?,
            accept: Self::template(buttons, "accept")?,
            inactive: Self::template(buttons, "inactive")?,
        })
    }

    fn template(buttons: &HashMap<String, Value>, key: &str) -> Result<ButtonSpec, ConfigError> {
        let value = buttons
            .get(key)
            .ok_or_else(|| ConfigError::MissingButton(key.to_string()))?;
        Ok(serde_json::from_value(value.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flow_config_accepts_minimal_node() {
        let flow: FlowConfig = serde_json::from_value(json!({
            "name": "About",
            "type": "static",
            "content": "hello"
        }))
        .unwrap();

        assert_eq!(flow.name, "About");
        assert_eq!(flow.kind, "static");
        assert!(!flow.privileged);
        assert!(flow.flows.is_empty());
    }

    #[test]
    fn test_button_templates_require_all_builtins() {
        let mut buttons = HashMap::new();
        buttons.insert("exit".to_string(), json!({"name": "Назад", "pattern": "exit_callback"}));

        let err = ButtonTemplates::from_buttons(&buttons).unwrap_err();
        assert!(matches!(err, ConfigError::MissingButton(key) if key == "previous"));
    }
}
