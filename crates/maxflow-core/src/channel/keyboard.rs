//! Inline keyboards.
//!
//! Keyboards are built channel-neutral and converted to the MAX attachment
//! shape only at the wire boundary. Menus render one button per row.

use crate::config::{ButtonSpec, ButtonTemplates, MenuButton};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ButtonAction {
    Callback(String),
    Link(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

impl InlineButton {
    pub fn callback(text: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(payload.into()),
        }
    }

    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Link(url.into()),
        }
    }

    /// Build a button from a config template. Link templates win over
    /// callback templates; a template with neither uses its name as payload.
    pub fn from_spec(spec: &ButtonSpec) -> Self {
        if let Some(url) = &spec.url {
            return Self::link(&spec.name, url);
        }
        let payload = spec.pattern.clone().unwrap_or_else(|| spec.name.clone());
        Self::callback(&spec.name, payload)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Keyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl Keyboard {
    pub fn from_rows(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// One button per row.
    pub fn single_column(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a MAX `inline_keyboard` attachment.
    pub fn to_attachment(&self) -> Value {
        let buttons: Vec<Vec<Value>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| match &button.action {
                        ButtonAction::Callback(payload) => json!({
                            "text": button.text,
                            "type": "callback",
                            "payload": payload,
                        }),
                        ButtonAction::Link(url) => json!({
                            "text": button.text,
                            "type": "link",
                            "url": url,
                        }),
                    })
                    .collect()
            })
            .collect();

        json!({
            "type": "inline_keyboard",
            "payload": {"buttons": buttons},
        })
    }
}

/// Build the keyboard for a flow menu, one button per row.
///
/// Privileged entries are dropped for non-VIP users. The exit template, when
/// given, is appended as the last row so nested menus always offer a way
/// back.
pub fn menu_keyboard(
    buttons: &[MenuButton],
    is_vip: bool,
    exit: Option<&ButtonSpec>,
) -> Keyboard {
    let mut rows: Vec<Vec<InlineButton>> = buttons
        .iter()
        .filter(|b| is_vip || !b.privileged)
        .map(|b| vec![InlineButton::callback(&b.name, &b.name)])
        .collect();
    if let Some(exit) = exit {
        rows.push(vec![InlineButton::from_spec(exit)]);
    }
    Keyboard::from_rows(rows)
}

/// Keyboard from a flow's own inline button templates.
pub fn inline_keyboard(specs: &[ButtonSpec]) -> Keyboard {
    Keyboard::single_column(specs.iter().map(InlineButton::from_spec).collect())
}

/// Plain reply keyboard with just the exit button.
pub fn exit_keyboard(templates: &ButtonTemplates) -> Keyboard {
    Keyboard::from_rows(vec![vec![InlineButton::from_spec(&templates.exit)]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, pattern: Option<&str>, url: Option<&str>) -> ButtonSpec {
        ButtonSpec {
            name: name.to_string(),
            url: url.map(String::from),
            pattern: pattern.map(String::from),
            content: None,
        }
    }

    #[test]
    fn test_menu_keyboard_filters_privileged_for_regular_users() {
        let buttons = vec![
            MenuButton {
                name: "Public".to_string(),
                privileged: false,
            },
            MenuButton {
                name: "Vip only".to_string(),
                privileged: true,
            },
        ];

        let regular = menu_keyboard(&buttons, false, None);
        assert_eq!(regular.rows.len(), 1);
        assert_eq!(regular.rows[0][0].text, "Public");

        let vip = menu_keyboard(&buttons, true, None);
        assert_eq!(vip.rows.len(), 2);
    }

    #[test]
    fn test_menu_keyboard_appends_exit_row() {
        let buttons = vec![MenuButton {
            name: "A".to_string(),
            privileged: false,
        }];
        let exit = spec("Назад", Some("exit_callback"), None);

        let keyboard = menu_keyboard(&buttons, false, Some(&exit));
        assert_eq!(keyboard.rows.len(), 2);
        assert_eq!(
            keyboard.rows[1][0].action,
            ButtonAction::Callback("exit_callback".to_string())
        );
    }

    #[test]
    fn test_from_spec_prefers_url() {
        let button = InlineButton::from_spec(&spec("Сайт", Some("x"), Some("https://example.ru")));
        assert_eq!(button.action, ButtonAction::Link("https://example.ru".to_string()));
    }

    #[test]
    fn test_to_attachment_shape() {
        let keyboard = Keyboard::from_rows(vec![vec![
            InlineButton::callback("Да", "yes"),
            InlineButton::link("Сайт", "https://example.ru"),
        ]]);

        let attachment = keyboard.to_attachment();
        assert_eq!(attachment["type"], "inline_keyboard");
        let row = &attachment["payload"]["buttons"][0];
        assert_eq!(row[0]["type"], "callback");
        assert_eq!(row[0]["payload"], "yes");
        assert_eq!(row[1]["type"], "link");
        assert_eq!(row[1]["url"], "https://example.ru");
    }
}
