//! Card pagination for AI search results.

use crate::channel::keyboard::{InlineButton, Keyboard};
use crate::config::ButtonTemplates;
use serde_json::Value;

/// Toast shown when a disabled pagination button is pressed.
pub const INACTIVE_ANSWER: &str = "Это первая страница";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    Previous,
    Next,
    /// "Stay here" confirmation; never moves.
    Accept,
}

/// Compute the page after a move, clamped to `[0, total)`.
pub fn advance(current: i64, total: i64, mv: PageMove) -> i64 {
    let next = match mv {
        PageMove::Previous => current - 1,
        PageMove::Next => current + 1,
        PageMove::Accept => current,
    };
    next.clamp(0, total.saturating_sub(1).max(0))
}

/// Render one result card.
///
/// The header counts pages from 1; every other line is optional and only
/// rendered when the card carries the field.
pub fn render_card(card: &Value, page: i64, total: i64) -> String {
    let mut lines = vec![format!("📄 Результат {} из {}", page + 1, total)];

    if let Some(name) = text_field(card, "name").or_else(|| text_field(card, "title")) {
        lines.push(format!("\n*{name}*"));
    }
    if let Some(description) = text_field(card, "description") {
        lines.push(description.to_string());
    }
    if let Some(company) = text_field(card, "company") {
        lines.push(format!("🏢 {company}"));
    }
    if let Some(category) = text_field(card, "category") {
        lines.push(format!("📂 {category}"));
    }
    if let Some(location) = text_field(card, "location") {
        lines.push(format!("📍 {location}"));
    }
    if let Some(contact) = text_field(card, "contact") {
        lines.push(format!("📞 {contact}"));
    }
    if let Some(url) = text_field(card, "url") {
        lines.push(format!("🔗 [Подробнее]({url})"));
    }

    lines.join("\n")
}

fn text_field<'a>(card: &'a Value, key: &str) -> Option<&'a str> {
    card.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Keyboard shown under a paginated card. Previous/next are replaced by the
/// inactive template at the corresponding edge of the result list.
pub fn pagination_keyboard(page: i64, total: i64, templates: &ButtonTemplates) -> Keyboard {
    let previous = if page > 0 {
        InlineButton::from_spec(&templates.previous)
    } else {
        InlineButton::from_spec(&templates.inactive)
    };
    let next = if page < total - 1 {
        InlineButton::from_spec(&templates.next)
    } else {
        InlineButton::from_spec(&templates.inactive)
    };

    Keyboard::from_rows(vec![
        vec![previous, InlineButton::from_spec(&templates.accept), next],
        vec![InlineButton::from_spec(&templates.exit)],
    ])
}
