//! Flow tree construction.
//!
//! The authored configuration is a recursive list of flows; dispatch wants a
//! flat registry keyed by flow name plus, for every flow that has children,
//! the menu shown while inside it. Both are built here in one depth-first
//! pass.

use crate::config::types::{ButtonSpec, ConfigError, FlowConfig};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Name of the implicit root menu.
pub const MAIN_FLOW: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// Renders fixed content, never changes navigation.
    Static,
    /// Renders content plus the menu of its children; entering it pushes
    /// onto the navigation stack.
    ExtendedStatic,
    /// Opens an AI-backed search session; entering it pushes onto the stack
    /// and arms `search_type`/`use_pagination`.
    Managed,
}

impl FlowKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "static" => Some(Self::Static),
            "extended_static" => Some(Self::ExtendedStatic),
            "managed" => Some(Self::Managed),
            _ => None,
        }
    }
}

/// A single entry of a flow menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub name: String,
    pub privileged: bool,
}

/// A registered flow, flattened out of the config tree.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    pub name: String,
    pub kind: FlowKind,
    /// Nested flows may only be entered from their parent's menu. Managed
    /// flows are always treated as nested, wherever they are authored.
    pub is_nested: bool,
    pub parent_name: String,
    pub privileged: bool,
    pub content: String,
    pub photo: Option<String>,
    pub video: Option<String>,
    pub search_type: String,
    pub use_pagination: bool,
    pub inline_buttons: Vec<ButtonSpec>,
}

/// Flattened conversation tree: flow registry, per-flow menus and the set of
/// managed (search) flows.
#[derive(Debug, Clone, Default)]
pub struct FlowTree {
    pub flows: HashMap<String, FlowDefinition>,
    pub menus: HashMap<String, Vec<MenuButton>>,
    pub managed: HashSet<String>,
}

impl FlowTree {
    pub fn build(flows: &[FlowConfig]) -> Result<Self, ConfigError> {
        let mut tree = Self::default();

        tree.menus.insert(MAIN_FLOW.to_string(), menu_of(flows));
        for flow in flows {
            tree.register(flow, false, MAIN_FLOW)?;
        }

        Ok(tree)
    }

    fn register(
        &mut self,
        flow: &FlowConfig,
        is_nested: bool,
        parent_name: &str,
    ) -> Result<(), ConfigError> {
        if !flow.flows.is_empty() {
            self.menus.insert(flow.name.clone(), menu_of(&flow.flows));
        }
        for child in &flow.flows {
            self.register(child, true, &flow.name)?;
        }

        let Some(kind) = FlowKind::parse(&flow.kind) else {
            warn!(name = %flow.name, kind = %flow.kind, "skipping flow with unknown type");
            return Ok(());
        };

        if self.flows.contains_key(&flow.name) {
            return Err(ConfigError::DuplicateFlowName(flow.name.clone()));
        }

        if kind == FlowKind::Managed {
            self.managed.insert(flow.name.clone());
        }

        let definition = FlowDefinition {
            name: flow.name.clone(),
            kind,
            is_nested: is_nested || kind == FlowKind::Managed,
            parent_name: parent_name.to_string(),
            privileged: flow.privileged,
            content: flow.content.clone(),
            photo: flow.photo.clone(),
            video: flow.video.clone(),
            search_type: flow.search_type.clone().unwrap_or_default(),
            use_pagination: flow.use_pagination.unwrap_or(false),
            inline_buttons: flow
                .buttons
                .as_ref()
                .map(|b| b.inline.clone())
                .unwrap_or_default(),
        };
        self.flows.insert(flow.name.clone(), definition);
        Ok(())
    }
}

fn menu_of(flows: &[FlowConfig]) -> Vec<MenuButton> {
    flows
        .iter()
        .map(|f| MenuButton {
            name: f.name.clone(),
            privileged: f.privileged,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flows(value: serde_json::Value) -> Vec<FlowConfig> {
        serde_json::from_value(value).unwrap()
    }

    fn sample() -> Vec<FlowConfig> {
        flows(json!([
            {
                "name": "Services",
                "type": "extended_static",
                "content": "pick one",
                "flows": [
                    {"name": "About", "type": "static", "content": "about us"},
                    {"name": "Search", "type": "managed", "content": "ask away",
                     "search_type": "products", "use_pagination": true}
                ]
            },
            {"name": "Help", "type": "static", "content": "help text", "privileged": true}
        ]))
    }

    #[test]
    fn test_registers_all_flows_flat() {
        let tree = FlowTree::build(&sample()).unwrap();
        assert_eq!(tree.flows.len(), 4);
        assert!(tree.flows.contains_key("Search"));
        assert!(tree.flows.contains_key("Help"));
    }

    #[test]
    fn test_children_are_nested_with_parent() {
        let tree = FlowTree::build(&sample()).unwrap();

        let about = &tree.flows["About"];
        assert!(about.is_nested);
        assert_eq!(about.parent_name, "Services");

        let services = &tree.flows["Services"];
        assert!(!services.is_nested);
        assert_eq!(services.parent_name, MAIN_FLOW);
    }

    #[test]
    fn test_managed_flow_is_always_nested() {
        let tree = FlowTree::build(&flows(json!([
            {"name": "RootSearch", "type": "managed", "content": "q", "search_type": "questions"}
        ])))
        .unwrap();

        let flow = &tree.flows["RootSearch"];
        assert!(flow.is_nested);
        assert!(tree.managed.contains("RootSearch"));
    }

    #[test]
    fn test_menus_keyed_by_parent() {
        let tree = FlowTree::build(&sample()).unwrap();

        let main = &tree.menus[MAIN_FLOW];
        assert_eq!(main.len(), 2);
        assert_eq!(main[0].name, "Services");
        assert!(main[1].privileged);

        let services = &tree.menus["Services"];
        assert_eq!(
            services.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            vec!["About", "Search"]
        );
    }

    #[test]
    fn test_duplicate_name_is_fatal() {
        let err = FlowTree::build(&flows(json!([
            {"name": "A", "type": "static", "content": "1"},
            {"name": "A", "type": "static", "content": "2"}
        ])))
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateFlowName(name) if name == "A"));
    }

    #[test]
    fn test_unknown_kind_is_skipped_but_kept_in_menu() {
        let tree = FlowTree::build(&flows(json!([
            {"name": "Odd", "type": "carousel", "content": "x"},
            {"name": "Ok", "type": "static", "content": "y"}
        ])))
        .unwrap();

        assert!(!tree.flows.contains_key("Odd"));
        assert!(tree.flows.contains_key("Ok"));
        // The menu still lists it so the config author sees the button.
        assert_eq!(tree.menus[MAIN_FLOW].len(), 2);
    }
}
