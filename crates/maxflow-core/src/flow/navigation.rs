//! Navigation over the flow stack.
//!
//! The stack is bottom-anchored at `"main"`. All transitions are pure: they
//! take the current stack and return the resulting one, so every rule here
//! is testable without a messenger or a database.

use crate::config::{FlowDefinition, MenuButton, MAIN_FLOW};
use std::collections::HashMap;

/// Outcome of attempting to enter a flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Re-entering the current flow; the stack is untouched.
    Unchanged,
    /// Entry accepted; this is the new stack.
    Entered(Vec<String>),
    /// Entry is not allowed from the current position.
    Rejected,
}

/// Apply the entry rules for `flow` against the current stack.
///
/// Re-entering the flow on top is always allowed and changes nothing. A
/// nested flow may be entered only while its button is on the current menu.
/// A root flow may be entered only from `"main"`.
pub fn enter_flow(
    stack: &[String],
    flow: &FlowDefinition,
    menus: &HashMap<String, Vec<MenuButton>>,
) -> Transition {
    let current = current_flow(stack);
    if current == flow.name {
        return Transition::Unchanged;
    }

    if flow.is_nested {
        let on_menu = menus
            .get(current)
            .map(|menu| menu.iter().any(|b| b.name == flow.name))
            .unwrap_or(false);
        if !on_menu {
            return Transition::Rejected;
        }
        let mut next = stack.to_vec();
        next.push(flow.name.clone());
        Transition::Entered(next)
    } else if current == MAIN_FLOW {
        Transition::Entered(vec![MAIN_FLOW.to_string(), flow.name.clone()])
    } else {
        Transition::Rejected
    }
}

/// Pop one level, never dropping below `"main"`.
pub fn leave_flow(stack: &[String]) -> Vec<String> {
    if stack.len() <= 1 {
        return vec![MAIN_FLOW.to_string()];
    }
    stack[..stack.len() - 1].to_vec()
}

/// The flow currently on top of the stack.
pub fn current_flow(stack: &[String]) -> &str {
    stack.last().map(String::as_str).unwrap_or(MAIN_FLOW)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlowConfig, FlowKind, FlowTree};
    use serde_json::json;

    fn tree() -> FlowTree {
        let flows: Vec<FlowConfig> = serde_json::from_value(json!([
            {
                "name": "Services",
                "type": "extended_static",
                "content": "pick",
                "flows": [
                    {"name": "Search", "type": "managed", "content": "q",
                     "search_type": "products", "use_pagination": true},
                    {"name": "About", "type": "static", "content": "a"}
                ]
            },
            {"name": "Contacts", "type": "extended_static", "content": "c"}
        ]))
        .unwrap();
        FlowTree::build(&flows).unwrap()
    }

    fn stack(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_root_entry_from_main_resets_history() {
        let tree = tree();
        let flow = &tree.flows["Services"];
        assert_eq!(flow.kind, FlowKind::ExtendedStatic);

        let result = enter_flow(&stack(&["main"]), flow, &tree.menus);
        assert_eq!(result, Transition::Entered(stack(&["main", "Services"])));
    }

    #[test]
    fn test_root_entry_rejected_when_not_at_main() {
        let tree = tree();
        let flow = &tree.flows["Contacts"];

        let result = enter_flow(&stack(&["main", "Services"]), flow, &tree.menus);
        assert_eq!(result, Transition::Rejected);
    }

    #[test]
    fn test_nested_entry_requires_button_on_current_menu() {
        let tree = tree();
        let search = &tree.flows["Search"];

        let from_parent = enter_flow(&stack(&["main", "Services"]), search, &tree.menus);
        assert_eq!(
            from_parent,
            Transition::Entered(stack(&["main", "Services", "Search"]))
        );

        let from_main = enter_flow(&stack(&["main"]), search, &tree.menus);
        assert_eq!(from_main, Transition::Rejected);
    }

    #[test]
    fn test_self_reentry_is_unchanged() {
        let tree = tree();
        let search = &tree.flows["Search"];

        let result = enter_flow(&stack(&["main", "Services", "Search"]), search, &tree.menus);
        assert_eq!(result, Transition::Unchanged);
    }

    #[test]
    fn test_leave_flow_pops_one_level() {
        assert_eq!(
            leave_flow(&stack(&["main", "Services", "Search"])),
            stack(&["main", "Services"])
        );
    }

    #[test]
    fn test_leave_flow_never_drops_below_main() {
        assert_eq!(leave_flow(&stack(&["main"])), stack(&["main"]));
        assert_eq!(leave_flow(&stack(&[])), stack(&["main"]));
    }
}
