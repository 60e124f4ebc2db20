//! Pure flow logic: stack navigation and result pagination.

pub mod navigation;
pub mod pagination;

pub use navigation::{current_flow, enter_flow, leave_flow, Transition};
pub use pagination::{advance, pagination_keyboard, render_card, PageMove, INACTIVE_ANSWER};
