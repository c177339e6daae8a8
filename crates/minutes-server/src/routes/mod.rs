pub mod action_items;
pub mod notes;
