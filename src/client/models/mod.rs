pub mod app_state;
pub mod commands;
pub mod composer;
pub mod conversation_view;
pub mod listing;
pub mod typing;
