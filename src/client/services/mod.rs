pub mod api;
pub mod auth_service;
pub mod chat_service;
pub mod history_loader;
pub mod message_parser;
pub mod websocket_client;
