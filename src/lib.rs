pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod data_models;
pub mod error;
pub mod notify;
pub mod render;
pub mod search_client;
