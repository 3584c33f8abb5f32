pub mod auth;
pub mod config;
pub mod indexing;
pub mod listing;
