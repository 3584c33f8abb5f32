pub mod api;
pub mod config;
pub mod error;
pub mod indexing;
pub mod listing;
pub mod model;
pub mod picker;
pub mod query;
pub mod session;

// Re-export common error type
pub use error::KbPickError;
