//! HTTP client for the remote knowledge-base service.

pub mod stack_api_client;

pub use stack_api_client::StackApiClient;
