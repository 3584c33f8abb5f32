pub mod config_service;
pub mod paths;
pub mod session_repository;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::paths::KbPickPaths;
pub use crate::session_repository::FileSessionRepository;
