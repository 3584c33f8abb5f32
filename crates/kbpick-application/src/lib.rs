//! Application layer for kbpick.
//!
//! Use cases coordinating the session, the remote service and the picker
//! state. Nothing here knows about HTTP or the terminal.

pub mod indexing_usecase;
pub mod picker_controller;
pub mod resource_queries;
pub mod session_usecase;

#[cfg(test)]
pub(crate) mod testing;

pub use indexing_usecase::IndexingUseCase;
pub use picker_controller::PickerController;
pub use resource_queries::ResourceQueries;
pub use session_usecase::SessionUseCase;
