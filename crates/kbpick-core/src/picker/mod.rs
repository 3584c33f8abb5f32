//! Navigation & selection state for the file picker.

pub mod model;
pub mod store;

pub use model::{FolderEntry, ROOT_PATH};
pub use store::PickerStore;
