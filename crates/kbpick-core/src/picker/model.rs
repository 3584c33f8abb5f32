use serde::{Deserialize, Serialize};

/// Path used by list queries when no folder is open.
pub const ROOT_PATH: &str = "/";

/// One breadcrumb entry.
///
/// `path` is the parent's path joined with `name`; entries directly under the
/// root have `path == name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub id: String,
    pub name: String,
    pub path: String,
}

impl FolderEntry {
    pub fn child_of(parent: Option<&FolderEntry>, id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = match parent {
            Some(parent) if !parent.path.is_empty() => format!("{}/{}", parent.path, name),
            _ => name.clone(),
        };
        Self {
            id: id.into(),
            name,
            path,
        }
    }
}
