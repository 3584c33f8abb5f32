//! Resource nodes exposed by a connection or a knowledge base.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InodeType {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InodePath {
    pub path: String,
}

/// Indexing status reported by the knowledge-base resource listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceStatus {
    Indexed,
    Pending,
    PendingDelete,
    Error,
    /// Anything the service reports that kbpick does not know about.
    Other(String),
}

impl ResourceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Indexed => "indexed",
            Self::Pending => "pending",
            Self::PendingDelete => "pending_delete",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }

    /// Whether a resource reported in this state is part of the index.
    ///
    /// Every reported state counts except a pending delete.
    pub fn counts_as_indexed(&self) -> bool {
        !self.is_pending_delete()
    }

    pub fn is_pending_delete(&self) -> bool {
        matches!(self, Self::PendingDelete)
    }
}

impl From<String> for ResourceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "indexed" => Self::Indexed,
            "pending" => Self::Pending,
            "pending_delete" => Self::PendingDelete,
            "error" => Self::Error,
            _ => Self::Other(value),
        }
    }
}

impl From<ResourceStatus> for String {
    fn from(value: ResourceStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One file or directory node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub resource_id: String,
    pub inode_type: InodeType,
    pub inode_path: InodePath,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub indexed_at: Option<String>,
    #[serde(default)]
    pub knowledge_base_id: Option<String>,
    #[serde(default)]
    pub dataloader_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub content_mime: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
}

impl Resource {
    /// Last path segment, or the whole path when that segment is empty.
    pub fn name(&self) -> &str {
        let path = self.inode_path.path.as_str();
        match path.rsplit('/').next() {
            Some(leaf) if !leaf.is_empty() => leaf,
            _ => path,
        }
    }

    pub fn path(&self) -> &str {
        &self.inode_path.path
    }

    pub fn is_directory(&self) -> bool {
        self.inode_type == InodeType::Directory
    }

    /// Parsed modification time; `None` when absent or not RFC 3339.
    pub fn modified_time(&self) -> Option<DateTime<Utc>> {
        self.modified_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// External link for opening a file, when the provider supplied one.
    pub fn web_url(&self) -> Option<&str> {
        self.dataloader_metadata
            .as_ref()
            .and_then(|m| m.get("web_url"))
            .and_then(|v| v.as_str())
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub current_cursor: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            next_cursor: None,
            current_cursor: None,
        }
    }
}
