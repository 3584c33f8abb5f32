//! Remote-service entities as seen by kbpick.
//!
//! All of these are immutable snapshots fetched from the service; kbpick never
//! owns their durable copies.

pub mod connection;
pub mod knowledge_base;
pub mod organization;
pub mod resource;

pub use connection::Connection;
pub use knowledge_base::{
    ChunkerParams, CreateKnowledgeBase, EmbeddingParams, IndexingParams, KnowledgeBase,
    KnowledgeBaseRequest,
};
pub use organization::Organization;
pub use resource::{InodePath, InodeType, Page, Resource, ResourceStatus};
