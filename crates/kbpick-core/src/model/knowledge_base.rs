//! Knowledge-base request and response payloads.

use serde::{Deserialize, Serialize};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_CHUNK_SIZE: u32 = 1500;
pub const DEFAULT_CHUNK_OVERLAP: u32 = 500;
pub const DEFAULT_CHUNKER: &str = "sentence";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingParams {
    pub embedding_model: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerParams {
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub chunker: String,
}

/// Indexing configuration sent with every knowledge-base creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexingParams {
    pub ocr: bool,
    pub unstructured: bool,
    pub embedding_params: EmbeddingParams,
    pub chunker_params: ChunkerParams,
}

impl Default for IndexingParams {
    fn default() -> Self {
        Self {
            ocr: false,
            unstructured: true,
            embedding_params: EmbeddingParams {
                embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
                api_key: None,
            },
            chunker_params: ChunkerParams {
                chunk_size: DEFAULT_CHUNK_SIZE,
                chunk_overlap: DEFAULT_CHUNK_OVERLAP,
                chunker: DEFAULT_CHUNKER.to_string(),
            },
        }
    }
}

/// Caller-supplied part of a knowledge-base creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateKnowledgeBase {
    pub connection_id: String,
    pub connection_source_ids: Vec<String>,
    pub name: String,
    pub description: String,
}

/// Full `POST /knowledge_bases` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeBaseRequest {
    #[serde(flatten)]
    pub source: CreateKnowledgeBase,
    pub indexing_params: IndexingParams,
    pub org_level_role: Option<String>,
    pub cron_job_id: Option<String>,
}

impl From<CreateKnowledgeBase> for KnowledgeBaseRequest {
    fn from(source: CreateKnowledgeBase) -> Self {
        Self {
            source,
            indexing_params: IndexingParams::default(),
            org_level_role: None,
            cron_job_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub knowledge_base_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_carries_fixed_indexing_config() {
        let request = KnowledgeBaseRequest::from(CreateKnowledgeBase {
            connection_id: "c1".to_string(),
            connection_source_ids: vec!["r1".to_string(), "r2".to_string()],
            name: "KB".to_string(),
            description: "desc".to_string(),
        });
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["connection_id"], "c1");
        assert_eq!(body["connection_source_ids"][1], "r2");
        assert_eq!(body["indexing_params"]["ocr"], false);
        assert_eq!(body["indexing_params"]["unstructured"], true);
        assert_eq!(
            body["indexing_params"]["embedding_params"]["embedding_model"],
            "text-embedding-ada-002"
        );
        assert!(body["indexing_params"]["embedding_params"]["api_key"].is_null());
        assert_eq!(body["indexing_params"]["chunker_params"]["chunk_size"], 1500);
        assert_eq!(body["indexing_params"]["chunker_params"]["chunk_overlap"], 500);
        assert_eq!(body["indexing_params"]["chunker_params"]["chunker"], "sentence");
        assert!(body["org_level_role"].is_null());
        assert!(body["cron_job_id"].is_null());
    }
}
