use serde::{Deserialize, Serialize};

/// A configured link to an external storage provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub connection_id: String,
    pub name: String,
    pub connection_provider: String,
    /// Provider credentials. Opaque to kbpick and never logged.
    #[serde(default, skip_serializing)]
    pub connection_provider_data: serde_json::Value,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
