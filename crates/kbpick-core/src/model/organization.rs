use serde::{Deserialize, Serialize};

/// The caller's current organization (`GET /organizations/me/current`).
///
/// Only `org_id` matters to kbpick; the remaining fields are kept optional so
/// plan changes on the service side do not break deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub org_id: String,
    #[serde(default)]
    pub org_name: Option<String>,
    #[serde(default)]
    pub org_plan: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub knowledge_base_max_files_to_sync: Option<u64>,
}
