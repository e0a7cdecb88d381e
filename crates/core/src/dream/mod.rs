use serde::{Deserialize, Serialize};

/// A single journal entry as served by the dream API.
///
/// Records are created and owned entirely by the remote storage service;
/// the engine only ever reads a snapshot of them. Detail responses carry a
/// number of server-side fields beyond these (interpretations, analysis
/// text and so on) which are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DreamRecord {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub dream_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
