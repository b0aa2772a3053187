//! Ingested source payloads: uploaded documents, videos and webpages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::family::ResourceFamily;

/// An uploaded document and its indexing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: i64,
    pub file_type: String,
    #[serde(default)]
    pub vector_store_path: Option<String>,
    /// Indexing status reported by the backend (e.g. "processing", "completed", "failed")
    pub status: String,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub upload_date: DateTime<Utc>,
}

impl DocumentInfo {
    /// Whether the document has been indexed and can be chatted with.
    pub fn is_ready(&self) -> bool {
        self.status == "completed"
    }
}

/// A URL-based source (video or webpage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: i64,
    pub source_type: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub processed_date: DateTime<Utc>,
}

/// Request body for processing a URL-based source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub url: String,
    pub source_type: String,
}

impl ProcessRequest {
    pub fn new(url: impl Into<String>, family: ResourceFamily) -> Self {
        Self {
            url: url.into(),
            source_type: family.as_str().to_string(),
        }
    }
}
