//! Resource families served by the backend.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Content categories the backend can ingest and answer questions about.
///
/// Each family owns a path namespace on the backend. The families share a
/// sub-protocol (list, ingest, chat, history) but ingestion differs: documents
/// are uploaded as files, videos and webpages are processed from a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceFamily {
    /// Uploaded PDF documents
    Document,
    /// YouTube videos, indexed from their transcript
    #[serde(rename = "youtube")]
    Video,
    /// Scraped webpages
    Webpage,
}

impl ResourceFamily {
    /// All family variants for iteration.
    pub const ALL: [ResourceFamily; 3] = [
        ResourceFamily::Document,
        ResourceFamily::Video,
        ResourceFamily::Webpage,
    ];

    /// Path namespace under the API base URL, without slashes.
    pub fn namespace(&self) -> &'static str {
        match self {
            ResourceFamily::Document => "documents",
            ResourceFamily::Video => "youtube",
            ResourceFamily::Webpage => "webpage",
        }
    }

    /// Canonical `source_type` tag the backend stores for this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceFamily::Document => "document",
            ResourceFamily::Video => "youtube",
            ResourceFamily::Webpage => "webpage",
        }
    }

    /// Whether this family is ingested by uploading a file rather than a URL.
    pub fn ingests_files(&self) -> bool {
        matches!(self, ResourceFamily::Document)
    }
}

impl std::fmt::Display for ResourceFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A family tag that does not map to any namespace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unrecognized source type: '{0}'")]
pub struct UnknownFamily(pub String);

impl FromStr for ResourceFamily {
    type Err = UnknownFamily;

    /// Parses a family tag, accepting the synonyms the dashboard uses
    /// (`pdf` for documents, `web` for webpages). Matching is exact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" | "pdf" => Ok(ResourceFamily::Document),
            "youtube" => Ok(ResourceFamily::Video),
            "webpage" | "web" => Ok(ResourceFamily::Webpage),
            other => Err(UnknownFamily(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonyms_share_namespace() {
        let doc: ResourceFamily = "document".parse().unwrap();
        let pdf: ResourceFamily = "pdf".parse().unwrap();
        assert_eq!(doc, pdf);
        assert_eq!(pdf.namespace(), "documents");

        let webpage: ResourceFamily = "webpage".parse().unwrap();
        let web: ResourceFamily = "web".parse().unwrap();
        assert_eq!(webpage, web);
        assert_eq!(web.namespace(), "webpage");

        let video: ResourceFamily = "youtube".parse().unwrap();
        assert_eq!(video, ResourceFamily::Video);
        assert_eq!(video.namespace(), "youtube");
    }

    #[test]
    fn test_unknown_family_rejected() {
        for tag in ["", "video", "PDF", "Document", "audio", " web"] {
            let err = tag.parse::<ResourceFamily>().unwrap_err();
            assert_eq!(err, UnknownFamily(tag.to_string()));
        }
    }

    #[test]
    fn test_canonical_tag_parses_back() {
        for family in ResourceFamily::ALL {
            assert_eq!(family.as_str().parse::<ResourceFamily>(), Ok(family));
        }
    }

    #[test]
    fn test_serde_uses_backend_tags() {
        let json = serde_json::to_string(&ResourceFamily::Video).unwrap();
        assert_eq!(json, r#""youtube""#);
        let parsed: ResourceFamily = serde_json::from_str(r#""document""#).unwrap();
        assert_eq!(parsed, ResourceFamily::Document);
    }

    #[test]
    fn test_only_documents_ingest_files() {
        assert!(ResourceFamily::Document.ingests_files());
        assert!(!ResourceFamily::Video.ingests_files());
        assert!(!ResourceFamily::Webpage.ingests_files());
    }
}
