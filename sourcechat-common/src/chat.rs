//! Question-answering payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A question about one ingested source.
///
/// `source_type` carries the family tag exactly as the caller supplied it
/// (synonyms such as `pdf` are not rewritten).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub source_id: i64,
    pub source_type: String,
}

/// The backend's answer to a single question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub question: String,
    pub answer: String,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// One stored question/answer exchange, oldest first in history listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub source_id: i64,
    pub source_type: String,
    pub question: String,
    pub answer: String,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_body_shape() {
        let req = ChatRequest {
            question: "What is this?".to_string(),
            source_id: 42,
            source_type: "pdf".to_string(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"question": "What is this?", "source_id": 42, "source_type": "pdf"})
        );
    }

    #[test]
    fn test_history_entries_parse() {
        let json = r#"[
            {"id": 1, "source_id": 5, "source_type": "webpage", "question": "q1", "answer": "a1", "timestamp": "2024-01-01T00:00:00"},
            {"id": 2, "source_id": 5, "source_type": "webpage", "question": "q2", "answer": "a2", "timestamp": "2024-01-01T00:01:00.25"}
        ]"#;
        let history: Vec<HistoryEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].timestamp < history[1].timestamp);
    }

    #[test]
    fn test_chat_answer_rejects_bad_timestamp() {
        let json = r#"{"question": "q", "answer": "a", "timestamp": "soon"}"#;
        assert!(serde_json::from_str::<ChatAnswer>(json).is_err());
    }
}
