//! Response classification.
//!
//! [`classify`] is a pure function of status and body. Reacting to an
//! outcome (clearing the session, signalling expiry) is the client's job.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{Error, Result};

/// Message used when a failed response carries no usable `detail`.
pub const GENERIC_FAILURE: &str = "API request failed";

/// Result of one gateway call. Exactly one variant per call.
#[derive(Debug)]
pub enum Outcome {
    Success(Value),
    AuthExpired,
    Failure(Error),
}

impl Outcome {
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Outcome::AuthExpired)
    }

    pub fn into_result(self) -> Result<Value> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::AuthExpired => Err(Error::AuthExpired),
            Outcome::Failure(e) => Err(e),
        }
    }
}

/// Classify a backend response.
pub fn classify(status: StatusCode, body: &[u8]) -> Outcome {
    if status == StatusCode::UNAUTHORIZED {
        return Outcome::AuthExpired;
    }

    if !status.is_success() {
        return Outcome::Failure(Error::Request(failure_message(body)));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        // 204 No Content and friends
        return Outcome::Success(Value::Null);
    }

    match serde_json::from_slice(body) {
        Ok(value) => Outcome::Success(value),
        Err(e) => Outcome::Failure(Error::Transport(format!("malformed response: {}", e))),
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"detail": "..."}` and the validation shape
/// `{"detail": [{"msg": "..."}, ...]}`.
fn failure_message(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return GENERIC_FAILURE.to_string();
    };

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                GENERIC_FAILURE.to_string()
            } else {
                messages.join("; ")
            }
        }
        _ => GENERIC_FAILURE.to_string(),
    }
}
