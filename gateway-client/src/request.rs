//! Request descriptors and header resolution.

use std::path::Path;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;

use crate::error::{Error, Result};

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A file to send as a multipart upload.
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// Multipart field name
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// MIME type of the file itself (not of the request)
    pub mime: Option<String>,
}

impl FilePayload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: "file".to_string(),
            file_name: file_name.into(),
            bytes,
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Read a file from disk. PDFs get their MIME type set.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::InvalidRequest(format!("cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidRequest(format!("no file name in {}", path.display())))?
            .to_string();

        let payload = Self::new(file_name, bytes);
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        Ok(if is_pdf {
            payload.with_mime("application/pdf")
        } else {
            payload
        })
    }
}

/// Request body. The variant decides the encoding strategy.
#[derive(Debug, Clone)]
pub enum Body {
    /// Structured payload, sent as JSON with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Binary payload, sent as multipart. The transport writes the
    /// `Content-Type` (with boundary) itself.
    Binary(FilePayload),
}

impl Body {
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(|e| Error::InvalidRequest(format!("cannot serialize body: {}", e)))
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Body::Binary(_))
    }
}

/// Everything needed to issue one backend call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Path relative to the base URL, starting with `/`
    pub path: String,
    pub method: Method,
    pub body: Option<Body>,
    /// Replace the default headers entirely when set.
    pub headers: Option<HeaderMap>,
    /// Whether the endpoint needs a session. Unauthenticated calls (login,
    /// registration) may go out without a token.
    pub authenticated: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            headers: None,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn json<T: Serialize>(self, value: &T) -> Result<Self> {
        Ok(self.body(Body::json(value)?))
    }

    pub fn binary(self, payload: FilePayload) -> Self {
        self.body(Body::Binary(payload))
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Mark the endpoint as reachable without a session.
    pub fn public(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.is_empty() || !self.path.starts_with('/') {
            return Err(Error::InvalidRequest(format!(
                "path must be non-empty and start with '/': {:?}",
                self.path
            )));
        }
        Ok(())
    }
}

/// Compute the outgoing headers.
///
/// Defaults are `Authorization: Bearer <token>` (only when a token exists)
/// and `Content-Type: application/json`. Overrides replace the defaults
/// wholesale. A binary body never carries a `Content-Type` from here,
/// overrides included.
pub fn resolve_headers(
    token: Option<&str>,
    overrides: Option<&HeaderMap>,
    body: Option<&Body>,
) -> Result<HeaderMap> {
    let mut headers = match overrides {
        Some(overrides) => overrides.clone(),
        None => {
            let mut defaults = HeaderMap::new();
            if let Some(token) = token {
                let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                    Error::Session("stored token is not a valid header value".to_string())
                })?;
                defaults.insert(AUTHORIZATION, value);
            }
            defaults.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
            defaults
        }
    };

    if body.is_some_and(Body::is_binary) {
        headers.remove(CONTENT_TYPE);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pdf() -> Body {
        Body::Binary(FilePayload::new("a.pdf", b"%PDF-1.4".to_vec()))
    }

    #[test]
    fn test_default_headers_with_token() {
        let body = Body::Json(json!({"a": 1}));
        let headers = resolve_headers(Some("T1"), None, Some(&body)).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer T1");
        assert_eq!(headers[CONTENT_TYPE], JSON_MEDIA_TYPE);
    }

    #[test]
    fn test_no_token_omits_authorization() {
        let headers = resolve_headers(None, None, None).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers[CONTENT_TYPE], JSON_MEDIA_TYPE);
    }

    #[test]
    fn test_binary_body_strips_content_type() {
        let headers = resolve_headers(Some("T1"), None, Some(&pdf())).unwrap();
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert_eq!(headers[AUTHORIZATION], "Bearer T1");
    }

    #[test]
    fn test_binary_body_strips_content_type_from_overrides() {
        let mut overrides = HeaderMap::new();
        overrides.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
        overrides.insert("x-trace", HeaderValue::from_static("1"));

        let headers = resolve_headers(Some("T1"), Some(&overrides), Some(&pdf())).unwrap();
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert_eq!(headers["x-trace"], "1");
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let mut overrides = HeaderMap::new();
        overrides.insert("x-api-key", HeaderValue::from_static("k"));

        let headers = resolve_headers(Some("T1"), Some(&overrides), None).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_invalid_token_is_session_error() {
        let err = resolve_headers(Some("bad\ntoken"), None, None).unwrap_err();
        assert!(matches!(err, Error::Session(_)));
    }

    #[test]
    fn test_validate_path() {
        assert!(RequestDescriptor::get("/documents/").validate().is_ok());
        assert!(RequestDescriptor::get("").validate().is_err());
        assert!(RequestDescriptor::get("documents").validate().is_err());
    }

    #[test]
    fn test_builders() {
        let d = RequestDescriptor::post("/auth/login")
            .json(&json!({"email": "a@x.com"}))
            .unwrap()
            .public();
        assert_eq!(d.method, Method::POST);
        assert!(!d.authenticated);
        assert!(matches!(d.body, Some(Body::Json(_))));

        let d = RequestDescriptor::delete("/documents/1");
        assert!(d.authenticated);
        assert!(d.body.is_none());
    }

    #[tokio::test]
    async fn test_file_payload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Report.PDF");
        std::fs::write(&path, b"%PDF").unwrap();

        let payload = FilePayload::from_path(&path).await.unwrap();
        assert_eq!(payload.file_name, "Report.PDF");
        assert_eq!(payload.field, "file");
        assert_eq!(payload.mime.as_deref(), Some("application/pdf"));
        assert_eq!(payload.bytes, b"%PDF");

        let missing = FilePayload::from_path(dir.path().join("nope.pdf")).await;
        assert!(matches!(missing, Err(Error::InvalidRequest(_))));
    }
}
