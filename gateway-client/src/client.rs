//! HTTP gateway client for the SourceChat backend.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use sourcechat_common::{
    ChatAnswer, ChatRequest, DocumentInfo, HistoryEntry, LoginRequest, ProcessRequest,
    RegisterRequest, ResourceFamily, SourceInfo, TokenResponse, UserInfo,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::outcome::{classify, Outcome};
use crate::request::{resolve_headers, Body, FilePayload, RequestDescriptor};
use crate::session::{FileSessionStore, Session, SessionEvent, SessionState};

/// What to ingest for a family.
#[derive(Debug, Clone)]
pub enum Ingest {
    /// A file upload (documents)
    File(FilePayload),
    /// A URL to fetch and index (videos, webpages)
    Url(String),
}

/// What the backend returned after ingestion.
#[derive(Debug, Clone)]
pub enum Ingested {
    Document(DocumentInfo),
    Source(SourceInfo),
}

/// A listing for one family.
#[derive(Debug, Clone)]
pub enum Resources {
    Documents(Vec<DocumentInfo>),
    Sources(Vec<SourceInfo>),
}

impl Resources {
    pub fn len(&self) -> usize {
        match self {
            Resources::Documents(docs) => docs.len(),
            Resources::Sources(sources) => sources.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Gateway client.
///
/// The single choke point for backend calls: injects the bearer token,
/// picks the body encoding, classifies every response and ends the session
/// when the backend rejects the credential.
pub struct GatewayClient {
    http_client: Client,
    base_url: String,
    session: Arc<Session>,
}

impl GatewayClient {
    pub fn new(base_url: &str, session: Arc<Session>) -> Self {
        Self::with_http_client(Client::new(), base_url, session)
    }

    pub fn with_http_client(http_client: Client, base_url: &str, session: Arc<Session>) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Build a client with a file-backed session restored from disk.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let dir = config.session.resolve_dir().ok_or_else(|| {
            Error::Session("cannot determine a directory for the session token".to_string())
        })?;
        let session = Session::restore(Arc::new(FileSessionStore::new(dir))).await?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()?;

        Ok(Self::with_http_client(
            http_client,
            &config.api.base_url,
            Arc::new(session),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Issue one call and classify its outcome.
    ///
    /// Never panics and never leaves the caller without an outcome. On
    /// `AuthExpired` the session has already been cleared and
    /// [`SessionEvent::Expired`] published when this returns, unless the
    /// rejected token had been replaced in the meantime. A call made with no
    /// session settles as `AuthExpired` without touching the network or
    /// publishing anything.
    pub async fn request(&self, descriptor: RequestDescriptor) -> Outcome {
        if let Err(e) = descriptor.validate() {
            return Outcome::Failure(e);
        }

        let token = self.session.token().await;
        if descriptor.authenticated && token.is_none() {
            tracing::debug!(path = %descriptor.path, "No session, not sending request");
            return Outcome::AuthExpired;
        }

        let outcome = match self.send(descriptor, token.as_deref()).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Failure(e),
        };
        self.react(outcome, token.as_deref()).await
    }

    async fn send(&self, descriptor: RequestDescriptor, token: Option<&str>) -> Result<Outcome> {
        let headers = resolve_headers(token, descriptor.headers.as_ref(), descriptor.body.as_ref())?;
        let url = format!("{}{}", self.base_url, descriptor.path);

        tracing::debug!(
            method = %descriptor.method,
            path = %descriptor.path,
            "Sending gateway request"
        );

        let mut builder = self
            .http_client
            .request(descriptor.method, &url)
            .headers(headers);

        builder = match descriptor.body {
            Some(Body::Json(value)) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| Error::InvalidRequest(format!("cannot serialize body: {}", e)))?;
                builder.body(bytes)
            }
            Some(Body::Binary(payload)) => builder.multipart(multipart_form(payload)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        // The status alone decides a rejected credential.
        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(path = %descriptor.path, "Gateway rejected credential");
            return Ok(Outcome::AuthExpired);
        }
        let body = response.bytes().await?;

        tracing::debug!(status = %status.as_u16(), bytes = body.len(), "Gateway response");

        Ok(classify(status, &body))
    }

    /// End the session if the backend rejected the token `sent` with. A
    /// session established while the call was in flight is kept.
    async fn react(&self, outcome: Outcome, sent: Option<&str>) -> Outcome {
        if outcome.is_auth_expired() {
            match self.session.expire(sent).await {
                Ok(true) => {
                    tracing::warn!("Session expired or rejected by backend, credentials cleared")
                }
                Ok(false) => {}
                Err(e) => tracing::error!("Failed to remove persisted session: {}", e),
            }
        }
        outcome
    }

    /// Issue a call and decode a successful payload.
    async fn call<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> Result<T> {
        let value = self.request(descriptor).await.into_result()?;
        serde_json::from_value(value)
            .map_err(|e| Error::Transport(format!("unexpected response shape: {}", e)))
    }

    // --- Authentication ---

    /// Log in and store the issued token as the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let token: TokenResponse = self
            .call(RequestDescriptor::post("/auth/login").json(&body)?.public())
            .await?;

        self.session.establish(&token.access_token).await?;
        tracing::info!("Logged in as {}", email);
        Ok(token)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, email: &str, password: &str, full_name: &str) -> Result<UserInfo> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            full_name: full_name.to_string(),
        };
        self.call(RequestDescriptor::post("/auth/register").json(&body)?.public())
            .await
    }

    /// Create an account, then log straight into it.
    pub async fn register_and_login(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<TokenResponse> {
        self.register(email, password, full_name).await?;
        self.login(email, password).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.session.clear(SessionEvent::LoggedOut).await?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.state().await
    }

    // --- Resources ---

    /// Ingest a source. Documents take a file, videos and webpages a URL.
    pub async fn upload_resource(&self, family: ResourceFamily, payload: Ingest) -> Result<Ingested> {
        match (family, payload) {
            (ResourceFamily::Document, Ingest::File(file)) => {
                self.upload_document(file).await.map(Ingested::Document)
            }
            (ResourceFamily::Video | ResourceFamily::Webpage, Ingest::Url(url)) => {
                self.process_url(family, &url).await.map(Ingested::Source)
            }
            (family, Ingest::File(_)) => Err(Error::InvalidRequest(format!(
                "{} sources are ingested from a URL, not a file",
                family
            ))),
            (family, Ingest::Url(_)) => Err(Error::InvalidRequest(format!(
                "{} sources are ingested from a file, not a URL",
                family
            ))),
        }
    }

    /// Upload a PDF as multipart. Indexing continues on the backend after
    /// this returns; poll the listing for `status`.
    pub async fn upload_document(&self, file: FilePayload) -> Result<DocumentInfo> {
        let descriptor = RequestDescriptor::post("/documents/upload").binary(file);
        let doc: DocumentInfo = self.call(descriptor).await?;
        tracing::info!("Uploaded document {} ({})", doc.id, doc.status);
        Ok(doc)
    }

    pub async fn process_youtube(&self, url: &str) -> Result<SourceInfo> {
        self.process_url(ResourceFamily::Video, url).await
    }

    pub async fn process_webpage(&self, url: &str) -> Result<SourceInfo> {
        self.process_url(ResourceFamily::Webpage, url).await
    }

    async fn process_url(&self, family: ResourceFamily, url: &str) -> Result<SourceInfo> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidRequest("URL must not be empty".to_string()));
        }
        let body = ProcessRequest::new(url, family);
        let descriptor =
            RequestDescriptor::post(format!("/{}/process", family.namespace())).json(&body)?;
        self.call(descriptor).await
    }

    pub async fn list_resources(&self, family: ResourceFamily) -> Result<Resources> {
        let descriptor = RequestDescriptor::get(format!("/{}/", family.namespace()));
        if family.ingests_files() {
            self.call(descriptor).await.map(Resources::Documents)
        } else {
            self.call(descriptor).await.map(Resources::Sources)
        }
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentInfo>> {
        self.call(RequestDescriptor::get("/documents/")).await
    }

    /// Delete a source. Only documents are guaranteed to support this; other
    /// families surface the backend's rejection as a request error.
    pub async fn delete_resource(&self, family: ResourceFamily, id: i64) -> Result<()> {
        let descriptor = RequestDescriptor::delete(format!("/{}/{}", family.namespace(), id));
        self.request(descriptor).await.into_result()?;
        tracing::info!("Deleted {} {}", family, id);
        Ok(())
    }

    // --- Chat ---

    /// Ask a question about one source.
    ///
    /// `source_type` accepts the family synonyms (`pdf`, `web`) and is sent
    /// to the backend as given. An unknown tag fails before any network call.
    pub async fn chat(&self, source_id: i64, source_type: &str, question: &str) -> Result<ChatAnswer> {
        let family: ResourceFamily = source_type.parse()?;
        if question.trim().is_empty() {
            return Err(Error::InvalidRequest("question must not be empty".to_string()));
        }

        let body = ChatRequest {
            question: question.to_string(),
            source_id,
            source_type: source_type.to_string(),
        };
        let descriptor = RequestDescriptor::post(source_path(family, source_id, "chat")).json(&body)?;
        self.call(descriptor).await
    }

    /// Previous questions and answers for one source, oldest first.
    pub async fn get_history(&self, source_id: i64, source_type: &str) -> Result<Vec<HistoryEntry>> {
        let family: ResourceFamily = source_type.parse()?;
        self.call(RequestDescriptor::get(source_path(family, source_id, "history")))
            .await
    }
}

fn source_path(family: ResourceFamily, source_id: i64, action: &str) -> String {
    format!("/{}/{}/{}", family.namespace(), source_id, action)
}

fn multipart_form(payload: FilePayload) -> Result<Form> {
    let mut part = Part::bytes(payload.bytes).file_name(payload.file_name);
    if let Some(mime) = payload.mime {
        part = part
            .mime_str(&mime)
            .map_err(|e| Error::InvalidRequest(format!("invalid MIME type '{}': {}", mime, e)))?;
    }
    Ok(Form::new().part(payload.field, part))
}
