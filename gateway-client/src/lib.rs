//! SourceChat Gateway Client
//!
//! Session-authenticated client for the SourceChat backend: bearer-token
//! injection, body encoding, uniform response classification and session
//! expiry, plus typed operations for documents, videos and webpages.

pub mod client;
pub mod config;
pub mod error;
pub mod outcome;
pub mod request;
pub mod session;

pub use client::{GatewayClient, Ingest, Ingested, Resources};
pub use config::Config;
pub use error::{Error, Result};
pub use outcome::{classify, Outcome};
pub use request::{Body, FilePayload, RequestDescriptor};
pub use session::{
    FileSessionStore, MemorySessionStore, Session, SessionEvent, SessionState, SessionStore,
};
pub use sourcechat_common::ResourceFamily;
