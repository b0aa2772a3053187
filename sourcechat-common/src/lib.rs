//! SourceChat Common Types
//!
//! Wire types shared between the gateway client and anything else that talks
//! to the SourceChat backend.

pub mod auth;
pub mod chat;
pub mod family;
pub mod source;
pub mod timestamp;

pub use auth::{LoginRequest, RegisterRequest, TokenResponse, UserInfo};
pub use chat::{ChatAnswer, ChatRequest, HistoryEntry};
pub use family::{ResourceFamily, UnknownFamily};
pub use source::{DocumentInfo, ProcessRequest, SourceInfo};
