//! `extract-agent` — typed driver for the external text-understanding
//! service that proposes action items from free-text meeting notes.
//!
//! The service exposes a single endpoint:
//!
//! ```text
//! POST {base_url}/v1/extract   { "text": "..." }
//!   -> 200 { "action_items": [...], "confidence": "high|medium|low" }
//!   -> 429 when throttling
//! ```
//!
//! This crate keeps the wire contract fully typed (`types.rs`, no
//! `serde_json::Value` escape hatches) and folds transport outcomes into a
//! small error taxonomy the caller can map directly onto its own: rate
//! limiting, timeout, service failure, and malformed payloads are all
//! distinct. An empty `action_items` list is a valid success, not an error.

pub mod client;
pub mod error;
pub mod types;

pub use client::ExtractClient;
pub use error::ExtractError;
pub use types::{Candidate, Confidence, ExtractRequest, ExtractResponse, Priority};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ExtractError>;
