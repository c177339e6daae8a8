//! Client-side board logic for `minutes`.
//!
//! The server owns the board; this crate owns the mirror the UI renders.
//! Two components sit between a gesture and the wire:
//!
//! - [`controller::BoardController`] — applies a predicted post-move state
//!   immediately, persists through [`api::BoardApi`], rolls back on failure,
//!   and always replaces its mirror with the authoritative board on settle.
//!   Mutations are serialized: one move in flight per board, the rest queued.
//! - [`review::ExtractionFlow`] — the state machine for turning a note into
//!   reviewed extraction candidates and saving the accepted subset.

pub mod api;
pub mod controller;
pub mod error;
pub mod review;

pub use api::{BoardApi, HttpBoardApi};
pub use controller::{BoardController, MoveOutcome, MoveRequest};
pub use error::ClientError;
pub use review::{ExtractionFlow, FailureKind, ReviewState};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ClientError>;
