//! Core domain and board ordering engine for `minutes`.
//!
//! The board is a per-owner set of cards partitioned into three ordered
//! columns (todo / doing / done). Everything that rewrites positions goes
//! through two layers:
//!
//! - [`board`] — a pure, synchronous planner that computes the minimal set
//!   of row rewrites for a move or reorder. No I/O, unit-testable on its own.
//! - [`store`] — a redb-backed store that applies plans inside a single
//!   write transaction, so a renumbering is all-or-nothing relative to any
//!   other request touching the same column.

pub mod board;
pub mod card;
pub mod config;
pub mod error;
pub mod extract;
pub mod store;
pub mod types;

pub use error::{BoardError, Result};
