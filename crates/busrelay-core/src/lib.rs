//! busrelay core: transport-agnostic event shaping, metric encoding, and errors.
//!
//! This crate defines the payload contracts and error surface shared by the
//! gateway and its tests. It carries no HTTP or runtime dependencies so the
//! shaping rules can be exercised without a server.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `RelayError`/`Result` so a bad request
//! body never takes the relay down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod event;
pub mod metric;

/// Shared result type.
pub use error::{RelayError, Result};
