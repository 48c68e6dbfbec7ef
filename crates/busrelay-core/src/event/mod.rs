//! Event payload shaping.
//!
//! - `envelope`: inbound `{ detail, detailType, source }` body with fallbacks,
//!   and the single bus entry built from it.

pub mod envelope;

pub use envelope::{BusEntry, EventEnvelope, DEFAULT_DETAIL_TYPE, DEFAULT_SOURCE};
