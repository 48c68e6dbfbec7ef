//! Request-scoped context types shared across layers.
//!
//! Hooks stamp these onto the request so handlers and the observability
//! client can read them without global state.

pub mod request;

pub use request::{RequestDescriptor, RequestTiming};
