//! busrelay gateway library entry.
//!
//! This crate wires configuration, the observability client, the event bus
//! client, request hooks, and the event handlers into one HTTP service. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod bus;
pub mod config;
pub mod context;
pub mod error;
pub mod obs;
pub mod ops;
pub mod router;
pub mod server;
pub mod services;
pub mod transport;
