//! Event handlers.
//!
//! - `events`: `POST /receive-event` (echo) and `POST /send-event` (forward to bus)

pub mod events;

pub use events::{receive_event, send_event, SEND_FAILED_MESSAGE};
