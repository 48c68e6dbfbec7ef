//! HTTP transport glue around the handlers.
//!
//! - `hooks`: on-arrival / on-completion interception for every request

pub mod hooks;
