//! Metric emissions and their wire encoding.
//!
//! - `dogstatsd`: `<prefix><name>:<value>|<type>|#tags` line codec

pub mod dogstatsd;

pub use dogstatsd::{decode_line, encode_line, Metric, MetricKind};
