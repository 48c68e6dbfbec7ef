//! Top-level facade crate for busrelay.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use busrelay_core::*;
}

pub mod gateway {
    pub use busrelay_gateway::*;
}
