//! Event bus seam.
//!
//! Handlers only see [`EventBus`]; the production implementation submits to
//! EventBridge, tests plug in stubs.

pub mod eventbridge;

use async_trait::async_trait;

use busrelay_core::error::Result;
use busrelay_core::event::BusEntry;

pub use eventbridge::EventBridgeBus;

/// What the bus reported for a resolved submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusReceipt {
    pub event_id: Option<String>,
    /// Entries the bus accepted the call for but could not store.
    pub failed_entry_count: i32,
}

#[async_trait]
pub trait EventBus: Send + Sync {
    /// Submit a single-entry batch. One attempt, no retry.
    async fn put_event(&self, entry: BusEntry) -> Result<BusReceipt>;
}
