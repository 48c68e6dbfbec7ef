use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_eventbridge::error::DisplayErrorContext;
use aws_sdk_eventbridge::types::PutEventsRequestEntry;

use busrelay_core::error::{RelayError, Result};
use busrelay_core::event::BusEntry;

use crate::bus::{BusReceipt, EventBus};
use crate::config::BusConfig;

/// `PutEvents` against a managed (or emulated) EventBridge endpoint.
pub struct EventBridgeBus {
    client: aws_sdk_eventbridge::Client,
}

impl EventBridgeBus {
    /// Credentials come from the default AWS provider chain.
    pub async fn from_config(cfg: &BusConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(cfg.region.clone()));
        if let Some(endpoint) = &cfg.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;
        tracing::debug!(region = %cfg.region, endpoint = ?cfg.endpoint, "eventbridge client ready");

        Self {
            client: aws_sdk_eventbridge::Client::new(&shared),
        }
    }
}

#[async_trait]
impl EventBus for EventBridgeBus {
    async fn put_event(&self, entry: BusEntry) -> Result<BusReceipt> {
        let request_entry = PutEventsRequestEntry::builder()
            .event_bus_name(entry.event_bus_name)
            .source(entry.source)
            .detail_type(entry.detail_type)
            .set_detail(entry.detail)
            .build();

        let out = self
            .client
            .put_events()
            .entries(request_entry)
            .send()
            .await
            .map_err(|e| RelayError::Bus(DisplayErrorContext(&e).to_string()))?;

        Ok(BusReceipt {
            event_id: out
                .entries()
                .first()
                .and_then(|e| e.event_id())
                .map(str::to_string),
            failed_entry_count: out.failed_entry_count(),
        })
    }
}
