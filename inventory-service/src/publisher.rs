use anyhow::Result;
use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use shared::{EventEnvelope, ReservationEvent};
use std::time::Duration;
use tracing::debug;

/// Publish-only notification channel. Delivery acknowledgements are not
/// surfaced to callers.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &EventEnvelope<ReservationEvent>) -> Result<()>;
}

pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
}

impl KafkaPublisher {
    pub fn new(producer: FutureProducer, topic: String) -> Self {
        Self { producer, topic }
    }
}

#[async_trait]
impl EventPublisher for KafkaPublisher {
    async fn publish(&self, event: &EventEnvelope<ReservationEvent>) -> Result<()> {
        let json = serde_json::to_string(event)?;
        let record = FutureRecord::to(&self.topic)
            .payload(&json)
            .key(event.partition_key());

        self.producer.send(record, Duration::from_secs(5)).await
            .map_err(|(e, _)| anyhow::anyhow!("Failed to publish event: {}", e))?;

        Ok(())
    }
}

/// Used when no event topic is configured.
pub struct DisabledPublisher;

#[async_trait]
impl EventPublisher for DisabledPublisher {
    async fn publish(&self, event: &EventEnvelope<ReservationEvent>) -> Result<()> {
        debug!("Event publishing disabled, dropping event {}", event.id);
        Ok(())
    }
}
