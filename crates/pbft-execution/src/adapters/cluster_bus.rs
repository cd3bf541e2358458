//! Cluster publisher adapter over the shared in-process bus.

use crate::domain::PublishError;
use crate::ports::ClusterPublisher;
use async_trait::async_trait;
use shared_bus::{ChannelPublisher, ClusterBus};

#[async_trait]
impl ClusterPublisher for ClusterBus {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<usize, PublishError> {
        Ok(ChannelPublisher::publish(self, channel, payload).await)
    }
}
