//! # Channel Subscriber
//!
//! Receiving side of the cluster bus.

use serde::de::DeserializeOwned;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Channel closed")]
    Closed,

    /// A payload could not be decoded as JSON.
    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A subscription to one named channel.
pub struct ChannelSubscription {
    channel: String,
    receiver: broadcast::Receiver<Vec<u8>>,
}

impl ChannelSubscription {
    pub(crate) fn new(channel: String, receiver: broadcast::Receiver<Vec<u8>>) -> Self {
        Self { channel, receiver }
    }

    /// Channel this subscription listens on.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Receive the next payload.
    ///
    /// Returns `None` once the bus has been dropped. Payloads missed because
    /// this subscriber lagged are skipped.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.receiver.recv().await {
                Ok(payload) => return Some(payload),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(channel = %self.channel, lagged = count, "Subscriber lagged");
                }
            }
        }
    }

    /// Receive the next payload without waiting.
    pub fn try_recv(&mut self) -> Result<Option<Vec<u8>>, SubscriptionError> {
        loop {
            match self.receiver.try_recv() {
                Ok(payload) => return Ok(Some(payload)),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            }
        }
    }

    /// Receive the next payload and decode it as JSON.
    pub async fn recv_json<T: DeserializeOwned>(&mut self) -> Result<T, SubscriptionError> {
        let payload = self.recv().await.ok_or(SubscriptionError::Closed)?;
        Ok(serde_json::from_slice(&payload)?)
    }
}

/// `Stream` adapter over a channel subscription.
pub struct ChannelStream {
    channel: String,
    inner: BroadcastStream<Vec<u8>>,
}

impl ChannelStream {
    /// Wrap a subscription.
    #[must_use]
    pub fn new(subscription: ChannelSubscription) -> Self {
        Self {
            channel: subscription.channel,
            inner: BroadcastStream::new(subscription.receiver),
        }
    }

    /// Channel this stream listens on.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl Stream for ChannelStream {
    type Item = Vec<u8>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(payload))) => return Poll::Ready(Some(payload)),
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(count)))) => {
                    debug!(channel = %self.channel, lagged = count, "Stream lagged");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelPublisher, ClusterBus};
    use serde::{Deserialize, Serialize};
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: u32,
    }

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = ClusterBus::new();
        let mut sub = bus.subscribe("cluster-primary");

        bus.publish("cluster-primary", b"payload".to_vec()).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("payload");
        assert_eq!(received, b"payload".to_vec());
        assert_eq!(sub.channel(), "cluster-primary");
    }

    #[tokio::test]
    async fn test_subscription_ignores_other_channels() {
        let bus = ClusterBus::new();
        let mut sub = bus.subscribe("results");

        bus.publish("other", b"ignored".to_vec()).await;
        bus.publish("results", b"wanted".to_vec()).await;

        assert_eq!(sub.try_recv().unwrap(), Some(b"wanted".to_vec()));
        assert_eq!(sub.try_recv().unwrap(), None);
    }

    #[tokio::test]
    async fn test_subscription_drop_cleanup() {
        let bus = ClusterBus::new();
        {
            let _sub1 = bus.subscribe("c");
            let _sub2 = bus.subscribe("c");
            assert_eq!(bus.subscriber_count("c"), 2);
        }
        assert_eq!(bus.subscriber_count("c"), 0);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = ClusterBus::new();
        let mut sub = bus.subscribe("c");
        assert!(matches!(sub.try_recv(), Ok(None)));
    }

    #[tokio::test]
    async fn test_lagged_subscriber_skips_missed() {
        let bus = ClusterBus::with_capacity(2);
        let mut sub = bus.subscribe("c");

        for i in 0..5u8 {
            bus.publish("c", vec![i]).await;
        }

        // Oldest payloads were overwritten; the newest two remain.
        assert_eq!(sub.try_recv().unwrap(), Some(vec![3]));
        assert_eq!(sub.try_recv().unwrap(), Some(vec![4]));
    }

    #[tokio::test]
    async fn test_recv_closed_after_bus_dropped() {
        let bus = ClusterBus::new();
        let mut sub = bus.subscribe("c");
        drop(bus);

        assert!(sub.recv().await.is_none());
        assert!(matches!(sub.try_recv(), Err(SubscriptionError::Closed)));
    }

    #[tokio::test]
    async fn test_recv_json() {
        let bus = ClusterBus::new();
        let mut sub = bus.subscribe("c");

        bus.publish("c", serde_json::to_vec(&Note { id: 7 }).unwrap())
            .await;
        bus.publish("c", b"not json".to_vec()).await;

        let note: Note = sub.recv_json().await.unwrap();
        assert_eq!(note, Note { id: 7 });

        let bad: Result<Note, _> = sub.recv_json().await;
        assert!(matches!(bad, Err(SubscriptionError::Decode(_))));
    }

    #[tokio::test]
    async fn test_channel_stream() {
        let bus = ClusterBus::new();
        let mut stream = bus.stream("c");
        assert_eq!(stream.channel(), "c");

        bus.publish("c", vec![1]).await;
        bus.publish("c", vec![2]).await;

        let first = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout");
        let second = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout");
        assert_eq!(first, Some(vec![1]));
        assert_eq!(second, Some(vec![2]));
    }
}
