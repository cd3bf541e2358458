//! # Channel Publisher
//!
//! Publishing side of the cluster bus. Channels are created lazily on first
//! publish or subscribe and live as long as the bus.

use crate::subscriber::{ChannelStream, ChannelSubscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Interface for publishing raw payloads on a named channel.
#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    /// Publish `payload` on `channel`.
    ///
    /// Returns the number of subscribers that received it. Zero is not an
    /// error: nobody was listening.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> usize;

    /// Total payloads published across all channels.
    fn messages_published(&self) -> u64;
}

/// In-memory bus of named broadcast channels.
///
/// Each channel is an independent `tokio::sync::broadcast` channel, so a slow
/// subscriber on one channel never affects another.
pub struct ClusterBus {
    /// Senders by channel name.
    channels: RwLock<HashMap<String, broadcast::Sender<Vec<u8>>>>,

    /// Total payloads published.
    messages_published: AtomicU64,

    /// Per-channel buffer size.
    capacity: usize,
}

impl ClusterBus {
    /// Create a bus with the default per-channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with the given per-channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            messages_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<Vec<u8>> {
        if let Some(sender) = self.channels.read().get(channel) {
            return sender.clone();
        }

        self.channels
            .write()
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Subscribe to a channel.
    #[must_use]
    pub fn subscribe(&self, channel: &str) -> ChannelSubscription {
        let receiver = self.sender(channel).subscribe();
        debug!(channel, "New channel subscription");
        ChannelSubscription::new(channel.to_string(), receiver)
    }

    /// Subscribe to a channel as a `Stream`.
    #[must_use]
    pub fn stream(&self, channel: &str) -> ChannelStream {
        ChannelStream::new(self.subscribe(channel))
    }

    /// Active subscribers on a channel.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .get(channel)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Names of all channels that have been used.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Per-channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ClusterBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelPublisher for ClusterBus {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> usize {
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let bytes = payload.len();
        match self.sender(channel).send(payload) {
            Ok(receivers) => {
                debug!(channel, bytes, receivers, "Payload published");
                receivers
            }
            Err(_) => {
                trace!(channel, bytes, "Payload published with no subscribers");
                0
            }
        }
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
