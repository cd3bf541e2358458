//! # Shared Bus - Cluster Result Channels
//!
//! Named, in-process fan-out channels. The primary replica publishes the
//! serialised result messages it aggregates on a cluster-wide channel;
//! API-facing components subscribe to that channel and answer clients.
//!
//! ```text
//! ┌──────────────┐   publish("cluster-primary", bytes)   ┌──────────────┐
//! │   Primary    │ ────────────────┐                     │  API layer   │
//! │   replica    │                 ▼                     │              │
//! └──────────────┘         ┌──────────────┐  subscribe() │              │
//!                          │  ClusterBus  │ ───────────→ │              │
//!                          └──────────────┘              └──────────────┘
//! ```
//!
//! Delivery is best effort: a publish with no subscribers is dropped, and a
//! subscriber that falls more than the channel capacity behind skips the
//! messages it missed.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use publisher::{ChannelPublisher, ClusterBus};
pub use subscriber::{ChannelStream, ChannelSubscription, SubscriptionError};

/// Maximum messages to buffer per channel before slow subscribers lag.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
