//! # tickerbus
//!
//! `tickerbus` is an in-process, topic-based publish/subscribe bus for price
//! updates. Publishers emit timestamped quotes under a topic; the bus fans
//! each one out to the topic's current subscribers and keeps the latest quote
//! per topic so that late subscribers receive the current state immediately.
//!
//! ## Core Modules
//!
//! - `broker`: `MessageBus`, the topic registry and latest-message cache.
//! - `publisher`: `Publisher` and the `PriceWalk` that generates its quotes.
//! - `subscriber`: `Subscriber`, a bounded history plus a notification slot.
//! - `config`: settings loaded from file and environment.
//! - `utils`: the error type and logging setup.

pub mod broker;
pub mod config;
pub mod publisher;
pub mod subscriber;
pub mod utils;

pub use broker::{Message, MessageBus, Recipient};
pub use publisher::Publisher;
pub use subscriber::{ReceivedMessage, Subscriber};
pub use utils::{Error, Result};

#[cfg(test)]
mod tests;
