//! Price update messages
//!
//! `Message` is the immutable value routed by the bus. Once published it is
//! wrapped in an `Arc` and shared between the latest-message cache, the
//! fan-out and every subscriber history, so nothing downstream can mutate it.
//!
//! Notes on fields:
//! - `topic`: the symbol the update belongs to
//! - `price`: price after the update, never below `0.01`
//! - `change_percent`: percentage move that produced `price`
//! - `timestamp`: milliseconds since UNIX epoch at creation

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    pub price: f64,
    pub change_percent: f64,
    pub timestamp: i64,
}

impl Message {
    /// Build a message stamped with the current time.
    pub fn new(topic: impl Into<String>, price: f64, change_percent: f64) -> Self {
        Self {
            topic: topic.into(),
            price,
            change_percent,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
