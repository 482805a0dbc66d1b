use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::broker::message::Message;

/// One delivery as seen by a subscriber.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub topic: String,
    pub message: Arc<Message>,
    pub received_at: DateTime<Utc>,
}

impl ReceivedMessage {
    pub fn new(topic: &str, message: Arc<Message>) -> Self {
        Self {
            topic: topic.to_string(),
            message,
            received_at: Utc::now(),
        }
    }
}

/// FIFO buffer that keeps at most `capacity` records, dropping the oldest.
#[derive(Debug)]
pub struct History {
    records: VecDeque<ReceivedMessage>,
    capacity: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: ReceivedMessage) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<ReceivedMessage> {
        self.records.iter().cloned().collect()
    }
}
