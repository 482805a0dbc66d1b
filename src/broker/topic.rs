//! Topic management
//!
//! A `Topic` holds the recipients subscribed under one name together with the
//! most recently published message. Subscriptions are keyed by recipient id,
//! so a duplicate subscribe is a no-op.
//!
//! Deliveries for a topic go through `pending`. Whoever finds the topic idle
//! becomes the drainer and hands out queued deliveries in order; anyone
//! enqueuing while a drain is running leaves the work to that drainer.
//!
//! Concurrency note: callers must synchronize access to `Topic` (the bus keeps
//! every topic behind one lock).

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use crate::broker::message::Message;
use crate::broker::recipient::Recipient;

pub type SubscriberId = String;

/// One queued hand-off: a message and the recipients it goes to.
pub struct Delivery {
    pub message: Arc<Message>,
    pub recipients: Vec<Arc<dyn Recipient>>,
}

#[derive(Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashMap<SubscriberId, Arc<dyn Recipient>>,
    pub latest: Option<Arc<Message>>,
    pending: VecDeque<Delivery>,
    draining: bool,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashMap::new(),
            latest: None,
            pending: VecDeque::new(),
            draining: false,
        }
    }

    /// Add a recipient to the topic. Returns `false` if it was already there,
    /// in which case the existing registration is kept.
    pub fn subscribe(&mut self, recipient: Arc<dyn Recipient>) -> bool {
        let id = recipient.id().to_string();
        if self.subscribers.contains_key(&id) {
            return false;
        }
        self.subscribers.insert(id, recipient);
        true
    }

    /// Remove a recipient from the topic. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        self.subscribers.remove(id).is_some()
    }

    /// Snapshot of the current recipients, taken before a fan-out.
    pub fn recipients(&self) -> Vec<Arc<dyn Recipient>> {
        self.subscribers.values().cloned().collect()
    }

    /// Queues a delivery. Returns `true` when the caller has to drain the
    /// queue, `false` when a drain is already running.
    pub fn enqueue(&mut self, delivery: Delivery) -> bool {
        self.pending.push_back(delivery);
        if self.draining {
            return false;
        }
        self.draining = true;
        true
    }

    /// Next queued delivery. Clears the draining flag once the queue is empty.
    pub fn next_delivery(&mut self) -> Option<Delivery> {
        let next = self.pending.pop_front();
        if next.is_none() {
            self.draining = false;
        }
        next
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("subscribers", &self.subscribers.keys().collect::<Vec<_>>())
            .field("latest", &self.latest)
            .field("pending", &self.pending.len())
            .field("draining", &self.draining)
            .finish()
    }
}
