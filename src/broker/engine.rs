//! Broker engine
//!
//! `MessageBus` owns the topic registry and the latest-message cache. It is
//! responsible for:
//! - registering and removing recipients per topic
//! - caching the most recent message of every topic
//! - replaying the cached message to a recipient the moment it subscribes
//! - fanning a published message out to every current recipient
//!
//! Concurrency and usage notes:
//! - All methods take `&self`; share the bus as `Arc<MessageBus>`.
//! - Each subscribe, unsubscribe and publish is one critical section on the
//!   registry. Deliveries happen after the lock is released, against a
//!   snapshot of the recipients taken inside that critical section, so a
//!   subscribe issued during a fan-out only affects later publishes.
//! - Publishes and replays on one topic are queued in the order their
//!   critical sections ran and delivered in that order by a single drainer.
//!   A publish or subscribe made while that topic is being drained (from a
//!   recipient, or from another thread) only enqueues and returns; the
//!   running drainer delivers it. Every recipient therefore sees a topic's
//!   messages in cache order, and its last delivery matches `latest`.
//! - A recipient that panics is logged and skipped; the remaining recipients
//!   of the same publish still get the message.

use std::collections::{BTreeSet, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error};

use crate::broker::message::Message;
use crate::broker::recipient::Recipient;
use crate::broker::topic::{Delivery, SubscriberId, Topic};
use crate::utils::{Error, Result};

#[derive(Debug, Default)]
pub struct MessageBus {
    topics: RwLock<HashMap<String, Topic>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a recipient to a topic, creating the topic if needed.
    ///
    /// If the topic already has a cached message it is replayed to this
    /// recipient. That happens on every call, including a repeated subscribe
    /// of an already registered recipient. The replay is delivered before
    /// returning unless the topic is being drained elsewhere, in which case
    /// it is queued behind the deliveries already in flight.
    pub fn subscribe(&self, topic: &str, recipient: Arc<dyn Recipient>) -> Result<()> {
        validate_topic(topic)?;

        let must_drain = {
            let mut topics = self.topics.write();
            let entry = topics
                .entry(topic.to_string())
                .or_insert_with(|| Topic::new(topic));
            if entry.subscribe(Arc::clone(&recipient)) {
                debug!(topic, subscriber = recipient.id(), "subscribed");
            }
            match entry.latest.clone() {
                Some(message) => {
                    debug!(topic, subscriber = recipient.id(), "replaying latest message");
                    entry.enqueue(Delivery {
                        message,
                        recipients: vec![recipient],
                    })
                }
                None => false,
            }
        };

        if must_drain {
            self.drain(topic);
        }
        Ok(())
    }

    /// Unsubscribes a recipient from a topic. Unknown topics and recipients
    /// are ignored.
    pub fn unsubscribe(&self, topic: &str, subscriber: &str) {
        let mut topics = self.topics.write();
        if let Some(t) = topics.get_mut(topic) {
            if t.unsubscribe(subscriber) {
                debug!(topic, subscriber, "unsubscribed");
            }
        }
    }

    /// Stores `message` as the topic's latest and delivers it to every
    /// recipient registered at call time. When the topic is already being
    /// drained the message is queued and delivered by that drainer.
    ///
    /// Routing uses `topic`, not `message.topic`. Returns how many recipients
    /// the message was handed to; zero still updates the cache.
    pub fn publish(&self, topic: &str, message: Message) -> Result<usize> {
        validate_topic(topic)?;
        let message = Arc::new(message);

        let (count, must_drain) = {
            let mut topics = self.topics.write();
            let entry = topics
                .entry(topic.to_string())
                .or_insert_with(|| Topic::new(topic));
            entry.latest = Some(Arc::clone(&message));
            let recipients = entry.recipients();
            let count = recipients.len();
            debug!(topic, price = message.price, subscribers = count, "publishing");
            if count == 0 {
                (0, false)
            } else {
                (count, entry.enqueue(Delivery { message, recipients }))
            }
        };

        if must_drain {
            self.drain(topic);
        }
        Ok(count)
    }

    /// Ids subscribed to `topic`, sorted. Empty for unknown topics.
    pub fn subscribers(&self, topic: &str) -> Vec<SubscriberId> {
        let topics = self.topics.read();
        let mut ids: Vec<SubscriberId> = topics
            .get(topic)
            .map(|t| t.subscribers.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Topics `subscriber` is registered under, sorted.
    pub fn subscriptions_of(&self, subscriber: &str) -> Vec<String> {
        let topics = self.topics.read();
        let mut names: Vec<String> = topics
            .iter()
            .filter(|(_, t)| t.subscribers.contains_key(subscriber))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Every topic that has been subscribed to or published on.
    pub fn topics(&self) -> BTreeSet<String> {
        self.topics.read().keys().cloned().collect()
    }

    /// The cached latest message of a topic, if anything was published.
    pub fn latest(&self, topic: &str) -> Option<Arc<Message>> {
        self.topics.read().get(topic).and_then(|t| t.latest.clone())
    }

    /// Removes a recipient from every topic it is subscribed to and returns
    /// how many registrations were dropped.
    pub fn remove_subscriber(&self, subscriber: &str) -> usize {
        let mut topics = self.topics.write();
        let mut removed = 0;
        for (name, topic) in topics.iter_mut() {
            if topic.unsubscribe(subscriber) {
                debug!(topic = %name, subscriber, "unsubscribed");
                removed += 1;
            }
        }
        removed
    }

    /// Delivers queued work for `topic` until its queue is empty.
    fn drain(&self, topic: &str) {
        loop {
            let next = self
                .topics
                .write()
                .get_mut(topic)
                .and_then(Topic::next_delivery);
            let Some(delivery) = next else {
                break;
            };
            for recipient in &delivery.recipients {
                deliver(topic, recipient.as_ref(), Arc::clone(&delivery.message));
            }
        }
    }
}

fn validate_topic(topic: &str) -> Result<()> {
    if topic.is_empty() {
        return Err(Error::EmptyTopic);
    }
    Ok(())
}

fn deliver(topic: &str, recipient: &dyn Recipient, message: Arc<Message>) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| recipient.receive(topic, message)));
    if outcome.is_err() {
        error!(
            topic,
            subscriber = recipient.id(),
            "subscriber panicked while handling an update"
        );
    }
}
