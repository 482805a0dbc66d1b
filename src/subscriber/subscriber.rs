//! Subscriber
//!
//! A `Subscriber` is the caller-facing handle; the part registered with the
//! bus is its `Inbox`, which holds no reference back to the bus. Dropping a
//! `Subscriber` therefore leaves its inbox registered under every topic it
//! still belongs to. Call `unsubscribe_all` first if that matters.
//!
//! Membership is always read from the bus, so `subscriptions` also reflects
//! `MessageBus::remove_subscriber` and unsubscribes made directly on the bus.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::broker::{Message, MessageBus, Recipient, SubscriberId};
use crate::subscriber::history::{History, ReceivedMessage};
use crate::utils::Result;

type Callback = Box<dyn Fn(&str, &Message) + Send + Sync>;

/// The single notification slot. Last writer wins.
enum Notifier {
    Callback(Callback),
    Channel(mpsc::Sender<ReceivedMessage>),
}

struct Inbox {
    id: SubscriberId,
    display_name: String,
    history: Mutex<History>,
    notifier: RwLock<Option<Arc<Notifier>>>,
}

impl Recipient for Inbox {
    fn id(&self) -> &str {
        &self.id
    }

    fn receive(&self, topic: &str, message: Arc<Message>) {
        let record = ReceivedMessage::new(topic, message);
        self.history.lock().push(record.clone());

        // Cloned out so the callback runs without the slot locked.
        let notifier = self.notifier.read().clone();
        match notifier.as_deref() {
            Some(Notifier::Callback(callback)) => callback(topic, record.message.as_ref()),
            Some(Notifier::Channel(tx)) => match tx.try_send(record) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(subscriber = %self.id, topic, "update channel full, dropping update");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(subscriber = %self.id, topic, "update channel closed");
                }
            },
            None => {}
        }
    }
}

pub struct Subscriber {
    inbox: Arc<Inbox>,
    bus: Arc<MessageBus>,
}

impl Subscriber {
    /// Number of received updates kept in the history.
    pub const MAX_HISTORY: usize = 50;

    /// Uniqueness of `id` is up to the caller.
    pub fn new(
        id: impl Into<SubscriberId>,
        display_name: impl Into<String>,
        bus: Arc<MessageBus>,
    ) -> Self {
        Self {
            inbox: Arc::new(Inbox {
                id: id.into(),
                display_name: display_name.into(),
                history: Mutex::new(History::with_capacity(Self::MAX_HISTORY)),
                notifier: RwLock::new(None),
            }),
            bus,
        }
    }

    /// Creates a subscriber with a random v4 UUID as its id.
    pub fn with_generated_id(display_name: impl Into<String>, bus: Arc<MessageBus>) -> Self {
        Self::new(Uuid::new_v4().to_string(), display_name, bus)
    }

    pub fn id(&self) -> &str {
        &self.inbox.id
    }

    pub fn display_name(&self) -> &str {
        &self.inbox.display_name
    }

    /// Joins `topic`. A cached message for the topic is delivered before
    /// this returns, unless another caller is already delivering on the
    /// topic, in which case it arrives in order behind that work.
    pub fn subscribe(&self, topic: &str) -> Result<()> {
        self.bus.subscribe(topic, self.inbox.clone())
    }

    pub fn unsubscribe(&self, topic: &str) {
        self.bus.unsubscribe(topic, self.id());
    }

    /// Leaves every topic this subscriber's id is registered under.
    pub fn unsubscribe_all(&self) {
        self.bus.remove_subscriber(self.id());
    }

    /// Topics the bus currently has this subscriber under, sorted.
    pub fn subscriptions(&self) -> Vec<String> {
        self.bus.subscriptions_of(self.id())
    }

    /// Replaces the notification slot with `callback`.
    pub fn set_update_callback<F>(&self, callback: F)
    where
        F: Fn(&str, &Message) + Send + Sync + 'static,
    {
        *self.inbox.notifier.write() = Some(Arc::new(Notifier::Callback(Box::new(callback))));
    }

    /// Replaces the notification slot with a bounded channel and returns its
    /// receiving end. Updates arrive in delivery order; when the channel is
    /// full new updates are dropped.
    pub fn update_channel(&self, capacity: usize) -> mpsc::Receiver<ReceivedMessage> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        *self.inbox.notifier.write() = Some(Arc::new(Notifier::Channel(tx)));
        rx
    }

    pub fn clear_update_callback(&self) {
        *self.inbox.notifier.write() = None;
    }

    /// Snapshot of the received updates, oldest first.
    pub fn message_history(&self) -> Vec<ReceivedMessage> {
        self.inbox.history.lock().snapshot()
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.inbox.id)
            .field("display_name", &self.inbox.display_name)
            .field("topics", &self.subscriptions())
            .finish()
    }
}
