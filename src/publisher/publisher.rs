//! Publisher
//!
//! A `Publisher` owns one topic and one `PriceWalk`. `publish_update` takes a
//! single step and hands the result to the bus; `start_publishing` repeats
//! that on a Tokio interval until `stop_publishing` is called or the
//! publisher is dropped.
//!
//! Cancellation notes:
//! - The first update of a cycle is published synchronously inside
//!   `start_publishing`, so it has happened by the time the call returns.
//! - Every later tick checks the cycle's cancellation flag right before
//!   publishing. `stop_publishing` sets the flag and aborts the task, so no
//!   update starts after it returns; one already past the check may finish.
//! - Starting again cancels the running cycle first. A publisher never has
//!   two live cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error};

use crate::broker::{Message, MessageBus};
use crate::publisher::price_walk::{PriceWalk, Quote};
use crate::utils::{Error, Result};

struct Feed {
    bus: Arc<MessageBus>,
    topic: String,
    walk: Mutex<PriceWalk>,
}

impl Feed {
    fn publish_update(&self) -> Result<Message> {
        let quote = self.walk.lock().step();
        self.emit(quote)
    }

    // The walk lock is released before publishing so recipients can call
    // back into the publisher.
    fn emit(&self, quote: Quote) -> Result<Message> {
        let message = Message::new(self.topic.as_str(), quote.price, quote.change_percent);
        self.bus.publish(&self.topic, message.clone())?;
        Ok(message)
    }
}

struct PublishCycle {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl PublishCycle {
    fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.handle.abort();
    }
}

pub struct Publisher {
    feed: Arc<Feed>,
    cycle: Mutex<Option<PublishCycle>>,
}

impl Publisher {
    pub const DEFAULT_STARTING_PRICE: f64 = 100.0;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);

    pub fn new(bus: Arc<MessageBus>, topic: impl Into<String>) -> Result<Self> {
        Self::with_walk(bus, topic, PriceWalk::new(Self::DEFAULT_STARTING_PRICE))
    }

    pub fn with_price(
        bus: Arc<MessageBus>,
        topic: impl Into<String>,
        starting_price: f64,
    ) -> Result<Self> {
        Self::with_walk(bus, topic, PriceWalk::new(starting_price))
    }

    pub fn with_walk(
        bus: Arc<MessageBus>,
        topic: impl Into<String>,
        walk: PriceWalk,
    ) -> Result<Self> {
        let topic = topic.into();
        if topic.is_empty() {
            return Err(Error::EmptyTopic);
        }
        Ok(Self {
            feed: Arc::new(Feed {
                bus,
                topic,
                walk: Mutex::new(walk),
            }),
            cycle: Mutex::new(None),
        })
    }

    pub fn topic(&self) -> &str {
        &self.feed.topic
    }

    pub fn current_price(&self) -> f64 {
        self.feed.walk.lock().price()
    }

    /// Takes one random step and publishes the result.
    pub fn publish_update(&self) -> Result<Message> {
        self.feed.publish_update()
    }

    /// Overrides the price and publishes it straight away. Prices below
    /// `0.01` are clamped rather than rejected.
    pub fn set_price(&self, price: f64) -> Result<Message> {
        let quote = self.feed.walk.lock().set(price);
        self.feed.emit(quote)
    }

    /// Publishes once now and then every `interval` until stopped. Must be
    /// called from within a Tokio runtime.
    pub fn start_publishing(&self, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(Error::InvalidInterval);
        }
        let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;

        self.stop_publishing();
        self.feed.publish_update()?;

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let feed = Arc::clone(&self.feed);
        let handle = runtime.spawn(async move {
            let Some(start) = Instant::now().checked_add(interval) else {
                // too far out to schedule, so the cycle never ticks
                return std::future::pending().await;
            };
            let mut ticker = time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                if let Err(e) = feed.publish_update() {
                    error!(topic = %feed.topic, "publish cycle failed: {e}");
                    break;
                }
            }
        });

        let previous = self
            .cycle
            .lock()
            .replace(PublishCycle { cancelled, handle });
        if let Some(previous) = previous {
            previous.cancel();
        }
        debug!(
            topic = %self.feed.topic,
            interval = ?interval,
            "publishing started"
        );
        Ok(())
    }

    /// Cancels the running cycle, if any.
    pub fn stop_publishing(&self) {
        let cycle = self.cycle.lock().take();
        if let Some(cycle) = cycle {
            cycle.cancel();
            debug!(topic = %self.feed.topic, "publishing stopped");
        }
    }

    pub fn is_publishing(&self) -> bool {
        self.cycle
            .lock()
            .as_ref()
            .is_some_and(|cycle| !cycle.handle.is_finished())
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.stop_publishing();
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("topic", &self.feed.topic)
            .field("price", &self.current_price())
            .field("publishing", &self.is_publishing())
            .finish()
    }
}
