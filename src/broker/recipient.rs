use std::sync::Arc;

use crate::broker::message::Message;

/// Something the bus can deliver updates to.
///
/// `receive` is called synchronously from `MessageBus::publish` and from
/// `MessageBus::subscribe` when a cached message is replayed. It runs without
/// any bus lock held, so implementations may call back into the bus.
pub trait Recipient: Send + Sync {
    /// Identity used for registry membership. Must be unique per bus.
    fn id(&self) -> &str;

    fn receive(&self, topic: &str, message: Arc<Message>);
}
