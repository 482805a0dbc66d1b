//! The `subscriber` module holds the consuming side of the bus: a named
//! identity with a bounded history of received updates and a single
//! notification slot (callback or channel).

pub mod history;
pub mod subscriber;

pub use history::ReceivedMessage;
pub use subscriber::Subscriber;
