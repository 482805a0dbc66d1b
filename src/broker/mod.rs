pub mod engine;
pub mod message;
pub mod recipient;
pub mod topic;

pub use engine::MessageBus;
pub use message::Message;
pub use recipient::Recipient;
pub use topic::SubscriberId;
