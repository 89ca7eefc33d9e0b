//! Subscriber sessions and the fan-out of market updates to them.

pub mod error;
pub mod feed;
pub mod model;
pub mod notifier;
pub mod payload;
pub mod subscriber;

pub use error::SendError;
pub use feed::QuoteChangeFeed;
pub use model::{Payload, SubscriberId};
pub use notifier::{BroadcastReport, Notifier};
pub use subscriber::{ChannelSubscriber, Subscriber};
