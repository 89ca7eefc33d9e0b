use thiserror::Error;

use crate::model::SubscriberId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("subscriber connection is closed")]
    Closed,

    #[error("subscriber outbound queue is full")]
    Full,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("subscriber {0} is not connected")]
    NotConnected(SubscriberId),

    #[error("payload encoding failed: {0}")]
    Encode(String),
}
