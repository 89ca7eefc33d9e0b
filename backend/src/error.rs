use std::net::SocketAddr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid value for {key}: {reason}")]
    InvalidConfig { key: &'static str, reason: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
