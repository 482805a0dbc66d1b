//! Error types shared across `tickerbus`.
//!
//! The bus itself is in-memory, so the taxonomy is small: bad inputs at the
//! API boundary, a publish cycle started without a runtime, and configuration
//! failures surfaced by the binary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("topic name must not be empty")]
    EmptyTopic,

    #[error("publish interval must be greater than zero")]
    InvalidInterval,

    #[error("publishing requires a running Tokio runtime")]
    NoRuntime,

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
