use ailist_core::IntervalError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AIListError {
    #[error(transparent)]
    InvalidInterval(#[from] IntervalError),

    #[error("Query arrays differ in length: {starts} starts but {ends} ends")]
    LengthMismatch { starts: usize, ends: usize },

    #[error("Corrupt serialized index: {0}")]
    CorruptData(String),

    #[error("Can't encode index: {0}")]
    EncodeError(String),

    #[error("Statistics output too large to allocate: {0}")]
    CapacityExceeded(String),

    #[error("Index contains no intervals")]
    EmptyIndex,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type AIListResult<T> = std::result::Result<T, AIListError>;
