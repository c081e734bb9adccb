use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntervalError {
    #[error("Invalid interval: end ({end}) is before start ({start})")]
    InvalidInterval { start: String, end: String },
}
