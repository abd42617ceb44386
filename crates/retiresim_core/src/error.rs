//! Engine-visible error taxonomy
//!
//! A trajectory depleting its portfolio is not an error; it is the primary
//! signal feeding the success rate. Errors are validation failures caught
//! at the façade, cancellation observed during fan-out, and internal
//! states the engine cannot recover from.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Parameter or portfolio validation failed; no worker has started.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Cancellation was signalled during fan-out; no partial result.
    #[error("simulation cancelled")]
    Cancelled,

    /// An impossible state was reached; not expected in normal operation.
    #[error("internal error: {0}")]
    Internal(String),
}
