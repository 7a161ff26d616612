use thiserror::Error;

// Every variant ends up in a 500 body; nothing here reaches the runtime
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("salary sum overflowed over {rows} rows")]
    AggregateOverflow { rows: usize },

    #[error("failed to serialize response body: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandlerError {
    /// Short name reported in the `type` field of an error body.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::InvalidEvent(_) => "InvalidEvent",
            HandlerError::AggregateOverflow { .. } => "AggregateOverflow",
            HandlerError::Serialization(_) => "SerializationError",
        }
    }
}
