/// Result alias that carries the custom [`DreamCanvasError`] type.
pub type Result<T> = std::result::Result<T, DreamCanvasError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum DreamCanvasError {
    /// Free-form error wrapping a readable message.
    #[error("{0}")]
    Message(String),
    /// The caller handed the engine something it cannot work with.
    #[error("{0}")]
    InvalidInput(&'static str),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Transport-level failure while talking to the dream API.
    #[error("dream api request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The dream API answered with a non-success status code.
    #[error("dream api returned status {status}")]
    Api { status: u16 },
    /// Malformed JSON in a response body or a records file.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl DreamCanvasError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for DreamCanvasError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for DreamCanvasError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
