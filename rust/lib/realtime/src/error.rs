use thiserror::Error;

#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("connect: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("protocol: {0}")]
    Protocol(String),

    #[error("channel closed: {0}")]
    Closed(String),
}

impl From<serde_json::Error> for RealtimeError {
    fn from(e: serde_json::Error) -> Self {
        RealtimeError::Protocol(e.to_string())
    }
}
