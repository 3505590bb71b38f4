use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("catalog violation: {0}")]
    CatalogViolation(String),

    #[error("unknown step id: {0}")]
    UnknownStep(u8),

    #[error("stale suggestion: generation {handle} superseded by {current}")]
    StaleSuggestion { handle: u64, current: u64 },

    #[error("journal corrupt: {0}")]
    JournalCorrupt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
