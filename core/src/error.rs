use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed numeric value: {0}")]
    Parse(#[from] crate::quantity::QuantityParseError),

    #[error("save record rejected: {0}")]
    Schema(String),

    #[error("store {op} failed: {reason}")]
    Store { op: &'static str, reason: String },

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type GameResult<T> = Result<T, GameError>;
