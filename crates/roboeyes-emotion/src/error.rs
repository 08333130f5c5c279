//! Error taxonomy for the emotion layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmotionError {
    #[error("descriptor validation failed: {0}")]
    Validation(String),

    #[error("unknown emotion '{0}'")]
    UnknownEmotion(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}
