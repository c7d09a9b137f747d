use thiserror::Error;

#[derive(Debug, Error)]
pub enum BriarError {
    #[error("score error: {0}")]
    Score(String),

    #[error("adapter failure: {0}")]
    Adapter(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BriarResult<T> = Result<T, BriarError>;
