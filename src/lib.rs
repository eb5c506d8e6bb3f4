use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset fetch error: {0}")]
    Fetch(String),

    #[error("Embedding service error: {0}")]
    Embedding(String),

    #[error("Embedding cache is corrupt: {0}")]
    CacheCorrupt(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod cache;
pub mod chat;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod embeddings;
pub mod pipeline;
pub mod retrieval;
