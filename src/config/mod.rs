pub mod prompt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingCredential(&'static str),
    #[error("failed to initialize LLM provider: {0}")]
    Provider(String),
    #[error("unsupported store type: {0}")]
    UnsupportedStore(String),
    #[error("invalid LLM type: {0}")]
    InvalidLlmType(String),
}
