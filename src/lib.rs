#![allow(clippy::future_not_send)]

pub mod cli;
pub mod config;
pub mod extract;
pub mod huggingface;
pub mod language;
pub mod model;
pub mod orchestrator;
pub mod prompts;
pub mod share;
pub mod templates;
mod ui;

pub use config::{GenerationParameters, GenieConfig};
pub use huggingface::InferenceClient;
pub use language::Language;
pub use model::{CodeDraft, CodeResult, Task, Transport};
pub use orchestrator::Orchestrator;

use thiserror::Error;

/// Coarse grouping of [`GenieError`] used when reporting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    EmptyResult,
    Credential,
    Configuration,
}

#[derive(Debug, Error)]
pub enum GenieError {
    #[error("{0}")]
    Validation(String),
    #[error("request to the inference endpoint failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode the inference response: {0}")]
    Decode(String),
    #[error("No text was generated by the API")]
    EmptyGeneration,
    #[error("Failed to extract code from the response")]
    EmptyExtraction,
    #[error("Token validation failed with status {0}")]
    InvalidToken(u16),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GenieError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) | Self::Status { .. } | Self::Decode(_) => ErrorKind::Transport,
            Self::EmptyGeneration | Self::EmptyExtraction => ErrorKind::EmptyResult,
            Self::InvalidToken(_) => ErrorKind::Credential,
            Self::Config(_) | Self::Io(_) => ErrorKind::Configuration,
        }
    }
}

pub type Result<T, E = GenieError> = std::result::Result<T, E>;
