use std::fmt::Display;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::Result;

/// Sends a finished prompt to a text-generation backend and returns the raw
/// generated text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Generate,
    Debug,
    Explain,
}

impl Task {
    pub const fn next(self) -> Self {
        match self {
            Self::Generate => Self::Debug,
            Self::Debug => Self::Explain,
            Self::Explain => Self::Generate,
        }
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generate => write!(f, "generate"),
            Self::Debug => write!(f, "debug"),
            Self::Explain => write!(f, "explain"),
        }
    }
}

/// Code recovered by the first step of a generate or debug request, before
/// it has been explained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeDraft {
    pub language: Language,
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeResult {
    pub code: String,
    pub explanation: String,
}
