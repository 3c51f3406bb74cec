//! Error types for Zara.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZaraError {
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("No viable method for action (simulation missing from priority list)")]
    AllMethodsExhausted,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serial error: {0}")]
    Serial(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ZaraError {
    pub fn code(&self) -> i32 {
        match self {
            ZaraError::ResourceUnavailable(_) => -32000,
            ZaraError::ExecutionFailed(_) => -32001,
            ZaraError::AllMethodsExhausted => -32002,
            ZaraError::Cancelled => -32003,
            ZaraError::LlmUnavailable(_) => -32004,
            ZaraError::Config(_) => -32005,
            ZaraError::Serial(_) => -32006,
            ZaraError::Io(_) => -32007,
            ZaraError::Json(_) => -32700,
            ZaraError::Internal(_) => -32603,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_per_variant() {
        let errors = [
            ZaraError::ResourceUnavailable("mic".into()),
            ZaraError::ExecutionFailed("boom".into()),
            ZaraError::AllMethodsExhausted,
            ZaraError::Cancelled,
            ZaraError::LlmUnavailable("down".into()),
            ZaraError::Config("bad".into()),
            ZaraError::Serial("port".into()),
            ZaraError::Internal("oops".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn messages_are_non_empty() {
        let err = ZaraError::ExecutionFailed("microphone stream died".into());
        assert!(!err.to_string().is_empty());
        assert!(err.to_string().contains("microphone stream died"));
    }
}
