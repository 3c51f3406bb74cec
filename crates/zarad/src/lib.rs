//! Zara daemon library - exposes modules for testing.

pub mod config;
pub mod executor;
pub mod llm;
pub mod probe;
pub mod report;
pub mod router;
pub mod selector;
pub mod speech;
